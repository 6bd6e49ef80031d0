//! Response resolution against a method rule.
//!
//! # Responsibilities
//! - Test request payloads against pattern rules in insertion order
//! - Fall back to the method default, then to the legacy fall-through
//!
//! # Design Decisions
//! - Pattern matching is strict equality on top-level fields: every field
//!   named by the pattern must exist in the request with an exactly equal
//!   JSON value (no coercion, no nested matching)
//! - Malformed pattern keys are skipped but still become the fall-through
//!   candidate
//! - When no pattern matches and no default exists, the last-inspected
//!   candidate is returned. This is a legacy quirk kept for compatibility
//!   with existing configurations, and it is logged at WARN wherever taken.

use serde_json::{Map, Value};

use crate::responses::rule::{parse_pattern, MethodRule};

/// How a response was chosen for a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The method's default response.
    Default(Value),
    /// The first pattern fully satisfied by the request.
    Pattern { pattern: String, response: Value },
    /// No pattern matched and no default exists; legacy fall-through to the
    /// last-inspected candidate.
    Fallthrough(Value),
    /// The rule configures nothing for this call.
    Unconfigured,
}

impl Resolution {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Default(_) => "default",
            Resolution::Pattern { .. } => "pattern",
            Resolution::Fallthrough(_) => "fallthrough",
            Resolution::Unconfigured => "unconfigured",
        }
    }

    /// The chosen payload, if any.
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Resolution::Default(v) | Resolution::Fallthrough(v) => Some(v),
            Resolution::Pattern { response, .. } => Some(response),
            Resolution::Unconfigured => None,
        }
    }
}

/// Resolve a request payload against a method rule. The one-shot override
/// is consumed in the engine before the rule is consulted.
pub fn resolve(rule: &MethodRule, request: &Value) -> Resolution {
    if rule.patterns.is_empty() {
        return match &rule.default {
            Some(value) => Resolution::Default(value.clone()),
            None => Resolution::Unconfigured,
        };
    }

    let mut candidate: Option<(&String, &Value)> = None;
    for (key, response) in &rule.patterns {
        candidate = Some((key, response));
        let Some(fields) = parse_pattern(key) else {
            continue;
        };
        if pattern_matches(&fields, request) {
            return Resolution::Pattern {
                pattern: key.clone(),
                response: response.clone(),
            };
        }
    }

    if let Some(default) = &rule.default {
        return Resolution::Default(default.clone());
    }

    match candidate {
        Some((_, response)) => Resolution::Fallthrough(response.clone()),
        None => Resolution::Unconfigured,
    }
}

/// True when every pattern field exists in the request with an equal value.
fn pattern_matches(fields: &Map<String, Value>, request: &Value) -> bool {
    fields
        .iter()
        .all(|(name, expected)| request.get(name) == Some(expected))
}
