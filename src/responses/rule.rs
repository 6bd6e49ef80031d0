//! Per-method response rules.
//!
//! # Responsibilities
//! - Represent a method's configured behavior: ordered request-pattern
//!   rules plus an optional default response
//! - Classify the raw JSON shape stored in `responses.json`
//! - Round-trip rules back to JSON for write-through persistence
//!
//! # Design Decisions
//! - Pattern keys are serialized JSON objects; iteration order is insertion
//!   order and is semantically significant (first match wins)
//! - The default response shares the method object under the reserved key
//!   `"*"` when patterns are present, and is stored bare otherwise
//! - Malformed pattern keys are kept verbatim; they are skipped at match
//!   time rather than rejected at load time

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key holding a method's default response inside a pattern map.
pub const DEFAULT_KEY: &str = "*";

/// Configured behavior for one (service, method) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodRule {
    /// Serialized request pattern -> response payload, insertion-ordered.
    pub patterns: Map<String, Value>,

    /// Response used when no pattern matches (or when no patterns exist).
    pub default: Option<Value>,
}

impl MethodRule {
    /// A rule holding only a default response.
    pub fn default_response(value: Value) -> Self {
        Self {
            patterns: Map::new(),
            default: Some(value),
        }
    }

    /// Classify a raw JSON value from the configuration document.
    ///
    /// An object containing at least one pattern-like key (or the reserved
    /// default key) is a pattern map; anything else is a bare default
    /// response.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(obj) if obj.keys().any(|k| is_pattern_key(k) || k == DEFAULT_KEY) => {
                let mut patterns = Map::new();
                let mut default = None;
                for (key, entry) in obj {
                    if key == DEFAULT_KEY {
                        default = Some(entry);
                    } else {
                        patterns.insert(key, entry);
                    }
                }
                Self { patterns, default }
            }
            other => Self::default_response(other),
        }
    }

    /// Serialize back to the configuration document shape.
    pub fn to_value(&self) -> Value {
        if self.patterns.is_empty() {
            return self.default.clone().unwrap_or(Value::Null);
        }
        let mut obj = self.patterns.clone();
        if let Some(default) = &self.default {
            obj.insert(DEFAULT_KEY.to_string(), default.clone());
        }
        Value::Object(obj)
    }

    /// Insert or overwrite a pattern entry.
    ///
    /// Overwriting an existing key preserves its position; new keys append
    /// at the end of the iteration order.
    pub fn upsert_pattern(&mut self, key: String, response: Value) {
        self.patterns.insert(key, response);
    }

    /// True when the rule configures nothing at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.default.is_none()
    }
}

/// Whether a method-object key looks like a serialized request pattern.
fn is_pattern_key(key: &str) -> bool {
    key.trim_start().starts_with('{')
}

/// Serialize a request pattern into its canonical map key.
pub fn pattern_key(pattern: &Value) -> String {
    // Compact serialization; Value::to_string never fails.
    pattern.to_string()
}

/// Parse a pattern key into its flat field-constraint set.
///
/// Returns `None` for malformed keys, which resolution skips.
pub fn parse_pattern(key: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(key) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

impl Serialize for MethodRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MethodRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}
