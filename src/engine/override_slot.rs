//! One-shot response override.
//!
//! # Responsibilities
//! - Hold at most one pending (service, method, payload) override
//! - Consume it atomically on the first matching call (at-most-once)
//!
//! # Design Decisions
//! - Read-and-clear happens under one mutex acquisition, so two concurrent
//!   matching calls can never both consume the same override
//! - Never persisted; lost on restart by design

use std::sync::Mutex;

use serde_json::Value;

/// A pending one-shot override set by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOverride {
    pub service: String,
    pub method: String,
    pub payload: Value,
}

/// Single-slot holder with atomic read-and-clear semantics.
#[derive(Debug, Default)]
pub struct OverrideSlot {
    inner: Mutex<Option<PendingOverride>>,
}

impl OverrideSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the pending override.
    pub fn set(&self, pending: PendingOverride) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(pending);
    }

    /// Clear any pending override.
    pub fn clear(&self) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Consume the override if it matches the given call. Exactly one caller
    /// observes the payload; the slot is empty afterwards.
    pub fn take_if(&self, service: &str, method: &str) -> Option<Value> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let matches = slot
            .as_ref()
            .is_some_and(|p| p.service == service && p.method == method);
        if matches {
            slot.take().map(|p| p.payload)
        } else {
            None
        }
    }

    /// Peek at the pending override without consuming it.
    pub fn peek(&self) -> Option<PendingOverride> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn pending() -> PendingOverride {
        PendingOverride {
            service: "pkg.Greeter".into(),
            method: "SayHello".into(),
            payload: json!({"message": "OVERRIDDEN"}),
        }
    }

    #[test]
    fn consumed_exactly_once() {
        let slot = OverrideSlot::new();
        slot.set(pending());

        assert_eq!(
            slot.take_if("pkg.Greeter", "SayHello"),
            Some(json!({"message": "OVERRIDDEN"}))
        );
        assert_eq!(slot.take_if("pkg.Greeter", "SayHello"), None);
    }

    #[test]
    fn mismatch_leaves_slot_intact() {
        let slot = OverrideSlot::new();
        slot.set(pending());

        assert_eq!(slot.take_if("pkg.Greeter", "Other"), None);
        assert_eq!(slot.take_if("other.Svc", "SayHello"), None);
        assert!(slot.peek().is_some());
    }

    #[test]
    fn concurrent_consumers_race_for_one_payload() {
        let slot = Arc::new(OverrideSlot::new());
        slot.set(pending());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = slot.clone();
                std::thread::spawn(move || slot.take_if("pkg.Greeter", "SayHello").is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}
