//! Response configuration store.
//!
//! # Responsibilities
//! - Hold the service -> method -> rule mapping behind an atomic snapshot
//! - Reload wholesale from `responses.json` (fail-safe-empty)
//! - Apply runtime upserts with write-through persistence
//!
//! # Design Decisions
//! - Readers take an `Arc` snapshot and are never blocked by writers
//! - Writers clone, mutate, swap; upserts are serialized by a mutex
//! - A missing configuration file is an empty store, not an error

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::responses::rule::{pattern_key, MethodRule};

/// File name of the response configuration document.
pub const RESPONSES_FILE: &str = "responses.json";

/// Service name -> method name -> rule.
pub type ResponseMap = BTreeMap<String, BTreeMap<String, MethodRule>>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to persist responses: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Failed to serialize responses: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Layered response configuration, shared between handlers and writers.
pub struct ResponseStore {
    /// Path of the persisted configuration document.
    path: PathBuf,
    /// Current snapshot, atomically swapped on every mutation.
    current: ArcSwap<ResponseMap>,
    /// Serializes the clone-mutate-swap-persist writer path.
    writer: Mutex<()>,
}

impl ResponseStore {
    /// Create a store persisting to `responses.json` under `config_dir`.
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(RESPONSES_FILE),
            current: ArcSwap::from_pointee(ResponseMap::new()),
            writer: Mutex::new(()),
        }
    }

    /// Take a consistent snapshot of the current configuration.
    pub fn snapshot(&self) -> Arc<ResponseMap> {
        self.current.load_full()
    }

    /// Reload from disk, replacing the entire store.
    ///
    /// Absence of the file yields an empty store. A parse failure resets the
    /// store to empty and reports the error (an empty store degrades to "no
    /// responses configured" rather than serving stale or partial state).
    pub fn reload(&self) {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if !self.path.exists() {
            tracing::info!(path = ?self.path, "No response configuration found, store is empty");
            self.current.store(Arc::new(ResponseMap::new()));
            return;
        }
        match fs::read_to_string(&self.path) {
            Ok(raw) => self.install(&raw),
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Failed to read response configuration, resetting to empty");
                self.current.store(Arc::new(ResponseMap::new()));
            }
        }
    }

    /// Replace the entire store from a raw configuration document.
    pub fn replace_all(&self, raw: &str) {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.install(raw);
    }

    fn install(&self, raw: &str) {
        match serde_json::from_str::<ResponseMap>(raw) {
            Ok(map) => {
                let services = map.len();
                let methods: usize = map.values().map(|m| m.len()).sum();
                tracing::info!(services, methods, "Loaded response configuration");
                self.current.store(Arc::new(map));
            }
            Err(e) => {
                tracing::error!(error = %e, "Malformed response configuration, resetting to empty");
                self.current.store(Arc::new(ResponseMap::new()));
            }
        }
    }

    /// Insert or update a rule, then persist the full store before returning.
    ///
    /// With a pattern, the entry is upserted into the method's ordered
    /// pattern map (a bare default rule is converted, retaining the default
    /// as fall-through). Without a pattern, the method's rule set is replaced
    /// by the single default response, discarding any pattern map.
    pub fn upsert(
        &self,
        service: &str,
        method: &str,
        pattern: Option<&Value>,
        response: Value,
    ) -> Result<(), StoreError> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let mut map = (*self.current.load_full()).clone();
        let rule = map
            .entry(service.to_string())
            .or_default()
            .entry(method.to_string())
            .or_default();

        match pattern {
            Some(p) => rule.upsert_pattern(pattern_key(p), response),
            None => *rule = MethodRule::default_response(response),
        }

        self.current.store(Arc::new(map));
        self.persist()
    }

    /// Write the current snapshot to disk (write-through).
    fn persist(&self) -> Result<(), StoreError> {
        let map = self.current.load_full();
        let raw = serde_json::to_string_pretty(&*map)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Number of configured (service, method) pairs.
    pub fn rule_count(&self) -> usize {
        self.current.load().values().map(|m| m.len()).sum()
    }
}
