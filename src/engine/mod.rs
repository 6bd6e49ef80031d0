//! Handler synthesis and call resolution engine.
//!
//! # Data Flow
//! ```text
//! SchemaRegistry snapshot ─┐
//!                          ├─ binder.rs → BoundTable (ArcSwap)
//! ResponseStore snapshot ──┘
//!
//! Incoming call (service, method, request JSON):
//!     override_slot.rs (one-shot, consume exactly once)
//!     → resolver.rs (pattern rules, default, legacy fall-through)
//!     → response payload, or a resolution gap (transport Unimplemented)
//! ```
//!
//! # Design Decisions
//! - The engine owns all mutable state and is the only mutator; readers see
//!   atomic snapshots and finish in-flight calls against a consistent view
//! - Handlers are pure functions of (request, current snapshots): the bound
//!   table carries names and descriptors only, so upserts are observed by
//!   already-bound handlers without a rebuild of anything but the table

pub mod binder;
pub mod override_slot;
pub mod resolver;

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::config::SourcesConfig;
use crate::observability::metrics;
use crate::responses::{ResponseStore, StoreError};
use crate::schemas::{LoadSummary, SchemaError, SchemaRegistry};

pub use binder::{bind, BoundService, BoundTable};
pub use override_slot::{OverrideSlot, PendingOverride};
pub use resolver::{resolve, Resolution};

/// Error type for engine mutation entry points.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid schema file name: {0}")]
    InvalidFileName(String),

    #[error("Failed to write schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coordinating object owning schema, response, and override state.
pub struct Engine {
    registry: SchemaRegistry,
    store: ResponseStore,
    overrides: OverrideSlot,
    table: ArcSwap<BoundTable>,
}

impl Engine {
    /// Create an engine over the configured source directories. Call
    /// [`Engine::bootstrap`] to perform the initial load.
    pub fn new(sources: &SourcesConfig) -> Self {
        Self {
            registry: SchemaRegistry::new(Path::new(&sources.proto_dir)),
            store: ResponseStore::new(Path::new(&sources.config_dir)),
            overrides: OverrideSlot::new(),
            table: ArcSwap::from_pointee(BoundTable::default()),
        }
    }

    /// Initial load: schemas, responses, then bind.
    pub fn bootstrap(&self) {
        if let Err(e) = self.registry.load() {
            tracing::error!(error = %e, "Initial schema load failed, starting with no schemas");
        }
        self.store.reload();
        self.rebind();
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn overrides(&self) -> &OverrideSlot {
        &self.overrides
    }

    /// Current bound service table snapshot.
    pub fn bound_table(&self) -> Arc<BoundTable> {
        self.table.load_full()
    }

    /// Rebuild the bound table from the current schema and response
    /// snapshots and install it atomically.
    pub fn rebind(&self) {
        let table = bind(&self.registry.snapshot(), &self.store.snapshot());
        tracing::info!(services = table.len(), "Service table bound");
        self.table.store(Arc::new(table));
    }

    /// Schema-source reload pipeline: reload registry, re-bind.
    pub fn reload_schemas(&self) {
        if let Err(e) = self.registry.load() {
            tracing::error!(error = %e, "Schema reload failed, keeping previous index");
            return;
        }
        self.rebind();
        metrics::record_reload("schemas");
    }

    /// Configuration-source reload pipeline: reload store, re-bind.
    pub fn reload_responses(&self) {
        self.store.reload();
        self.rebind();
        metrics::record_reload("responses");
    }

    /// Runtime mutation entry point: upsert a response rule, persist, and
    /// re-bind so newly configured services attach.
    pub fn upsert_response(
        &self,
        service: &str,
        method: &str,
        pattern: Option<&Value>,
        response: Value,
    ) -> Result<(), EngineError> {
        self.store.upsert(service, method, pattern, response)?;
        self.rebind();
        Ok(())
    }

    /// Runtime mutation entry point: write a schema file into the proto
    /// directory and run the schema reload pipeline.
    pub fn add_schema_file(&self, name: &str, content: &str) -> Result<LoadSummary, EngineError> {
        if name.contains(['/', '\\'])
            || name.contains("..")
            || !name.ends_with(".proto")
            || name.len() == ".proto".len()
        {
            return Err(EngineError::InvalidFileName(name.to_string()));
        }
        std::fs::write(self.registry.proto_dir().join(name), content)?;
        let summary = self.registry.load()?;
        self.rebind();
        Ok(summary)
    }

    /// Set the one-shot override.
    pub fn set_override(&self, pending: PendingOverride) {
        tracing::info!(
            service = %pending.service,
            method = %pending.method,
            "Override response set"
        );
        self.overrides.set(pending);
    }

    /// Explicitly clear the one-shot override.
    pub fn clear_override(&self) {
        self.overrides.clear();
    }

    /// Resolve one call: override first (consumed at most once), then the
    /// configured rule for (service, method). `None` means a resolution gap
    /// the transport reports as Unimplemented.
    pub fn resolve_call(&self, service: &str, method: &str, request: &Value) -> Option<Value> {
        if let Some(payload) = self.overrides.take_if(service, method) {
            tracing::info!(service, method, outcome = "override", "Resolved call");
            metrics::record_call(service, method, "override");
            return Some(payload);
        }

        let snapshot = self.store.snapshot();
        let Some(rule) = snapshot.get(service).and_then(|m| m.get(method)) else {
            tracing::warn!(service, method, "No rule configured for call");
            metrics::record_call(service, method, "unconfigured");
            return None;
        };

        let resolution = resolve(rule, request);
        let label = resolution.label();
        metrics::record_call(service, method, label);
        match &resolution {
            Resolution::Fallthrough(_) => tracing::warn!(
                service,
                method,
                outcome = label,
                "No pattern matched; returning last-inspected rule (legacy fall-through)"
            ),
            _ => tracing::debug!(service, method, outcome = label, "Resolved call"),
        }
        resolution.into_payload()
    }
}
