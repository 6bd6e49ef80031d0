//! Schema registry with a flattened service index.
//!
//! # Responsibilities
//! - Own the current set of loaded service descriptors
//! - Flatten every compiled namespace into fully-qualified-name lookups
//! - Replace the index atomically on reload (swap-on-completion)
//!
//! # Design Decisions
//! - Every file compiles into its own pool; a duplicate service name across
//!   files resolves to the first definition in sorted file order
//! - One bad file never aborts the load; it is logged and skipped

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use prost_reflect::ServiceDescriptor;

use crate::schemas::loader::{compile_file, scan_proto_files, LoadSummary, SchemaError};

/// Flattened mapping from fully-qualified service name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    services: HashMap<String, ServiceDescriptor>,
}

impl DescriptorIndex {
    /// Look up a service by its dotted fully-qualified name.
    pub fn get(&self, full_name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(full_name)
    }

    /// Number of indexed services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True when no services are indexed.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Iterate over indexed service names.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

/// Loads and indexes service definitions from the proto directory.
pub struct SchemaRegistry {
    proto_dir: PathBuf,
    index: ArcSwap<DescriptorIndex>,
}

impl SchemaRegistry {
    /// Create a registry over `proto_dir`. Call [`SchemaRegistry::load`] to
    /// populate it.
    pub fn new(proto_dir: &Path) -> Self {
        Self {
            proto_dir: proto_dir.to_path_buf(),
            index: ArcSwap::from_pointee(DescriptorIndex::default()),
        }
    }

    /// Directory scanned for schema files.
    pub fn proto_dir(&self) -> &Path {
        &self.proto_dir
    }

    /// Take a consistent snapshot of the current index.
    pub fn snapshot(&self) -> Arc<DescriptorIndex> {
        self.index.load_full()
    }

    /// Scan and compile the proto directory, replacing the previous index.
    ///
    /// Each file compiles independently; failures are logged and skipped.
    /// The new index is installed in a single swap so concurrent readers
    /// never observe a partial load.
    pub fn load(&self) -> Result<LoadSummary, SchemaError> {
        let files = scan_proto_files(&self.proto_dir)?;
        let mut services: HashMap<String, ServiceDescriptor> = HashMap::new();
        let mut summary = LoadSummary::default();

        for path in &files {
            tracing::debug!(path = ?path, "Compiling proto file");
            match compile_file(path, &self.proto_dir) {
                Ok(pool) => {
                    summary.files_loaded += 1;
                    for service in pool.services() {
                        // First definition wins (sorted file order).
                        services
                            .entry(service.full_name().to_string())
                            .or_insert(service);
                    }
                }
                Err(e) => {
                    summary.files_skipped += 1;
                    tracing::error!(path = ?path, error = %e, "Skipping proto file");
                }
            }
        }

        summary.services = services.len();
        tracing::info!(
            files_loaded = summary.files_loaded,
            files_skipped = summary.files_skipped,
            services = summary.services,
            "Schema registry loaded"
        );

        self.index.store(Arc::new(DescriptorIndex { services }));
        Ok(summary)
    }
}
