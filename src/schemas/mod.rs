//! Schema definition subsystem.
//!
//! # Data Flow
//! ```text
//! proto_dir/*.proto
//!     → loader.rs (scan, compile each file independently via protox)
//!     → registry.rs (flatten into fully-qualified-name index)
//!     → DescriptorIndex snapshot shared via ArcSwap to the binder
//! ```

pub mod loader;
pub mod registry;

pub use loader::{LoadSummary, SchemaError};
pub use registry::{DescriptorIndex, SchemaRegistry};
