//! Hot reload subsystem.
//!
//! # Data Flow
//! ```text
//! filesystem events (proto_dir, config_dir)
//!     → watcher.rs (classify by source, coalesce into capacity-1 channels)
//!     → coordinator.rs (fixed reload pipelines)
//!     → engine (registry/store reload + re-bind)
//! ```

pub mod coordinator;
pub mod watcher;

pub use watcher::SourceWatcher;
