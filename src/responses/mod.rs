//! Response configuration subsystem.
//!
//! # Data Flow
//! ```text
//! responses.json
//!     → store.rs (parse into ResponseMap, fail-safe-empty)
//!     → rule.rs (per-method rule classification)
//!     → snapshot shared via ArcSwap to call resolution
//!
//! Runtime upsert (control API):
//!     store.rs clone-mutate-swap
//!     → write-through persistence to responses.json
//! ```

pub mod rule;
pub mod store;

pub use rule::MethodRule;
pub use store::{ResponseMap, ResponseStore, StoreError};
