//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → EmulatorConfig (immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Server config is immutable once loaded; only the schema/response
//!   sources it points at are hot-reloadable
//! - All fields have defaults to allow minimal (or absent) configs

pub mod loader;
pub mod schema;

pub use schema::ControlConfig;
pub use schema::EmulatorConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::SourcesConfig;
