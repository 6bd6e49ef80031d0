//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Default filter from config, overridable via RUST_LOG
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Environment always wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `log_level` is the configured default; `RUST_LOG` overrides it.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("protomock={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
