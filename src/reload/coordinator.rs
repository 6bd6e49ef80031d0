//! Reload coordination.
//!
//! # Responsibilities
//! - Turn coalesced change signals into the fixed reload pipelines
//! - Schema changed: reload registry, re-bind
//! - Responses changed: reload store, re-bind (handlers are pure functions
//!   of the snapshots, so re-binding subsumes the handler rebuild)
//!
//! # Design Decisions
//! - Loads run inline on this task; in-flight call resolution is never
//!   blocked because it only reads previously installed snapshots

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::Engine;
use crate::lifecycle::Shutdown;

/// Drive reload pipelines until shutdown.
pub async fn run(
    engine: Arc<Engine>,
    mut schema_rx: mpsc::Receiver<()>,
    mut response_rx: mpsc::Receiver<()>,
    shutdown: &Shutdown,
) {
    let mut shutdown_rx = shutdown.subscribe();
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            signal = schema_rx.recv() => match signal {
                Some(()) => {
                    tracing::info!("Reloading schemas");
                    engine.reload_schemas();
                }
                None => break,
            },
            signal = response_rx.recv() => match signal {
                Some(()) => {
                    tracing::info!("Reloading response configuration");
                    engine.reload_responses();
                }
                None => break,
            },
        }
    }
    tracing::debug!("Reload coordinator stopped");
}
