//! Filesystem watcher for the schema and response sources.
//!
//! # Responsibilities
//! - Watch the proto and config directories for changes
//! - Classify raw events by source and forward a coalesced signal
//!
//! # Design Decisions
//! - Channels have capacity one and are fed with `try_send`: a burst of
//!   filesystem events while a reload is pending collapses into a single
//!   subsequent reload (at-least-once, never per-event)
//! - Watcher errors are logged, never fatal to a running server

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watches both source directories and emits coalesced reload signals.
pub struct SourceWatcher {
    proto_dir: PathBuf,
    config_dir: PathBuf,
    schema_tx: mpsc::Sender<()>,
    response_tx: mpsc::Sender<()>,
}

impl SourceWatcher {
    /// Create a watcher over the given directories.
    ///
    /// Returns the watcher plus one receiver per change channel.
    pub fn new(
        proto_dir: &Path,
        config_dir: &Path,
    ) -> (Self, mpsc::Receiver<()>, mpsc::Receiver<()>) {
        let (schema_tx, schema_rx) = mpsc::channel(1);
        let (response_tx, response_rx) = mpsc::channel(1);
        (
            Self {
                proto_dir: proto_dir.to_path_buf(),
                config_dir: config_dir.to_path_buf(),
                schema_tx,
                response_tx,
            },
            schema_rx,
            response_rx,
        )
    }

    /// Start watching in a background thread owned by notify.
    ///
    /// The returned watcher must be kept alive for watching to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        // Canonicalize so event paths (absolute) classify by prefix.
        let proto_dir = self.proto_dir.canonicalize().unwrap_or(self.proto_dir.clone());
        let config_dir = self
            .config_dir
            .canonicalize()
            .unwrap_or(self.config_dir.clone());
        let schema_tx = self.schema_tx.clone();
        let response_tx = self.response_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
                    {
                        return;
                    }
                    if event.paths.iter().any(|p| p.starts_with(&proto_dir)) {
                        tracing::info!("Schema source changed");
                        // Full channel means a reload is already pending.
                        let _ = schema_tx.try_send(());
                    }
                    if event.paths.iter().any(|p| p.starts_with(&config_dir)) {
                        tracing::info!("Response configuration source changed");
                        let _ = response_tx.try_send(());
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.proto_dir, RecursiveMode::NonRecursive)?;
        watcher.watch(&self.config_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(
            proto_dir = ?self.proto_dir,
            config_dir = ?self.config_dir,
            "Source watcher started"
        );
        Ok(watcher)
    }
}
