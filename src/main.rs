//! Dynamic gRPC service emulator.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                  PROTOMOCK                    │
//!                      │                                               │
//!   gRPC call          │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ──────────────────►│  │  grpc  │──►│ engine  │──►│  responses  │  │
//!                      │  │ server │   │ resolve │   │  store      │  │
//!                      │  └────────┘   └────┬────┘   └─────────────┘  │
//!                      │                    │                         │
//!                      │               ┌────▼────┐   ┌─────────────┐  │
//!                      │               │ binder  │◄──│  schemas    │  │
//!                      │               │  table  │   │  registry   │  │
//!                      │               └─────────┘   └─────────────┘  │
//!                      │                                               │
//!   control API        │  ┌─────────┐            ┌──────────────────┐ │
//!   ──────────────────►│  │ control │            │ reload (watcher  │ │
//!                      │  │  axum   │            │  + coordinator)  │ │
//!                      │  └─────────┘            └──────────────────┘ │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use protomock::config::loader::{ensure_source_dirs, load_config};
use protomock::config::EmulatorConfig;
use protomock::control::{control_router, ControlState};
use protomock::engine::Engine;
use protomock::grpc::GrpcServer;
use protomock::lifecycle::{signals, Shutdown};
use protomock::observability::{logging, metrics};
use protomock::reload::{coordinator, SourceWatcher};

#[derive(Parser, Debug)]
#[command(version, about = "Dynamic gRPC service emulator")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EmulatorConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "protomock starting");

    ensure_source_dirs(&config)?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        proto_dir = %config.sources.proto_dir,
        config_dir = %config.sources.config_dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Initial load: schemas, responses, bind.
    let engine = Arc::new(Engine::new(&config.sources));
    engine.bootstrap();

    let shutdown = Arc::new(Shutdown::new());

    // Hot reload: watcher feeds the coordinator through coalesced channels.
    // The watcher handle must stay alive for the process lifetime.
    let mut _watcher = None;
    if config.sources.watch {
        let (source_watcher, schema_rx, response_rx) = SourceWatcher::new(
            std::path::Path::new(&config.sources.proto_dir),
            std::path::Path::new(&config.sources.config_dir),
        );
        match source_watcher.run() {
            Ok(handle) => {
                _watcher = Some(handle);
                let engine = engine.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    coordinator::run(engine, schema_rx, response_rx, &shutdown).await;
                });
            }
            Err(e) => tracing::error!(error = %e, "Failed to start source watcher"),
        }
    }

    // Control API.
    if config.control.enabled {
        let router = control_router(ControlState {
            engine: engine.clone(),
        });
        let control_listener = TcpListener::bind(&config.control.bind_address).await?;
        tracing::info!(address = %config.control.bind_address, "Control API started");
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut rx = shutdown.subscribe();
            let result = axum::serve(control_listener, router)
                .with_graceful_shutdown(async move {
                    let _ = rx.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Control API server error");
            }
        });
    }

    // gRPC server: bind failure is fatal, the process does not serve.
    let server = GrpcServer::new(engine, config.listener.clone());
    let grpc_listener = server.bind().await?;

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::watch_signals(&shutdown).await;
        });
    }

    server.run(grpc_listener, &shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
