//! gRPC listener and connection serving.
//!
//! # Responsibilities
//! - Bind the configured insecure endpoint (bind failure is fatal)
//! - Accept connections with a max-connections semaphore for backpressure
//! - Serve each connection as HTTP/2 and dispatch calls to the engine
//! - Graceful drain: stop accepting, finish in-flight connections, return

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http2;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::config::ListenerConfig;
use crate::engine::Engine;
use crate::grpc::service::handle_call;
use crate::lifecycle::Shutdown;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Invalid bind address {0}: {1}")]
    Address(String, std::net::AddrParseError),

    #[error("Failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),
}

/// The emulated gRPC server.
pub struct GrpcServer {
    engine: Arc<Engine>,
    config: ListenerConfig,
}

impl GrpcServer {
    pub fn new(engine: Arc<Engine>, config: ListenerConfig) -> Self {
        Self { engine, config }
    }

    /// Bind the configured address. Failure here is fatal to the process:
    /// the caller logs and exits without serving.
    pub async fn bind(&self) -> Result<TcpListener, ListenerError> {
        let addr: SocketAddr = self
            .config
            .bind_address
            .parse()
            .map_err(|e| ListenerError::Address(self.config.bind_address.clone(), e))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ListenerError::Bind(addr, e))?;
        tracing::info!(
            address = %addr,
            max_connections = self.config.max_connections,
            "gRPC listener bound"
        );
        Ok(listener)
    }

    /// Accept and serve connections until shutdown, then drain.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) {
        let limit = Arc::new(Semaphore::new(self.config.max_connections));
        let graceful = GracefulShutdown::new();
        let mut shutdown_rx = shutdown.subscribe();

        loop {
            // Acquire a slot first (backpressure), then accept.
            let permit = tokio::select! {
                _ = shutdown_rx.recv() => break,
                permit = limit.clone().acquire_owned() => {
                    permit.expect("Semaphore closed unexpectedly")
                }
            };
            let (stream, peer) = tokio::select! {
                _ = shutdown_rx.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                }
            };
            tracing::debug!(peer = %peer, "Connection accepted");

            let engine = self.engine.clone();
            let service = service_fn(move |req| {
                let engine = engine.clone();
                async move { Ok::<_, Infallible>(handle_call(engine, req).await) }
            });
            let conn = http2::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service);
            let conn = graceful.watch(conn);
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
                }
                drop(permit);
            });
        }

        tracing::info!("Draining in-flight gRPC connections");
        graceful.shutdown().await;
        tracing::info!("gRPC server stopped");
    }
}
