//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use prost_reflect::MethodDescriptor;
use serde_json::Value;
use tonic::transport::{Channel, Endpoint};

use protomock::config::{ListenerConfig, SourcesConfig};
use protomock::engine::Engine;
use protomock::grpc::codec::{json_to_message, message_to_json};
use protomock::grpc::{DynamicCodec, GrpcServer};
use protomock::lifecycle::Shutdown;

pub const GREETER_PROTO: &str = r#"
syntax = "proto3";
package pkg;

service Greeter {
    rpc SayHello (HelloRequest) returns (HelloReply);
}

message HelloRequest {
    string name = 1;
}

message HelloReply {
    string message = 1;
}
"#;

/// A running emulator over temp source directories.
pub struct TestServer {
    pub addr: SocketAddr,
    pub engine: Arc<Engine>,
    pub shutdown: Arc<Shutdown>,
    pub server_task: tokio::task::JoinHandle<()>,
    // Dropping the TempDir removes the source directories.
    _dirs: tempfile::TempDir,
}

/// Start a full emulator with the Greeter schema loaded and no rules.
pub async fn start_emulator() -> TestServer {
    let dirs = tempfile::tempdir().unwrap();
    let proto_dir = dirs.path().join("protos");
    let config_dir = dirs.path().join("config");
    std::fs::create_dir_all(&proto_dir).unwrap();
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(proto_dir.join("greeter.proto"), GREETER_PROTO).unwrap();

    let engine = Arc::new(Engine::new(&SourcesConfig {
        proto_dir: proto_dir.to_string_lossy().into_owned(),
        config_dir: config_dir.to_string_lossy().into_owned(),
        watch: false,
    }));
    engine.bootstrap();

    let config = ListenerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        max_connections: 64,
    };
    let server = GrpcServer::new(engine.clone(), config);
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let server_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            server.run(listener, &shutdown).await;
        })
    };

    TestServer {
        addr,
        engine,
        shutdown,
        server_task,
        _dirs: dirs,
    }
}

/// Find a method descriptor in the engine's current schema snapshot.
pub fn method_descriptor(engine: &Engine, service: &str, method: &str) -> MethodDescriptor {
    engine
        .registry()
        .snapshot()
        .get(service)
        .unwrap_or_else(|| panic!("service {service} not loaded"))
        .methods()
        .find(|m| m.name() == method)
        .unwrap_or_else(|| panic!("method {method} not found"))
}

/// Connect a client channel, retrying briefly while the server comes up.
pub async fn connect(addr: SocketAddr) -> Channel {
    let endpoint = Endpoint::from_shared(format!("http://{addr}")).unwrap();
    for _ in 0..20 {
        if let Ok(channel) = endpoint.connect().await {
            return channel;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("failed to connect to {addr}");
}

/// Perform one dynamic unary call, JSON in / JSON out.
pub async fn call_unary(
    channel: Channel,
    method: &MethodDescriptor,
    request: Value,
) -> Result<Value, tonic::Status> {
    let message = json_to_message(method.input(), request)
        .map_err(|e| tonic::Status::internal(e.to_string()))?;

    let mut client = tonic::client::Grpc::new(channel);
    client
        .ready()
        .await
        .map_err(|e| tonic::Status::unavailable(e.to_string()))?;

    let path = http::uri::PathAndQuery::from_maybe_shared(format!(
        "/{}/{}",
        method.parent_service().full_name(),
        method.name()
    ))
    .map_err(|e| tonic::Status::internal(e.to_string()))?;

    let response = client
        .unary(
            tonic::Request::new(message),
            path,
            DynamicCodec::client(method),
        )
        .await?;
    message_to_json(response.get_ref()).map_err(|e| tonic::Status::internal(e.to_string()))
}
