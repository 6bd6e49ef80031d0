//! Dynamic gRPC service emulator library.

pub mod config;
pub mod control;
pub mod engine;
pub mod grpc;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod responses;
pub mod schemas;

pub use config::EmulatorConfig;
pub use engine::Engine;
pub use grpc::GrpcServer;
pub use lifecycle::Shutdown;
