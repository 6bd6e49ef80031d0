//! gRPC transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, HTTP/2, backpressure, drain)
//!     → service.rs (path → bound table → tonic unary dispatch)
//!     → codec.rs (DynamicMessage <-> wire bytes, message <-> JSON view)
//!     → engine (override / rule resolution)
//! ```

pub mod codec;
pub mod server;
pub mod service;

pub use codec::DynamicCodec;
pub use server::{GrpcServer, ListenerError};
