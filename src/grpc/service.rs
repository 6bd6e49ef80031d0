//! Per-call gRPC dispatch.
//!
//! # Responsibilities
//! - Route `/package.Service/Method` paths through the bound table
//! - Drive tonic's unary machinery with the dynamic codec
//! - Report resolution gaps as gRPC Unimplemented, never a crash
//!
//! # Design Decisions
//! - The bound table is looked up per call, so reloads take effect without
//!   touching live connections
//! - Only unary methods are emulated; streaming methods return
//!   Unimplemented

use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::HeaderValue;
use prost_reflect::{DynamicMessage, MessageDescriptor};
use tonic::body::Body;
use tonic::server::{Grpc, UnaryService};
use tonic::Status;

use crate::engine::Engine;
use crate::grpc::codec::{json_to_message, message_to_json, DynamicCodec};

/// Handle one HTTP/2 request carrying a gRPC call.
pub async fn handle_call(
    engine: Arc<Engine>,
    req: http::Request<hyper::body::Incoming>,
) -> http::Response<Body> {
    let path = req.uri().path().to_string();
    let Some((service, method)) = split_call_path(&path) else {
        return status_response(Status::unimplemented(format!("Malformed call path: {path}")));
    };

    let table = engine.bound_table();
    let Some(descriptor) = table.lookup(service, method) else {
        tracing::warn!(service, method, "Call to unbound service or method");
        return status_response(Status::unimplemented(format!("{path} is not emulated")));
    };
    if descriptor.is_client_streaming() || descriptor.is_server_streaming() {
        return status_response(Status::unimplemented(
            "Streaming methods are not emulated",
        ));
    }

    let resolver = CallResolver {
        engine: engine.clone(),
        service: service.to_string(),
        method: method.to_string(),
        output: descriptor.output(),
    };
    let mut grpc = Grpc::new(DynamicCodec::server(descriptor));
    grpc.unary(resolver, req).await
}

/// Split a request path into (service, method).
fn split_call_path(path: &str) -> Option<(&str, &str)> {
    let mut parts = path.trim_start_matches('/').splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(service), Some(method)) if !service.is_empty() && !method.is_empty() => {
            Some((service, method))
        }
        _ => None,
    }
}

/// Unary handler resolving against the engine's current snapshots.
struct CallResolver {
    engine: Arc<Engine>,
    service: String,
    method: String,
    output: MessageDescriptor,
}

impl CallResolver {
    fn respond(&self, request: DynamicMessage) -> Result<tonic::Response<DynamicMessage>, Status> {
        let request_json = message_to_json(&request)
            .map_err(|e| Status::internal(format!("Failed to view request as JSON: {e}")))?;
        tracing::debug!(
            service = %self.service,
            method = %self.method,
            request = %request_json,
            "Received call"
        );

        let payload = self
            .engine
            .resolve_call(&self.service, &self.method, &request_json)
            .ok_or_else(|| {
                Status::unimplemented(format!(
                    "No response configured for {}/{}",
                    self.service, self.method
                ))
            })?;

        let message = json_to_message(self.output.clone(), payload).map_err(|e| {
            Status::internal(format!(
                "Configured response does not fit {}: {e}",
                self.output.full_name()
            ))
        })?;
        Ok(tonic::Response::new(message))
    }
}

impl UnaryService<DynamicMessage> for CallResolver {
    type Response = DynamicMessage;
    type Future = std::future::Ready<Result<tonic::Response<DynamicMessage>, Status>>;

    fn call(&mut self, request: tonic::Request<DynamicMessage>) -> Self::Future {
        std::future::ready(self.respond(request.into_inner()))
    }
}

/// Build a trailers-only gRPC response for a status.
fn status_response(status: Status) -> http::Response<Body> {
    let mut response = http::Response::new(Body::empty());
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    response
        .headers_mut()
        .insert("grpc-status", HeaderValue::from(status.code() as i32));
    if !status.message().is_empty() {
        if let Ok(value) = HeaderValue::from_str(status.message()) {
            response.headers_mut().insert("grpc-message", value);
        }
    }
    response
}
