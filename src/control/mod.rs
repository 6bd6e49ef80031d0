//! HTTP control API.
//!
//! Lets an operator set the one-shot override, mutate response rules, and
//! add schema files while the emulator is serving. Authentication is out of
//! scope; bind this to a trusted interface.

pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use self::handlers::*;

/// Shared state injected into control handlers.
#[derive(Clone)]
pub struct ControlState {
    pub engine: Arc<Engine>,
}

/// Build the control API router.
pub fn control_router(state: ControlState) -> Router {
    Router::new()
        .route("/api/override", post(set_override).delete(clear_override))
        .route("/api/responses", post(upsert_response))
        .route("/api/protos", post(add_proto))
        .route("/api/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
