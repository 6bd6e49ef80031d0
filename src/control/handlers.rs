//! Control API request handlers.
//!
//! # Responsibilities
//! - Set and clear the one-shot override
//! - Upsert response rules at runtime
//! - Add schema files at runtime (write, then reload pipeline)
//!
//! # Design Decisions
//! - Missing required fields are rejected with 400 before any state
//!   mutation
//! - Bodies use camelCase keys for compatibility with existing tooling

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::control::ControlState;
use crate::engine::{EngineError, PendingOverride};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideRequest {
    pub service_name: Option<String>,
    pub method_name: Option<String>,
    pub response_payload: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertRequest {
    pub service_name: Option<String>,
    pub method_name: Option<String>,
    /// Optional request pattern; absent means "set the default response".
    pub pattern: Option<Value>,
    pub response: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddProtoRequest {
    pub file_name: Option<String>,
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub services_bound: usize,
    pub rules_configured: usize,
    pub override_pending: bool,
}

pub async fn set_override(
    State(state): State<ControlState>,
    Json(body): Json<OverrideRequest>,
) -> (StatusCode, String) {
    let (Some(service), Some(method), Some(payload)) =
        (body.service_name, body.method_name, body.response_payload)
    else {
        return (StatusCode::BAD_REQUEST, "Invalid payload".to_string());
    };
    state.engine.set_override(PendingOverride {
        service,
        method,
        payload,
    });
    (
        StatusCode::OK,
        "Override response set successfully".to_string(),
    )
}

pub async fn clear_override(State(state): State<ControlState>) -> (StatusCode, String) {
    state.engine.clear_override();
    (StatusCode::OK, "Override cleared".to_string())
}

pub async fn upsert_response(
    State(state): State<ControlState>,
    Json(body): Json<UpsertRequest>,
) -> (StatusCode, String) {
    let (Some(service), Some(method), Some(response)) =
        (body.service_name, body.method_name, body.response)
    else {
        return (StatusCode::BAD_REQUEST, "Invalid payload".to_string());
    };
    match state
        .engine
        .upsert_response(&service, &method, body.pattern.as_ref(), response)
    {
        Ok(()) => (StatusCode::OK, "Response mapping updated".to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to upsert response mapping");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn add_proto(
    State(state): State<ControlState>,
    Json(body): Json<AddProtoRequest>,
) -> (StatusCode, String) {
    let (Some(file_name), Some(content)) = (body.file_name, body.content) else {
        return (StatusCode::BAD_REQUEST, "Invalid payload".to_string());
    };
    match state.engine.add_schema_file(&file_name, &content) {
        Ok(summary) => (
            StatusCode::OK,
            format!(
                "Schema added; {} files loaded, {} skipped",
                summary.files_loaded, summary.files_skipped
            ),
        ),
        Err(e @ EngineError::InvalidFileName(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to add schema file");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn get_status(State(state): State<ControlState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        services_bound: state.engine.bound_table().len(),
        rules_configured: state.engine.store().rule_count(),
        override_pending: state.engine.overrides().peek().is_some(),
    })
}
