//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the emulator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the emulator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EmulatorConfig {
    /// gRPC listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Control API settings.
    pub control: ControlConfig,

    /// Schema and response source directories.
    pub sources: SourcesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// gRPC listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9090").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9090".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Enable the HTTP control API.
    pub enabled: bool,

    /// Control API bind address.
    pub bind_address: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Schema and response configuration sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory scanned for `.proto` schema files.
    pub proto_dir: String,

    /// Directory holding `responses.json`.
    pub config_dir: String,

    /// Watch both directories and hot-reload on changes.
    pub watch: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proto_dir: "./protos".to_string(),
            config_dir: "./config".to_string(),
            watch: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9100".to_string(),
        }
    }
}
