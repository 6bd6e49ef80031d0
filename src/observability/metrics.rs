//! Metrics collection and exposition.
//!
//! # Metrics
//! - `protomock_calls_total` (counter): resolved calls by service, method,
//!   outcome (override / pattern / default / fallthrough / unconfigured)
//! - `protomock_reloads_total` (counter): reload pipelines by source
//!
//! # Design Decisions
//! - Metrics are cheap counter increments; recording is a no-op until an
//!   exporter is installed

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given scrape address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// Record one resolved (or failed) call.
pub fn record_call(service: &str, method: &str, outcome: &'static str) {
    counter!(
        "protomock_calls_total",
        "service" => service.to_string(),
        "method" => method.to_string(),
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record one reload pipeline run.
pub fn record_reload(source: &'static str) {
    counter!("protomock_reloads_total", "source" => source).increment(1);
}
