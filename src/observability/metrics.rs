//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method, status, upstream
//! - `gateway_request_duration_seconds` (histogram): forwarding latency
//! - `gateway_upstream_errors_total` (counter): transport-level upstream failures
//! - `stock_breaker_transitions_total` (counter): circuit state changes
//! - `stock_cache_events_total` (counter): cache hits and misses
//! - `health_dependency_up` (gauge): 1=healthy, 0=unhealthy per dependency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded request.
pub fn record_forward(method: &str, status: u16, upstream: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "upstream" => upstream.to_string(),
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "upstream" => upstream.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a transport-level upstream failure.
pub fn record_upstream_error(upstream: &str) {
    counter!("gateway_upstream_errors_total", "upstream" => upstream.to_string()).increment(1);
}

/// Record a circuit breaker state change.
pub fn record_breaker_transition(endpoint: &str, state: &'static str) {
    counter!(
        "stock_breaker_transitions_total",
        "endpoint" => endpoint.to_string(),
        "state" => state,
    )
    .increment(1);
}

/// Record a stock cache lookup outcome.
pub fn record_cache_event(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("stock_cache_events_total", "outcome" => outcome).increment(1);
}

/// Record a dependency health observation.
pub fn record_dependency_health(name: &str, healthy: bool) {
    gauge!("health_dependency_up", "dependency" => name.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
