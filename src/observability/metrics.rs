//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, route, status
//! - `api_request_duration_seconds` (histogram): dispatch latency
//! - `api_route_table_rebuilds_total` (counter): rebuilds by result
//! - `api_routes_registered` (gauge): routes in the published table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Route label is the pattern (`/blog/[post]`), never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Route label for requests that matched nothing.
pub const UNMATCHED_ROUTE: &str = "none";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a route table rebuild attempt.
pub fn record_rebuild(success: bool) {
    let result = if success { "ok" } else { "error" };
    metrics::counter!("api_route_table_rebuilds_total", "result" => result).increment(1);
}

pub fn record_routes_registered(count: usize) {
    metrics::gauge!("api_routes_registered").set(count as f64);
}
