//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by response status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_rate_limited_total` (counter): requests rejected with 429
//! - `relay_mail_total` (counter): dispatch attempts by origin and outcome
//! - `relay_rate_limit_keys` (gauge): client keys tracked by the limiter
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("relay_requests_total", "status" => status.to_string()).increment(1);
    histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("relay_rate_limited_total").increment(1);
}

pub fn record_mail(origin: &str, outcome: &'static str) {
    counter!("relay_mail_total", "origin" => origin.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_rate_limit_keys(count: usize) {
    gauge!("relay_rate_limit_keys").set(count as f64);
}
