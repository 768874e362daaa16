//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_routes_registered` (gauge): table size after build
//! - `router_dispatch_total` (counter): dispatches by verb, outcome
//! - `router_dispatch_duration_seconds` (histogram): dispatch + invoke latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::table::Verb;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_routes_registered(count: usize) {
    metrics::gauge!("router_routes_registered").set(count as f64);
}

pub fn record_dispatch(verb: Verb, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "router_dispatch_total",
        "verb" => verb.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", "verb" => verb.as_str())
        .record(start.elapsed().as_secs_f64());
}
