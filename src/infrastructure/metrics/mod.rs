//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Active relay sessions gauge
//! - Location updates by outcome (relayed, rejected)
//! - Fan-out deliveries skipped because a recipient was unreachable

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("location_relay"),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace("location_relay")
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Sessions currently registered with the hub
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("sessions_active", "Number of sessions registered with the hub")
            .namespace("location_relay"),
    )
    .expect("Failed to create SESSIONS_ACTIVE metric")
});

/// Location updates by outcome
pub static LOCATION_UPDATES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("location_updates_total", "Location updates submitted to the hub")
            .namespace("location_relay"),
        &["outcome"], // "relayed", "rejected"
    )
    .expect("Failed to create LOCATION_UPDATES_TOTAL metric")
});

/// Deliveries skipped during fan-out
pub static DELIVERIES_SKIPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "deliveries_skipped_total",
            "Fan-out deliveries dropped because the recipient queue was full or closed",
        )
        .namespace("location_relay"),
    )
    .expect("Failed to create DELIVERIES_SKIPPED_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .expect("Failed to register SESSIONS_ACTIVE");
    registry
        .register(Box::new(LOCATION_UPDATES_TOTAL.clone()))
        .expect("Failed to register LOCATION_UPDATES_TOTAL");
    registry
        .register(Box::new(DELIVERIES_SKIPPED_TOTAL.clone()))
        .expect("Failed to register DELIVERIES_SKIPPED_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to update the active session gauge
pub fn set_active_sessions(count: usize) {
    Lazy::force(&REGISTRY);
    SESSIONS_ACTIVE.set(count as i64);
}

/// Helper to count a relayed location update
pub fn record_location_relayed() {
    Lazy::force(&REGISTRY);
    LOCATION_UPDATES_TOTAL.with_label_values(&["relayed"]).inc();
}

/// Helper to count a rejected location update
pub fn record_location_rejected() {
    Lazy::force(&REGISTRY);
    LOCATION_UPDATES_TOTAL.with_label_values(&["rejected"]).inc();
}

/// Helper to count skipped fan-out deliveries
pub fn record_deliveries_skipped(count: usize) {
    if count > 0 {
        Lazy::force(&REGISTRY);
        DELIVERIES_SKIPPED_TOTAL.inc_by(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*SESSIONS_ACTIVE;
        let _ = &*LOCATION_UPDATES_TOTAL;
        let _ = &*DELIVERIES_SKIPPED_TOTAL;
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("location_relay_http_requests_total"));
    }

    #[test]
    fn test_location_counters() {
        record_location_relayed();
        record_location_rejected();
        let metrics = gather_metrics();
        assert!(metrics.contains("location_relay_location_updates_total"));
        assert!(metrics.contains("outcome=\"rejected\""));
    }
}
