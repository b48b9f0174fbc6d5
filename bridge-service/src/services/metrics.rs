//! Metrics collection for bridge-service.
//!
//! HTTP metrics come from the `metrics` recorder; domain counters live in a
//! separate Prometheus registry and are appended to the same scrape.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::{Once, OnceLock};

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static WEBHOOK_EVENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static BEST_EFFORT_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize metrics collection before serving. Later calls are no-ops.
pub fn init_metrics() {
    INIT.call_once(install);
}

fn install() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }

    let registry = Registry::new();

    let events_counter = IntCounterVec::new(
        Opts::new(
            "bridge_webhook_events_total",
            "Webhook deliveries by event type and outcome",
        ),
        &["event_type", "outcome"],
    )
    .expect("Failed to create bridge_webhook_events_total metric");

    let failures_counter = IntCounterVec::new(
        Opts::new(
            "bridge_best_effort_failures_total",
            "Failures tolerated without aborting startup or the webhook",
        ),
        &["operation"],
    )
    .expect("Failed to create bridge_best_effort_failures_total metric");

    registry
        .register(Box::new(events_counter.clone()))
        .expect("Failed to register bridge_webhook_events_total");
    registry
        .register(Box::new(failures_counter.clone()))
        .expect("Failed to register bridge_best_effort_failures_total");

    PROMETHEUS_REGISTRY
        .set(registry)
        .expect("Failed to set prometheus registry");
    WEBHOOK_EVENTS_TOTAL
        .set(events_counter)
        .expect("Failed to set bridge_webhook_events_total");
    BEST_EFFORT_FAILURES_TOTAL
        .set(failures_counter)
        .expect("Failed to set bridge_best_effort_failures_total");
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record the outcome of one webhook delivery.
pub fn record_event(event_type: &str, outcome: &str) {
    if let Some(counter) = WEBHOOK_EVENTS_TOTAL.get() {
        counter.with_label_values(&[event_type, outcome]).inc();
    }
}

/// Record a failure that was logged and then deliberately ignored.
pub fn record_best_effort_failure(operation: &str) {
    if let Some(counter) = BEST_EFFORT_FAILURES_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}
