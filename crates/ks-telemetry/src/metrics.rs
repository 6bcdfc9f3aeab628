//! Prometheus metrics for the relay engine.
//!
//! All metrics follow the naming convention: `ks_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // RELAY METRICS
    // =========================================================================

    /// Relays that reached the module call, by outcome (success/module_failure)
    pub static ref RELAYS_EXECUTED: CounterVec = CounterVec::new(
        Opts::new("ks_relay_executed_total", "Relays that reached module execution"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Relays rejected before or after execution, by error kind
    pub static ref RELAY_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("ks_relay_rejections_total", "Relays rejected with no state change"),
        &["kind"]
    ).expect("metric creation failed");

    /// Refunds paid to relayers
    pub static ref REFUNDS_PAID: CounterVec = CounterVec::new(
        Opts::new("ks_relay_refunds_paid_total", "Refunds transferred to relayers"),
        &["asset"]  // asset: base/token
    ).expect("metric creation failed");

    /// Direct (non-relayed) module invocations
    pub static ref DIRECT_INVOCATIONS: Counter = Counter::new(
        "ks_direct_invocations_total",
        "Module calls made directly by the caller"
    ).expect("metric creation failed");

    /// Relay pipeline duration
    pub static ref RELAY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ks_relay_duration_seconds",
            "Time spent in the relay pipeline"
        ).buckets(exponential_buckets(0.00005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Registering twice returns `MetricsInit`.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(RELAYS_EXECUTED.clone()),
        Box::new(RELAY_REJECTIONS.clone()),
        Box::new(REFUNDS_PAID.clone()),
        Box::new(DIRECT_INVOCATIONS.clone()),
        Box::new(RELAY_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record a relay that reached module execution.
pub fn record_executed(success: bool) {
    let outcome = if success { "success" } else { "module_failure" };
    RELAYS_EXECUTED.with_label_values(&[outcome]).inc();
}

/// Record a rejected relay.
pub fn record_rejection(kind: &str) {
    RELAY_REJECTIONS.with_label_values(&[kind]).inc();
}

/// Record a paid refund.
pub fn record_refund(token: bool) {
    let asset = if token { "token" } else { "base" };
    REFUNDS_PAID.with_label_values(&[asset]).inc();
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
