//! Prometheus metrics for the kiosk.
//!
//! All metrics follow the naming convention: `kiosk_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, Opts, Registry, TextEncoder,
};

use crate::{TelemetryError, TelemetryResult};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SESSION METRICS
    // =========================================================================

    /// Sessions opened by a successful authentication
    pub static ref SESSIONS_STARTED: Counter = Counter::new(
        "kiosk_sessions_started_total",
        "Sessions opened by a successful authentication"
    ).expect("metric creation failed");

    /// Sessions closed by finalize
    pub static ref SESSIONS_COMPLETED: Counter = Counter::new(
        "kiosk_sessions_completed_total",
        "Sessions closed by a finalized disposal"
    ).expect("metric creation failed");

    /// Sessions cleared by the background reaper
    pub static ref SESSIONS_REAPED: Counter = Counter::new(
        "kiosk_sessions_reaped_total",
        "Abandoned sessions cleared by the reaper"
    ).expect("metric creation failed");

    /// Failed transitions by operation and error code
    pub static ref TRANSITION_FAILURES: CounterVec = CounterVec::new(
        Opts::new("kiosk_transition_failures_total", "Failed state machine transitions"),
        &["operation", "code"]
    ).expect("metric creation failed");

    // =========================================================================
    // HARDWARE METRICS
    // =========================================================================

    /// Individual scale line reads
    pub static ref SCALE_SAMPLES: CounterVec = CounterVec::new(
        Opts::new("kiosk_scale_samples_total", "Scale line reads by outcome"),
        &["outcome"]  // outcome: valid/invalid/io_error
    ).expect("metric creation failed");

    /// Time spent sampling the scale
    pub static ref SCALE_SAMPLE_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "kiosk_scale_sample_duration_seconds",
            "Time spent taking one averaged scale measurement"
        ).buckets(exponential_buckets(0.05, 2.0, 8).expect("bucket layout"))
    ).expect("metric creation failed");

    /// Writes to the lock output
    pub static ref ACTUATOR_WRITES: CounterVec = CounterVec::new(
        Opts::new("kiosk_actuator_writes_total", "Lock output writes by requested state"),
        &["state"]  // state: locked/unlocked
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Disposal events that could not be delivered
    pub static ref PUBLISH_FAILURES: Counter = Counter::new(
        "kiosk_publish_failures_total",
        "Disposal events that could not be delivered"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call twice.
pub fn register_metrics() -> TelemetryResult<()> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SESSIONS_STARTED.clone()),
        Box::new(SESSIONS_COMPLETED.clone()),
        Box::new(SESSIONS_REAPED.clone()),
        Box::new(TRANSITION_FAILURES.clone()),
        Box::new(SCALE_SAMPLES.clone()),
        Box::new(SCALE_SAMPLE_DURATION.clone()),
        Box::new(ACTUATOR_WRITES.clone()),
        Box::new(PUBLISH_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
