//! Observability for anomaly detection runs
//!
//! Provides:
//! - Prometheus metrics (detection latency, anomalies found, failed runs)
//! - Structured logging with tracing

use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};
use std::sync::OnceLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Histogram buckets for detection latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DetectionMetricsInner> = OnceLock::new();

struct DetectionMetricsInner {
    detection_latency_seconds: HistogramVec,
    anomalies_detected: IntCounterVec,
    detection_failures: IntCounterVec,
}

impl DetectionMetricsInner {
    fn new() -> Self {
        Self {
            detection_latency_seconds: register_histogram_vec!(
                "anomaly_detection_latency_seconds",
                "Time spent running one detector over one context",
                &["detector"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register detection_latency_seconds"),

            anomalies_detected: register_int_counter_vec!(
                "anomaly_detection_anomalies_total",
                "Total number of anomalies produced",
                &["anomaly_type"]
            )
            .expect("Failed to register anomalies_detected"),

            detection_failures: register_int_counter_vec!(
                "anomaly_detection_failures_total",
                "Total number of failed detector runs",
                &["detector"]
            )
            .expect("Failed to register detection_failures"),
        }
    }
}

/// Detection metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct DetectionMetrics {
    _private: (),
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DetectionMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DetectionMetricsInner {
        GLOBAL_METRICS.get_or_init(DetectionMetricsInner::new)
    }

    pub fn observe_detection_latency(&self, detector: &str, duration_secs: f64) {
        self.inner()
            .detection_latency_seconds
            .with_label_values(&[detector])
            .observe(duration_secs);
    }

    pub fn add_anomalies_detected(&self, anomaly_type: &str, count: usize) {
        self.inner()
            .anomalies_detected
            .with_label_values(&[anomaly_type])
            .inc_by(count as u64);
    }

    pub fn inc_detection_failures(&self, detector: &str) {
        self.inner()
            .detection_failures
            .with_label_values(&[detector])
            .inc();
    }

    #[cfg(test)]
    pub(crate) fn anomalies_detected(&self, anomaly_type: &str) -> u64 {
        self.inner()
            .anomalies_detected
            .with_label_values(&[anomaly_type])
            .get()
    }

    #[cfg(test)]
    pub(crate) fn detection_failures(&self, detector: &str) -> u64 {
        self.inner()
            .detection_failures
            .with_label_values(&[detector])
            .get()
    }
}

/// Structured logger for detection events
#[derive(Clone)]
pub struct StructuredLogger {
    detector: String,
}

impl StructuredLogger {
    pub fn new(detector: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
        }
    }

    pub fn log_detection_started(&self, universe_uuid: &Uuid, graph_name: &str) {
        info!(
            event = "detection_started",
            detector = %self.detector,
            universe_uuid = %universe_uuid,
            graph_name = %graph_name,
            "Starting anomaly detection"
        );
    }

    pub fn log_graph_query_failed(&self, universe_uuid: &Uuid, graph_name: &str, error: &str) {
        warn!(
            event = "graph_query_failed",
            detector = %self.detector,
            universe_uuid = %universe_uuid,
            graph_name = %graph_name,
            error = %error,
            "Graph query failed, skipping detection"
        );
    }

    pub fn log_detection_failed(&self, universe_uuid: &Uuid, error: &str) {
        warn!(
            event = "detection_failed",
            detector = %self.detector,
            universe_uuid = %universe_uuid,
            error = %error,
            "Anomaly detection failed"
        );
    }

    pub fn log_anomalies_detected(
        &self,
        universe_uuid: &Uuid,
        step_seconds: u64,
        series_groups: usize,
        raw_anomalies: usize,
        merged_anomalies: usize,
    ) {
        info!(
            event = "anomalies_detected",
            detector = %self.detector,
            universe_uuid = %universe_uuid,
            step_seconds = step_seconds,
            series_groups = series_groups,
            raw_anomalies = raw_anomalies,
            merged_anomalies = merged_anomalies,
            "Anomaly detection finished"
        );
    }
}
