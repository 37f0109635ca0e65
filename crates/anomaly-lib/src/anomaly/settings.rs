//! Detection algorithm settings derived from graph resolution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default floor for the minimal anomaly duration
pub const DEFAULT_MIN_ANOMALY_DURATION: Duration = Duration::from_secs(5 * 60);

/// Window the algorithm examines to confirm a sustained increase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseDetectionSettings {
    pub window_min_size_millis: u64,
    pub window_max_size_millis: u64,
}

/// Settings passed as-is to the graph anomaly detection algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionSettings {
    pub minimal_anomaly_duration_millis: u64,
    pub minimal_anomaly_value: f64,
    pub increase_detection: IncreaseDetectionSettings,
}

/// An anomaly can't be shorter than one sample, nor shorter than the floor.
pub fn min_anomaly_size_millis(step_seconds: u64, min_duration_floor_millis: u64) -> u64 {
    step_seconds
        .saturating_mul(1000)
        .max(min_duration_floor_millis)
}

impl AnomalyDetectionSettings {
    pub fn for_resolution(
        step_seconds: u64,
        min_duration_floor_millis: u64,
        minimal_anomaly_value: f64,
    ) -> Self {
        let min_anomaly_size = min_anomaly_size_millis(step_seconds, min_duration_floor_millis);
        Self {
            minimal_anomaly_duration_millis: min_anomaly_size,
            minimal_anomaly_value,
            increase_detection: IncreaseDetectionSettings {
                window_min_size_millis: min_anomaly_size,
                window_max_size_millis: min_anomaly_size.saturating_mul(2),
            },
        }
    }
}
