//! Anomaly detection over cluster performance graphs
//!
//! This module provides:
//! - The detection context and mergeable result model
//! - The [`AnomalyDetector`] contract implemented by every strategy
//! - Uneven distribution detection (one node's line diverging from its peers)
//! - Fan-out of all registered detectors over one context

mod base;
mod context;
mod result;
mod service;
mod settings;
mod uneven_distribution;

#[cfg(test)]
mod tests;

pub use base::DetectorServices;
pub use context::AnomalyDetectionContext;
pub use result::AnomalyDetectionResult;
pub use service::AnomalyService;
pub use settings::{
    min_anomaly_size_millis, AnomalyDetectionSettings, IncreaseDetectionSettings,
    DEFAULT_MIN_ANOMALY_DURATION,
};
pub use uneven_distribution::{UnevenDistributionConfig, UnevenDistributionDetector};

use async_trait::async_trait;

/// Trait for anomaly detection strategies
///
/// Each call is independent: failures are reported through the returned
/// result and never leak into other calls.
#[async_trait]
pub trait AnomalyDetector: Send + Sync {
    /// Stable name used in logs and metrics
    fn name(&self) -> &str;

    /// Search the context's time range for anomalies
    async fn find_anomalies(&self, context: &AnomalyDetectionContext) -> AnomalyDetectionResult;
}
