//! Fan-out of every registered detector over one context

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, info};

use super::{
    AnomalyDetectionContext, AnomalyDetectionResult, AnomalyDetector, DetectorServices,
    UnevenDistributionConfig, UnevenDistributionDetector,
};
use crate::config::DetectionConfig;
use crate::models::AnomalyType;
use crate::observability::DetectionMetrics;

/// Runs detectors side by side and folds their results
pub struct AnomalyService {
    detectors: Vec<Arc<dyn AnomalyDetector>>,
    metrics: DetectionMetrics,
}

impl AnomalyService {
    pub fn new(detectors: Vec<Arc<dyn AnomalyDetector>>) -> Self {
        Self {
            detectors,
            metrics: DetectionMetrics::new(),
        }
    }

    /// Build the enabled built-in detectors with configured thresholds
    pub fn from_config(config: &DetectionConfig, services: DetectorServices) -> Self {
        let detectors = AnomalyType::ALL
            .into_iter()
            .filter(|anomaly_type| config.is_enabled(*anomaly_type))
            .map(|anomaly_type| {
                let mut detector_config = UnevenDistributionConfig::for_type(anomaly_type)
                    .with_min_anomaly_duration(config.min_anomaly_duration());
                if let Some(value) = config.min_anomaly_value(anomaly_type) {
                    detector_config = detector_config.with_min_anomaly_value(value);
                }
                Arc::new(UnevenDistributionDetector::new(detector_config, services.clone()))
                    as Arc<dyn AnomalyDetector>
            })
            .collect::<Vec<_>>();

        info!(
            event = "detectors_configured",
            detectors = detectors.len(),
            "Anomaly detectors configured"
        );
        Self::new(detectors)
    }

    pub fn detectors(&self) -> &[Arc<dyn AnomalyDetector>] {
        &self.detectors
    }

    /// Run every detector against the same context.
    ///
    /// A failed detector marks the combined result as failed but its
    /// siblings still contribute their anomalies. Results are folded in
    /// registration order.
    pub async fn find_anomalies(&self, context: &AnomalyDetectionContext) -> AnomalyDetectionResult {
        let runs = self.detectors.iter().map(|detector| async move {
            let started = Instant::now();
            let result = detector.find_anomalies(context).await;
            (detector.name(), started.elapsed(), result)
        });

        let mut combined = AnomalyDetectionResult::new();
        for (name, elapsed, result) in join_all(runs).await {
            self.metrics
                .observe_detection_latency(name, elapsed.as_secs_f64());
            if !result.is_success() {
                self.metrics.inc_detection_failures(name);
            }
            let mut per_type: BTreeMap<AnomalyType, usize> = BTreeMap::new();
            for anomaly in &result.anomalies {
                *per_type.entry(anomaly.anomaly_type).or_default() += 1;
            }
            for (anomaly_type, count) in per_type {
                self.metrics
                    .add_anomalies_detected(anomaly_type.as_str(), count);
            }
            debug!(
                detector = %name,
                success = result.success,
                anomalies = result.anomalies.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Detector finished"
            );
            combined.merge(result);
        }
        combined
    }
}
