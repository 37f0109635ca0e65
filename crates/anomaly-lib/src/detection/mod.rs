//! Graph anomaly detection algorithm seam
//!
//! The statistics used to find an anomaly inside a group of lines live
//! behind [`GraphAnomalyDetectionService`]. Merging detected intervals has a
//! default implementation that collapses overlapping same-type anomalies.

mod merge;

pub use merge::merge_overlapping;

use anyhow::Result;

use crate::anomaly::AnomalyDetectionSettings;
use crate::models::{GraphAnomaly, GraphAnomalyType, GraphData};

pub trait GraphAnomalyDetectionService: Send + Sync {
    /// Find anomalies of `anomaly_type` in a group of lines sharing one name
    fn get_anomalies(
        &self,
        anomaly_type: GraphAnomalyType,
        graphs: &[GraphData],
        settings: &AnomalyDetectionSettings,
    ) -> Result<Vec<GraphAnomaly>>;

    /// Collapse overlapping or adjacent anomalies of the same type
    fn merge_anomalies(&self, anomalies: Vec<GraphAnomaly>) -> Result<Vec<GraphAnomaly>> {
        Ok(merge_overlapping(anomalies))
    }
}
