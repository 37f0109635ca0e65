//! Failures recorded into detection results

use thiserror::Error;

use crate::models::{AnomalyType, GraphAnomalyType};

#[derive(Debug, Error)]
pub enum DetectionError {
    /// Graph backend failure, message kept verbatim
    #[error("{0}")]
    GraphQuery(String),

    #[error("failed to detect {graph_anomaly_type} anomalies for {anomaly_type}: {message}")]
    Detection {
        anomaly_type: AnomalyType,
        graph_anomaly_type: GraphAnomalyType,
        message: String,
    },

    #[error("failed to merge anomalies for {anomaly_type}: {message}")]
    Merge {
        anomaly_type: AnomalyType,
        message: String,
    },
}

impl DetectionError {
    pub fn graph_query(err: &anyhow::Error) -> Self {
        DetectionError::GraphQuery(err.to_string())
    }
}
