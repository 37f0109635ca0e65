//! Plumbing shared by graph based detectors

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AnomalyDetectionContext;
use crate::detection::GraphAnomalyDetectionService;
use crate::error::DetectionError;
use crate::graph::GraphService;
use crate::metadata::AnomalyMetadataProvider;
use crate::models::{Anomaly, AnomalyType, GraphAnomaly, GraphResponse};

/// External collaborators a graph based detector talks to
#[derive(Clone)]
pub struct DetectorServices {
    pub graph_service: Arc<dyn GraphService>,
    pub metadata_provider: Arc<dyn AnomalyMetadataProvider>,
    pub detection_service: Arc<dyn GraphAnomalyDetectionService>,
}

impl DetectorServices {
    pub fn new(
        graph_service: Arc<dyn GraphService>,
        metadata_provider: Arc<dyn AnomalyMetadataProvider>,
        detection_service: Arc<dyn GraphAnomalyDetectionService>,
    ) -> Self {
        Self {
            graph_service,
            metadata_provider,
            detection_service,
        }
    }

    pub async fn query_graph(
        &self,
        context: &AnomalyDetectionContext,
        graph_name: &str,
    ) -> Result<GraphResponse, DetectionError> {
        self.graph_service
            .query_graph(context, graph_name)
            .await
            .map_err(|err| DetectionError::graph_query(&err))
    }

    /// Turn merged graph anomalies into records bound to the context's scope
    pub fn create_anomalies(
        &self,
        anomaly_type: AnomalyType,
        graph_anomalies: Vec<GraphAnomaly>,
        context: &AnomalyDetectionContext,
    ) -> Vec<Anomaly> {
        let metadata = self.metadata_provider.metadata(anomaly_type);
        let detection_time = Utc::now();

        graph_anomalies
            .into_iter()
            .map(|graph_anomaly| {
                let summary = if graph_anomaly.affected_nodes.is_empty() {
                    metadata.title.clone()
                } else {
                    let nodes: Vec<&str> =
                        graph_anomaly.affected_nodes.iter().map(String::as_str).collect();
                    format!("{} (nodes: {})", metadata.title, nodes.join(", "))
                };

                Anomaly {
                    uuid: Uuid::new_v4(),
                    metadata_uuid: metadata.metadata_uuid,
                    anomaly_type,
                    category: metadata.category,
                    universe_uuid: context.universe_uuid,
                    db_id: context.db_id.clone(),
                    query_id: context.query_id.clone(),
                    affected_nodes: graph_anomaly.affected_nodes,
                    title: metadata.title.clone(),
                    summary,
                    detection_time,
                    start_time: graph_anomaly.start_time.and_then(millis_to_time),
                    end_time: graph_anomaly.end_time.and_then(millis_to_time),
                    graph_start_time: context.start_time,
                    graph_end_time: context.end_time,
                    graph_step_seconds: context.step_seconds.unwrap_or_default(),
                    magnitude: graph_anomaly.magnitude,
                }
            })
            .collect()
    }
}

fn millis_to_time(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
