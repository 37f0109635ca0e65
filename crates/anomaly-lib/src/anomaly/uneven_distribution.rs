//! Uneven distribution detection
//!
//! Queries one graph, groups its lines by name and asks the detection
//! algorithm for nodes whose line diverges from the rest of the group.
//! Findings from all groups are merged before they become anomalies.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::settings::{AnomalyDetectionSettings, DEFAULT_MIN_ANOMALY_DURATION};
use super::{AnomalyDetectionContext, AnomalyDetectionResult, AnomalyDetector, DetectorServices};
use crate::error::DetectionError;
use crate::models::{AnomalyType, GraphAnomaly, GraphAnomalyType, GraphData};
use crate::observability::StructuredLogger;

/// Parameters distinguishing one uneven distribution variant from another
#[derive(Debug, Clone, PartialEq)]
pub struct UnevenDistributionConfig {
    pub anomaly_type: AnomalyType,
    pub graph_name: String,
    /// Smallest divergence the algorithm should report
    pub min_anomaly_value: f64,
    /// Floor for the minimal anomaly duration
    pub min_anomaly_duration: Duration,
}

impl UnevenDistributionConfig {
    pub fn new(
        anomaly_type: AnomalyType,
        graph_name: impl Into<String>,
        min_anomaly_value: f64,
    ) -> Self {
        Self {
            anomaly_type,
            graph_name: graph_name.into(),
            min_anomaly_value,
            min_anomaly_duration: DEFAULT_MIN_ANOMALY_DURATION,
        }
    }

    pub fn with_min_anomaly_duration(mut self, min_anomaly_duration: Duration) -> Self {
        self.min_anomaly_duration = min_anomaly_duration;
        self
    }

    pub fn with_min_anomaly_value(mut self, min_anomaly_value: f64) -> Self {
        self.min_anomaly_value = min_anomaly_value;
        self
    }

    pub fn hot_node_cpu() -> Self {
        Self::new(AnomalyType::HotNodeCpu, "cpu_usage", 10.0)
    }

    pub fn hot_node_reads_writes() -> Self {
        Self::new(
            AnomalyType::HotNodeReadsWrites,
            "tserver_rpcs_per_sec_by_universe",
            1000.0,
        )
    }

    pub fn hot_node_ysql_queries() -> Self {
        Self::new(
            AnomalyType::HotNodeYsqlQueries,
            "ysql_server_rpc_per_second",
            100.0,
        )
    }

    pub fn slow_disks() -> Self {
        Self::new(AnomalyType::SlowDisks, "disk_io_time", 10.0)
    }

    /// Built-in variant for an anomaly type
    pub fn for_type(anomaly_type: AnomalyType) -> Self {
        match anomaly_type {
            AnomalyType::HotNodeCpu => Self::hot_node_cpu(),
            AnomalyType::HotNodeReadsWrites => Self::hot_node_reads_writes(),
            AnomalyType::HotNodeYsqlQueries => Self::hot_node_ysql_queries(),
            AnomalyType::SlowDisks => Self::slow_disks(),
        }
    }

    fn min_anomaly_duration_millis(&self) -> u64 {
        u64::try_from(self.min_anomaly_duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Detects nodes whose metric line diverges from their peers
pub struct UnevenDistributionDetector {
    config: UnevenDistributionConfig,
    services: DetectorServices,
    logger: StructuredLogger,
}

impl UnevenDistributionDetector {
    pub fn new(config: UnevenDistributionConfig, services: DetectorServices) -> Self {
        let logger = StructuredLogger::new(config.anomaly_type.as_str());
        Self {
            config,
            services,
            logger,
        }
    }

    /// Runs detection per line group, then merges findings across groups
    fn detect_and_merge(
        &self,
        groups: &BTreeMap<String, Vec<GraphData>>,
        settings: &AnomalyDetectionSettings,
    ) -> Result<(usize, Vec<GraphAnomaly>), DetectionError> {
        let detection = &self.services.detection_service;

        let mut raw = Vec::new();
        for (line_name, graphs) in groups {
            let found = detection
                .get_anomalies(GraphAnomalyType::UnevenDistribution, graphs, settings)
                .map_err(|err| DetectionError::Detection {
                    anomaly_type: self.config.anomaly_type,
                    graph_anomaly_type: GraphAnomalyType::UnevenDistribution,
                    message: err.to_string(),
                })?;
            debug!(
                detector = %self.config.anomaly_type,
                line_name = %line_name,
                series = graphs.len(),
                found = found.len(),
                "Detected anomalies in line group"
            );
            raw.extend(found);
        }

        let raw_count = raw.len();
        let merged = detection
            .merge_anomalies(raw)
            .map_err(|err| DetectionError::Merge {
                anomaly_type: self.config.anomaly_type,
                message: err.to_string(),
            })?;
        Ok((raw_count, merged))
    }
}

/// Partition lines by name; each group is handed to the algorithm on its own
fn group_by_line_name(data: Vec<GraphData>) -> BTreeMap<String, Vec<GraphData>> {
    let mut groups: BTreeMap<String, Vec<GraphData>> = BTreeMap::new();
    for graph in data {
        groups.entry(graph.name.clone()).or_default().push(graph);
    }
    groups
}

#[async_trait]
impl AnomalyDetector for UnevenDistributionDetector {
    fn name(&self) -> &str {
        self.config.anomaly_type.as_str()
    }

    async fn find_anomalies(&self, context: &AnomalyDetectionContext) -> AnomalyDetectionResult {
        let mut result = AnomalyDetectionResult::new();
        let graph_name = self.config.graph_name.as_str();
        self.logger
            .log_detection_started(&context.universe_uuid, graph_name);

        let response = match self.services.query_graph(context, graph_name).await {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                self.logger
                    .log_graph_query_failed(&context.universe_uuid, graph_name, &message);
                result.fail(message);
                return result;
            }
        };

        // Everything below works at the resolution the backend actually used
        let context = context.with_step_seconds(response.step_seconds);
        let settings = AnomalyDetectionSettings::for_resolution(
            response.step_seconds,
            self.config.min_anomaly_duration_millis(),
            self.config.min_anomaly_value,
        );

        let groups = group_by_line_name(response.data);
        let (raw_count, merged) = match self.detect_and_merge(&groups, &settings) {
            Ok(found) => found,
            Err(err) => {
                let message = err.to_string();
                self.logger
                    .log_detection_failed(&context.universe_uuid, &message);
                result.fail(message);
                return result;
            }
        };

        self.logger.log_anomalies_detected(
            &context.universe_uuid,
            response.step_seconds,
            groups.len(),
            raw_count,
            merged.len(),
        );

        result.anomalies.extend(
            self.services
                .create_anomalies(self.config.anomaly_type, merged, &context),
        );
        result
    }
}
