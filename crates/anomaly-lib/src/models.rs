//! Core data models for graph anomaly detection

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Single sample of a graph line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    /// Sample timestamp in epoch milliseconds
    pub x: i64,
    pub y: f64,
}

/// One named line series of a graph response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    /// Line name, shared by all series of the same metric + label
    pub name: String,
    /// Node the series was collected from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub points: Vec<GraphPoint>,
}

impl GraphData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_name: None,
            points: Vec::new(),
        }
    }

    pub fn with_instance(mut self, instance_name: impl Into<String>) -> Self {
        self.instance_name = Some(instance_name.into());
        self
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = (i64, f64)>) -> Self {
        self.points = points.into_iter().map(|(x, y)| GraphPoint { x, y }).collect();
        self
    }
}

/// Graph query response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    pub name: String,
    /// Sampling resolution the backend actually used
    pub step_seconds: u64,
    #[serde(default)]
    pub data: Vec<GraphData>,
}

/// Shape of an irregularity found inside graph lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphAnomalyType {
    Increase,
    UnevenDistribution,
}

impl fmt::Display for GraphAnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphAnomalyType::Increase => write!(f, "increase"),
            GraphAnomalyType::UnevenDistribution => write!(f, "uneven distribution"),
        }
    }
}

/// Irregular interval detected on one or more graph lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnomaly {
    pub anomaly_type: GraphAnomalyType,
    /// Nodes whose lines contributed to the anomaly
    #[serde(default)]
    pub affected_nodes: BTreeSet<String>,
    /// Epoch milliseconds, `None` when the anomaly starts before the graph
    pub start_time: Option<i64>,
    /// Epoch milliseconds, `None` when the anomaly is still ongoing
    pub end_time: Option<i64>,
    pub magnitude: f64,
}

impl GraphAnomaly {
    pub fn new(
        anomaly_type: GraphAnomalyType,
        start_time: Option<i64>,
        end_time: Option<i64>,
        magnitude: f64,
    ) -> Self {
        Self {
            anomaly_type,
            affected_nodes: BTreeSet::new(),
            start_time,
            end_time,
            magnitude,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.affected_nodes.insert(node.into());
        self
    }
}

/// Anomaly classification exposed to diagnosis consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    HotNodeCpu,
    HotNodeReadsWrites,
    HotNodeYsqlQueries,
    SlowDisks,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 4] = [
        AnomalyType::HotNodeCpu,
        AnomalyType::HotNodeReadsWrites,
        AnomalyType::HotNodeYsqlQueries,
        AnomalyType::SlowDisks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::HotNodeCpu => "hot_node_cpu",
            AnomalyType::HotNodeReadsWrites => "hot_node_reads_writes",
            AnomalyType::HotNodeYsqlQueries => "hot_node_ysql_queries",
            AnomalyType::SlowDisks => "slow_disks",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCategory {
    Sql,
    App,
    Node,
    Infrastructure,
    Db,
}

/// Display metadata for an anomaly type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyMetadata {
    pub metadata_uuid: Uuid,
    pub anomaly_type: AnomalyType,
    pub category: AnomalyCategory,
    pub title: String,
    pub main_graphs: Vec<String>,
    pub rca_guidelines: Vec<String>,
}

/// Finalized anomaly record handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub uuid: Uuid,
    pub metadata_uuid: Uuid,
    pub anomaly_type: AnomalyType,
    pub category: AnomalyCategory,
    pub universe_uuid: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    pub affected_nodes: BTreeSet<String>,
    pub title: String,
    pub summary: String,
    pub detection_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub graph_start_time: DateTime<Utc>,
    pub graph_end_time: DateTime<Utc>,
    pub graph_step_seconds: u64,
    pub magnitude: f64,
}
