//! Anomaly detection library for cluster performance graphs
//!
//! This crate provides the core functionality for:
//! - Describing an anomaly search (context) and folding its outcome (result)
//! - Pluggable detectors, starting with uneven distribution across nodes
//! - Seams for the graph backend, detection algorithm and metadata lookup
//! - Configuration and observability of detection runs

pub mod anomaly;
pub mod config;
pub mod detection;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod models;
pub mod observability;

pub use anomaly::{
    AnomalyDetectionContext, AnomalyDetectionResult, AnomalyDetectionSettings, AnomalyDetector,
    AnomalyService, DetectorServices, UnevenDistributionConfig, UnevenDistributionDetector,
};
pub use config::DetectionConfig;
pub use detection::GraphAnomalyDetectionService;
pub use error::DetectionError;
pub use graph::GraphService;
pub use metadata::{AnomalyMetadataProvider, StaticMetadataProvider};
pub use models::*;
pub use observability::{DetectionMetrics, StructuredLogger};
