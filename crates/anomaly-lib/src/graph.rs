//! Metric graph backend seam

use anyhow::Result;
use async_trait::async_trait;

use crate::anomaly::AnomalyDetectionContext;
use crate::models::GraphResponse;

/// Source of metric graphs for a universe
#[async_trait]
pub trait GraphService: Send + Sync {
    /// Query `graph_name` over the context's time range.
    ///
    /// The response reports the resolution the backend actually used, which
    /// may differ from `context.step_seconds`. The error's message is surfaced
    /// to callers verbatim.
    async fn query_graph(
        &self,
        context: &AnomalyDetectionContext,
        graph_name: &str,
    ) -> Result<GraphResponse>;
}
