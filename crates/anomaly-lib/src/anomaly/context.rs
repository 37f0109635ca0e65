//! Query scope for a single anomaly search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable description of what an anomaly search targets.
///
/// Detectors never mutate a context they were handed; a revised copy is
/// produced with [`AnomalyDetectionContext::with_step_seconds`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionContext {
    pub universe_uuid: Uuid,
    pub db_id: Option<String>,
    pub query_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Requested resolution; `None` lets the graph backend choose
    pub step_seconds: Option<u64>,
    /// Strategy specific payload, interpreted only by the detector that owns it
    pub custom_context: Option<serde_json::Value>,
}

impl AnomalyDetectionContext {
    pub fn new(universe_uuid: Uuid, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            universe_uuid,
            db_id: None,
            query_id: None,
            start_time,
            end_time,
            step_seconds: None,
            custom_context: None,
        }
    }

    pub fn with_db_id(mut self, db_id: impl Into<String>) -> Self {
        self.db_id = Some(db_id.into());
        self
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    pub fn with_custom_context(mut self, custom_context: serde_json::Value) -> Self {
        self.custom_context = Some(custom_context);
        self
    }

    /// Copy of this context with the resolution replaced
    pub fn with_step_seconds(&self, step_seconds: u64) -> Self {
        Self {
            step_seconds: Some(step_seconds),
            ..self.clone()
        }
    }
}
