//! Mergeable outcome of one or more detector runs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Anomaly;

/// Accumulates success, error messages and anomalies across detector runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyDetectionResult {
    pub success: bool,
    pub error_messages: BTreeSet<String>,
    pub anomalies: Vec<Anomaly>,
}

impl Default for AnomalyDetectionResult {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetectionResult {
    pub fn new() -> Self {
        Self {
            success: true,
            error_messages: BTreeSet::new(),
            anomalies: Vec::new(),
        }
    }

    /// Result of a run that failed before producing anything
    pub fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.fail(message);
        result
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Marks the run as failed and records why
    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.error_messages.insert(message.into());
    }

    /// Folds `other` into this result.
    ///
    /// Success is AND-ed, error messages are unioned and anomalies are
    /// appended after the ones already collected.
    pub fn merge(&mut self, other: AnomalyDetectionResult) {
        self.success = self.success && other.success;
        self.error_messages.extend(other.error_messages);
        self.anomalies.extend(other.anomalies);
    }
}
