//! Detection configuration

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::AnomalyType;

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Floor for the minimal anomaly duration of every detector
    pub min_anomaly_duration_millis: u64,

    /// Detectors that should not run
    pub disabled_detectors: Vec<AnomalyType>,

    /// Per detector override of the minimal anomaly value
    pub min_anomaly_values: HashMap<AnomalyType, f64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_anomaly_duration_millis: 5 * 60 * 1000,
            disabled_detectors: Vec::new(),
            min_anomaly_values: HashMap::new(),
        }
    }
}

impl DetectionConfig {
    /// Load configuration from `ANOMALY_*` environment variables
    pub fn load() -> Result<Self> {
        Self::build(config::Config::builder())
    }

    /// Load configuration from a file, overridden by the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = config::Config::builder().add_source(config::File::from(path));
        Self::build(builder)
            .with_context(|| format!("Failed to load detection config from {}", path.display()))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("ANOMALY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("disabled_detectors"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn min_anomaly_duration(&self) -> Duration {
        Duration::from_millis(self.min_anomaly_duration_millis)
    }

    pub fn is_enabled(&self, anomaly_type: AnomalyType) -> bool {
        !self.disabled_detectors.contains(&anomaly_type)
    }

    pub fn min_anomaly_value(&self, anomaly_type: AnomalyType) -> Option<f64> {
        self.min_anomaly_values.get(&anomaly_type).copied()
    }
}
