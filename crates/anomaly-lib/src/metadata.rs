//! Anomaly type metadata lookup

use uuid::Uuid;

use crate::models::{AnomalyCategory, AnomalyMetadata, AnomalyType};

/// Supplies display metadata for produced anomalies
pub trait AnomalyMetadataProvider: Send + Sync {
    fn metadata(&self, anomaly_type: AnomalyType) -> AnomalyMetadata;
}

/// Built-in metadata for every known anomaly type
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider;

impl AnomalyMetadataProvider for StaticMetadataProvider {
    fn metadata(&self, anomaly_type: AnomalyType) -> AnomalyMetadata {
        let (metadata_uuid, category, title, main_graphs, rca_guidelines): (
            u128,
            AnomalyCategory,
            &str,
            &[&str],
            &[&str],
        ) = match anomaly_type {
            AnomalyType::HotNodeCpu => (
                0x6a5c_0d6e_8f1b_4c1e_9d8e_2b7e_4f3a_0001,
                AnomalyCategory::Node,
                "Uneven CPU usage distribution across DB nodes",
                &["cpu_usage"],
                &[
                    "Check if the load is skewed towards a few tablets",
                    "Check if a node runs additional background work",
                ],
            ),
            AnomalyType::HotNodeReadsWrites => (
                0x6a5c_0d6e_8f1b_4c1e_9d8e_2b7e_4f3a_0002,
                AnomalyCategory::Node,
                "Uneven reads/writes distribution across DB nodes",
                &["tserver_rpcs_per_sec_by_universe"],
                &[
                    "Check tablet leader balance across nodes",
                    "Check for hot keys in the workload",
                ],
            ),
            AnomalyType::HotNodeYsqlQueries => (
                0x6a5c_0d6e_8f1b_4c1e_9d8e_2b7e_4f3a_0003,
                AnomalyCategory::Node,
                "Uneven YSQL query distribution across DB nodes",
                &["ysql_server_rpc_per_second"],
                &["Check whether the client load balancer spreads connections evenly"],
            ),
            AnomalyType::SlowDisks => (
                0x6a5c_0d6e_8f1b_4c1e_9d8e_2b7e_4f3a_0004,
                AnomalyCategory::Infrastructure,
                "DB node disk IO time is uneven across nodes",
                &["disk_io_time", "disk_io_queue_depth"],
                &["Check disk health and provisioned IOPS on the affected nodes"],
            ),
        };

        AnomalyMetadata {
            metadata_uuid: Uuid::from_u128(metadata_uuid),
            anomaly_type,
            category,
            title: title.to_string(),
            main_graphs: main_graphs.iter().map(|g| g.to_string()).collect(),
            rca_guidelines: rca_guidelines.iter().map(|g| g.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_type_has_distinct_metadata() {
        let provider = StaticMetadataProvider;
        let uuids: HashSet<Uuid> = AnomalyType::ALL
            .iter()
            .map(|t| provider.metadata(*t).metadata_uuid)
            .collect();
        assert_eq!(uuids.len(), AnomalyType::ALL.len());

        for anomaly_type in AnomalyType::ALL {
            let metadata = provider.metadata(anomaly_type);
            assert_eq!(metadata.anomaly_type, anomaly_type);
            assert!(!metadata.title.is_empty());
            assert!(!metadata.main_graphs.is_empty());
        }
    }
}
