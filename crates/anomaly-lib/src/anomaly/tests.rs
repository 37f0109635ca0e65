//! Scenario tests for the uneven distribution flow
//!
//! These tests use in-memory graph and detection services to check the
//! flow's orchestration without a metric backend.

#[cfg(test)]
mod uneven_distribution_flow_tests {
    use crate::anomaly::{
        AnomalyDetectionContext, AnomalyDetectionSettings, AnomalyDetector, DetectorServices,
        UnevenDistributionConfig, UnevenDistributionDetector,
    };
    use crate::detection::GraphAnomalyDetectionService;
    use crate::graph::GraphService;
    use crate::metadata::StaticMetadataProvider;
    use crate::models::{AnomalyType, GraphAnomaly, GraphAnomalyType, GraphData, GraphResponse};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    /// Graph backend answering every query with the same response
    struct MockGraphService {
        response: Result<GraphResponse, String>,
        queries: Mutex<Vec<(String, Option<u64>)>>,
    }

    impl MockGraphService {
        fn returning(response: GraphResponse) -> Self {
            Self {
                response: Ok(response),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GraphService for MockGraphService {
        async fn query_graph(
            &self,
            context: &AnomalyDetectionContext,
            graph_name: &str,
        ) -> Result<GraphResponse> {
            self.queries
                .lock()
                .unwrap()
                .push((graph_name.to_string(), context.step_seconds));
            self.response.clone().map_err(|message| anyhow!(message))
        }
    }

    /// Detection algorithm returning canned anomalies per line name
    #[derive(Default)]
    struct MockDetectionService {
        anomalies_by_line: HashMap<String, Vec<GraphAnomaly>>,
        fail_detection: bool,
        calls: Mutex<Vec<(GraphAnomalyType, Vec<String>, AnomalyDetectionSettings)>>,
        merge_inputs: Mutex<Vec<Vec<GraphAnomaly>>>,
    }

    impl MockDetectionService {
        fn with_line(mut self, line: &str, anomalies: Vec<GraphAnomaly>) -> Self {
            self.anomalies_by_line.insert(line.to_string(), anomalies);
            self
        }
    }

    impl GraphAnomalyDetectionService for MockDetectionService {
        fn get_anomalies(
            &self,
            anomaly_type: GraphAnomalyType,
            graphs: &[GraphData],
            settings: &AnomalyDetectionSettings,
        ) -> Result<Vec<GraphAnomaly>> {
            self.calls.lock().unwrap().push((
                anomaly_type,
                graphs.iter().map(|g| g.name.clone()).collect(),
                *settings,
            ));
            if self.fail_detection {
                return Err(anyhow!("not enough points"));
            }
            let line = &graphs[0].name;
            Ok(self.anomalies_by_line.get(line).cloned().unwrap_or_default())
        }

        fn merge_anomalies(&self, anomalies: Vec<GraphAnomaly>) -> Result<Vec<GraphAnomaly>> {
            self.merge_inputs.lock().unwrap().push(anomalies.clone());
            Ok(crate::detection::merge_overlapping(anomalies))
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn context() -> AnomalyDetectionContext {
        let mut context =
            AnomalyDetectionContext::new(Uuid::new_v4(), start(), start() + Duration::hours(1))
                .with_db_id("db-1")
                .with_query_id("query-1");
        context.step_seconds = Some(60);
        context
    }

    fn millis(minutes: i64) -> i64 {
        (start() + Duration::minutes(minutes)).timestamp_millis()
    }

    fn uneven(node: &str, from_min: i64, to_min: i64, magnitude: f64) -> GraphAnomaly {
        GraphAnomaly::new(
            GraphAnomalyType::UnevenDistribution,
            Some(millis(from_min)),
            Some(millis(to_min)),
            magnitude,
        )
        .with_node(node)
    }

    fn response(step_seconds: u64, data: Vec<GraphData>) -> GraphResponse {
        GraphResponse {
            name: "cpu_usage".to_string(),
            step_seconds,
            data,
        }
    }

    fn detector(
        graph: Arc<MockGraphService>,
        detection: Arc<MockDetectionService>,
    ) -> UnevenDistributionDetector {
        let services = DetectorServices::new(graph, Arc::new(StaticMetadataProvider), detection);
        UnevenDistributionDetector::new(UnevenDistributionConfig::hot_node_cpu(), services)
    }

    #[tokio::test]
    async fn test_fine_resolution_uses_duration_floor() {
        let graph = Arc::new(MockGraphService::returning(response(
            15,
            vec![GraphData::new("cpu").with_instance("node-1")],
        )));
        let detection = Arc::new(MockDetectionService::default());

        let result = detector(graph.clone(), detection.clone())
            .find_anomalies(&context())
            .await;

        assert!(result.success);
        let calls = detection.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (anomaly_type, _, settings) = &calls[0];
        assert_eq!(*anomaly_type, GraphAnomalyType::UnevenDistribution);
        assert_eq!(settings.minimal_anomaly_duration_millis, 300_000);
        assert_eq!(settings.increase_detection.window_min_size_millis, 300_000);
        assert_eq!(settings.increase_detection.window_max_size_millis, 600_000);
        assert_eq!(settings.minimal_anomaly_value, 10.0);

        let queries = graph.queries.lock().unwrap();
        assert_eq!(queries.as_slice(), &[("cpu_usage".to_string(), Some(60))]);
    }

    #[tokio::test]
    async fn test_coarse_resolution_dominates_floor() {
        let graph = Arc::new(MockGraphService::returning(response(
            1200,
            vec![GraphData::new("cpu").with_instance("node-1")],
        )));
        let detection = Arc::new(MockDetectionService::default());

        detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        let calls = detection.calls.lock().unwrap();
        let settings = &calls[0].2;
        assert_eq!(settings.minimal_anomaly_duration_millis, 1_200_000);
        assert_eq!(settings.increase_detection.window_min_size_millis, 1_200_000);
        assert_eq!(settings.increase_detection.window_max_size_millis, 2_400_000);
    }

    #[tokio::test]
    async fn test_anomalies_use_reported_resolution() {
        let graph = Arc::new(MockGraphService::returning(response(
            15,
            vec![GraphData::new("cpu").with_instance("node-1")],
        )));
        let detection = Arc::new(
            MockDetectionService::default().with_line("cpu", vec![uneven("node-1", 10, 20, 35.0)]),
        );
        let original = context();

        let result = detector(graph, detection).find_anomalies(&original).await;

        assert_eq!(original.step_seconds, Some(60));
        assert_eq!(result.anomalies.len(), 1);
        let anomaly = &result.anomalies[0];
        assert_eq!(anomaly.graph_step_seconds, 15);
        assert_eq!(anomaly.universe_uuid, original.universe_uuid);
        assert_eq!(anomaly.db_id.as_deref(), Some("db-1"));
        assert_eq!(anomaly.query_id.as_deref(), Some("query-1"));
        assert_eq!(anomaly.anomaly_type, AnomalyType::HotNodeCpu);
        assert_eq!(anomaly.start_time, Some(start() + Duration::minutes(10)));
        assert_eq!(anomaly.end_time, Some(start() + Duration::minutes(20)));
        assert_eq!(anomaly.graph_start_time, original.start_time);
        assert_eq!(anomaly.graph_end_time, original.end_time);
        assert_eq!(anomaly.magnitude, 35.0);
        assert!(anomaly.summary.contains("node-1"));
    }

    #[tokio::test]
    async fn test_query_failure_short_circuits() {
        let graph = Arc::new(MockGraphService::failing("backend unreachable"));
        let detection = Arc::new(
            MockDetectionService::default().with_line("cpu", vec![uneven("node-1", 0, 10, 1.0)]),
        );

        let result = detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error_messages.iter().collect::<Vec<_>>(),
            vec!["backend unreachable"]
        );
        assert!(result.anomalies.is_empty());
        assert!(detection.calls.lock().unwrap().is_empty());
        assert!(detection.merge_inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detection_failure_emits_no_anomalies() {
        let graph = Arc::new(MockGraphService::returning(response(
            60,
            vec![
                GraphData::new("cpu").with_instance("node-1"),
                GraphData::new("cpu_system").with_instance("node-1"),
            ],
        )));
        let detection = Arc::new(MockDetectionService {
            fail_detection: true,
            ..MockDetectionService::default()
        });

        let result = detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        assert!(!result.success);
        assert_eq!(result.error_messages.len(), 1);
        let message = result.error_messages.iter().next().unwrap();
        assert!(message.contains("not enough points"));
        assert!(message.contains("hot_node_cpu"));
        assert!(result.anomalies.is_empty());
        assert!(detection.merge_inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_each_line_name_is_detected_separately() {
        let graph = Arc::new(MockGraphService::returning(response(
            60,
            vec![
                GraphData::new("read").with_instance("node-1"),
                GraphData::new("write").with_instance("node-1"),
                GraphData::new("read").with_instance("node-2"),
                GraphData::new("write").with_instance("node-2"),
                GraphData::new("read").with_instance("node-3"),
            ],
        )));
        let detection = Arc::new(MockDetectionService::default());

        detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        let calls = detection.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        let mut group_sizes: Vec<(String, usize)> = calls
            .iter()
            .map(|(_, names, _)| {
                assert!(names.iter().all(|n| n == &names[0]));
                (names[0].clone(), names.len())
            })
            .collect();
        group_sizes.sort();
        assert_eq!(
            group_sizes,
            vec![("read".to_string(), 3), ("write".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_overlapping_findings_from_two_lines_are_merged() {
        let graph = Arc::new(MockGraphService::returning(response(
            60,
            vec![
                GraphData::new("node-1").with_instance("node-1"),
                GraphData::new("node-2").with_instance("node-2"),
            ],
        )));
        let detection = Arc::new(
            MockDetectionService::default()
                .with_line("node-1", vec![uneven("node-1", 10, 30, 20.0)])
                .with_line("node-2", vec![uneven("node-2", 20, 40, 25.0)]),
        );

        let result = detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        let merge_inputs = detection.merge_inputs.lock().unwrap();
        assert_eq!(merge_inputs.len(), 1);
        assert_eq!(merge_inputs[0].len(), 2);

        assert!(result.success);
        assert_eq!(result.anomalies.len(), 1);
        let anomaly = &result.anomalies[0];
        assert_eq!(anomaly.start_time, Some(start() + Duration::minutes(10)));
        assert_eq!(anomaly.end_time, Some(start() + Duration::minutes(40)));
        assert_eq!(
            anomaly.affected_nodes.iter().cloned().collect::<Vec<_>>(),
            vec!["node-1".to_string(), "node-2".to_string()]
        );
        assert_eq!(anomaly.magnitude, 25.0);
    }

    #[tokio::test]
    async fn test_empty_graph_succeeds_without_anomalies() {
        let graph = Arc::new(MockGraphService::returning(response(60, Vec::new())));
        let detection = Arc::new(MockDetectionService::default());

        let result = detector(graph, detection.clone())
            .find_anomalies(&context())
            .await;

        assert!(result.success);
        assert!(result.error_messages.is_empty());
        assert!(result.anomalies.is_empty());
        assert!(detection.calls.lock().unwrap().is_empty());
        assert_eq!(detection.merge_inputs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_duration_floor() {
        let graph = Arc::new(MockGraphService::returning(response(
            60,
            vec![GraphData::new("io").with_instance("node-1")],
        )));
        let detection = Arc::new(MockDetectionService::default());
        let services =
            DetectorServices::new(graph, Arc::new(StaticMetadataProvider), detection.clone());
        let config = UnevenDistributionConfig::slow_disks()
            .with_min_anomaly_duration(std::time::Duration::from_secs(15 * 60));

        UnevenDistributionDetector::new(config, services)
            .find_anomalies(&context())
            .await;

        let calls = detection.calls.lock().unwrap();
        assert_eq!(calls[0].2.minimal_anomaly_duration_millis, 900_000);
        assert_eq!(calls[0].2.increase_detection.window_max_size_millis, 1_800_000);
    }
}
