//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 仓库内示例配置 / 示例数据可用性
//! - 导出 → 报表的 KPI 往返一致性
//! - REST API → 管道的完整链路

#[cfg(test)]
mod fixtures {
    use std::path::PathBuf;

    pub fn repo_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    pub fn sample_orders() -> PathBuf {
        repo_root().join("data/sample_orders.json")
    }

    pub fn sample_quality() -> PathBuf {
        repo_root().join("data/sample_quality.json")
    }
}

#[cfg(test)]
mod contract_tests {
    use super::fixtures;
    use contracts::SinkType;
    use order_store::{OrderStore, SqliteOrderStore};

    #[test]
    fn test_repo_config_loads() {
        let blueprint =
            config_loader::ConfigLoader::load_from_path(&fixtures::repo_root().join("config.toml"))
                .unwrap();
        assert_eq!(blueprint.sinks.len(), 3);
        assert_eq!(blueprint.sinks[2].sink_type, SinkType::Log);
        assert_eq!(blueprint.source.quality_path.as_deref(), Some("/api/v1/quality"));
        assert_eq!(
            blueprint.source.kpis_path.as_deref(),
            Some("/api/v1/production/stats")
        );
    }

    #[test]
    fn test_sample_orders_seed_store() {
        let store = SqliteOrderStore::in_memory().unwrap();
        store.initialize().unwrap();
        let inserted = store.load_sample_data(&fixtures::sample_orders()).unwrap();
        assert_eq!(inserted, 8);
        assert_eq!(store.list(Some("completed")).unwrap().len(), 3);

        assert_eq!(store.load_sample_quality(&fixtures::sample_quality()).unwrap(), 10);
        let quality = store.list_quality(None, usize::MAX).unwrap();
        assert_eq!(quality.iter().filter(|q| !q.passed()).count(), 2);
    }
}

#[cfg(test)]
mod e2e_tests {
    use super::fixtures;
    use std::sync::Arc;

    use contracts::{
        ArtifactCategory, KpiSummary, PipelineBlueprint, PipelineState, QualityRecord, SourceConfig,
    };
    use ingestion::{HttpWorkOrderSource, MockWorkOrderSource};
    use mes_etl::Pipeline;
    use order_store::SqliteOrderStore;
    use reporting::ReportGenerator;

    fn blueprint(dir: &std::path::Path) -> PipelineBlueprint {
        let mut blueprint = PipelineBlueprint::default();
        blueprint.export.output_dir = dir.to_path_buf();
        blueprint
    }

    fn assert_kpis_close(expected: &KpiSummary, actual: &KpiSummary) {
        assert_eq!(expected.len(), actual.len(), "{expected:?} vs {actual:?}");
        for (name, value) in expected.iter() {
            let other = actual
                .get(name)
                .unwrap_or_else(|| panic!("missing KPI {name}"));
            assert!(
                (value.as_f64() - other).abs() <= 0.01,
                "{name}: {} != {other}",
                value.as_f64()
            );
        }
    }

    /// Export then rediscover: the report recomputes the same KPIs
    #[tokio::test]
    async fn test_export_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut quality = QualityRecord::new("pass");
        quality.order_id = Some("WO-1001".into());
        quality.test_type = Some("dimensional".into());

        let source = MockWorkOrderSource::from_json_file(fixtures::sample_orders())
            .unwrap()
            .with_kpis(serde_json::json!({"total_orders": 8, "efficiency": 63.44}))
            .with_quality(vec![quality, QualityRecord::new("fail"), QualityRecord::new("PASS")]);

        let outcome = Pipeline::new(blueprint(dir.path()), source).run().await.unwrap();
        assert_eq!(outcome.state, PipelineState::Done);
        assert_eq!(outcome.stats.clean_rows, 8);

        let (summary, path) = ReportGenerator::new(dir.path()).generate().unwrap();
        assert!(path.exists());
        assert_kpis_close(&outcome.kpis, &summary.kpis);
        assert_eq!(summary.data_freshness.orders_count, 8);
        assert_eq!(summary.data_freshness.quality_tests_count, 3);
        assert_eq!(summary.api_stats["total_orders"], 8);
        assert!(summary.data_sources.stats_file.is_some());
    }

    /// Zero records: aborted, nothing for the report to find
    #[tokio::test]
    async fn test_empty_source_leaves_report_empty() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = Pipeline::new(blueprint(dir.path()), MockWorkOrderSource::new(Vec::new()))
            .run()
            .await
            .unwrap();
        assert_eq!(outcome.state, PipelineState::Aborted);

        let summary = ReportGenerator::new(dir.path()).build().unwrap();
        assert_eq!(summary.data_sources.orders_file, None);
        assert_eq!(summary.data_freshness.orders_count, 0);
        assert_eq!(summary.kpis.get("total_orders"), Some(0.0));
    }

    /// MES API served from SQLite, fetched over HTTP by the pipeline
    #[tokio::test]
    async fn test_api_to_pipeline() {
        let store = SqliteOrderStore::in_memory().unwrap();
        store.initialize().unwrap();
        store.load_sample_data(&fixtures::sample_orders()).unwrap();
        store.load_sample_quality(&fixtures::sample_quality()).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(api::serve(Arc::new(store), listener, std::future::pending()));

        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = blueprint(dir.path());
        blueprint.source = SourceConfig {
            base_url: format!("http://{addr}"),
            kpis_path: Some("/api/v1/production/stats".into()),
            quality_path: Some("/api/v1/quality".into()),
            timeout_secs: 5,
            ..Default::default()
        };
        let source = HttpWorkOrderSource::new(blueprint.source.clone()).unwrap();

        let outcome = Pipeline::new(blueprint, source).run().await.unwrap();
        assert_eq!(outcome.state, PipelineState::Done, "{:?}", outcome.abort_reason);
        assert_eq!(outcome.stats.fetched_rows, 8);
        assert_eq!(outcome.stats.clean_rows, 8);
        assert_eq!(outcome.stats.quality_records, 10);
        assert!(outcome.stats.upstream_kpis);
        assert_eq!(outcome.kpis.get("completed_orders"), Some(3.0));
        assert_eq!(outcome.kpis.get("completion_rate"), Some(37.5));
        assert_eq!(outcome.kpis.get("quality_pass_rate"), Some(80.0));

        let quality_file =
            reporting::latest_artifact(dir.path(), ArtifactCategory::Quality).unwrap();
        assert!(quality_file.is_some());

        let summary = ReportGenerator::new(dir.path()).build().unwrap();
        assert_eq!(summary.data_freshness.quality_tests_count, 10);
        assert_eq!(summary.api_stats["total_orders"], 8);
        assert_eq!(summary.api_stats["active_orders"], 2);
        assert_eq!(summary.api_stats["overall_efficiency"], 52.81);
        assert_eq!(summary.api_stats["defect_rate"], 20.0);
    }
}
