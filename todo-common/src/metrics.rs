use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return the handle the /metrics
/// route renders from.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    const CLEANUP_SECONDS: &[f64] = &[
        0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("todo_cleanup_duration_seconds".to_string()),
            CLEANUP_SECONDS,
        )
        .unwrap()
        .install_recorder()
        .unwrap()
}
