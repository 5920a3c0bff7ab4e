use std::future::ready;

use axum::http::StatusCode;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;

pub fn app(metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthcheck", get(healthcheck))
        .route(
            "/metrics",
            get(move || ready(metrics.map_or_else(String::new, |handle| handle.render()))),
        )
}

async fn index() -> &'static str {
    "todo-janitor"
}

async fn healthcheck() -> StatusCode {
    StatusCode::OK
}
