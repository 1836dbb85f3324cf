//! Prometheus scrape endpoint
//!
//! Renders the billing counters (`meter_readings_total`, `meter_bills_total`)
//! and the HTTP request metrics in Prometheus text format.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics`
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.handle.render())
}
