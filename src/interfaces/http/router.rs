//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::BillingService;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::modules::{bills, health, metrics, readings, request_id, tariffs};

/// Unified router state. Each handler keeps its own `State<T>` extractor
/// and axum picks the slice it needs through `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub billing: BillingService,
    pub started_at: Arc<Instant>,
    pub metrics: PrometheusHandle,
}

impl ApiState {
    pub fn new(billing: BillingService, metrics: PrometheusHandle) -> Self {
        Self {
            billing,
            started_at: Arc::new(Instant::now()),
            metrics,
        }
    }
}

impl FromRef<ApiState> for bills::BillingState {
    fn from_ref(s: &ApiState) -> Self {
        bills::BillingState {
            billing: s.billing.clone(),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<ApiState> for metrics::MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        metrics::MetricsState {
            handle: s.metrics.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        readings::assemble_reading,
        bills::calculate_bill,
        bills::process_meter,
        tariffs::list_tariffs,
    ),
    components(
        schemas(
            ApiResponse<String>,
            health::HealthResponse,
            readings::BoundingBoxDto,
            readings::DetectionDto,
            readings::ReadingRequest,
            readings::ReadingDigitDto,
            readings::ReadingResponse,
            bills::BillRequest,
            bills::BillItemDto,
            bills::BillResponse,
            bills::MeterBillRequest,
            bills::MeterBillResponse,
            tariffs::SlabResponse,
            tariffs::ElectricityTariffResponse,
            tariffs::FlatRateTariffResponse,
            tariffs::TariffSchedulesResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Readings", description = "Assemble meter readings from digit detections"),
        (name = "Bills", description = "Tiered electricity and flat-rate gas/water billing"),
        (name = "Tariffs", description = "Configured tariff schedules"),
    ),
    info(
        title = "Meter Billing API",
        version = "1.0.0",
        description = "Turns digit detections from a meter photo into a reading and a utility bill",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/readings", post(readings::assemble_reading))
        .route("/bills", post(bills::calculate_bill))
        .route("/meter-bills", post(bills::process_meter))
        .route("/tariffs", get(tariffs::list_tariffs));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::domain::TariffSchedules;

    fn app() -> Router {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let billing = BillingService::new(TariffSchedules::default());
        create_api_router(ApiState::new(billing, handle))
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn digit(label: &str, x1: f32) -> Value {
        json!({
            "label": label,
            "confidence": 0.9,
            "bbox": { "x1": x1, "y1": 0.0, "x2": x1 + 10.0, "y2": 20.0 }
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readings_are_ordered_left_to_right() {
        let req = post_json(
            "/api/v1/readings",
            json!({ "detections": [digit("2", 50.0), digit("1", 10.0), digit("5", 90.0)] }),
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["reading"], "125");
        assert_eq!(body["data"]["consumption"], 125);
    }

    #[tokio::test]
    async fn empty_detections_read_no_detection() {
        let (status, body) =
            send(post_json("/api/v1/readings", json!({ "detections": [] }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reading"], "No detection");
        assert_eq!(body["data"]["consumption"], 0);
    }

    #[tokio::test]
    async fn bill_defaults_to_electricity() {
        let (status, body) = send(post_json("/api/v1/bills", json!({ "consumption": 50 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Calculated");
        assert_eq!(body["data"]["utility_type"], "electricity");
        assert_eq!(body["data"]["total_amount"], "1064.08");
    }

    #[tokio::test]
    async fn soft_failures_are_not_http_errors() {
        let (status, body) = send(post_json(
            "/api/v1/bills",
            json!({ "consumption": 0, "utility_type": "gas" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "InvalidConsumption");
        assert_eq!(body["data"]["breakdown"], "Invalid consumption");

        let (status, body) = send(post_json(
            "/api/v1/bills",
            json!({ "consumption": 10, "utility_type": "steam" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "UnsupportedUtility");
        assert_eq!(body["data"]["total_amount"], "0.00");
    }

    #[tokio::test]
    async fn meter_bill_runs_the_full_pipeline() {
        let req = post_json(
            "/api/v1/meter-bills",
            json!({
                "detections": [digit("0", 30.0), digit("1", 10.0), digit("0", 20.0)],
                "utility_type": "gas"
            }),
        );
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reading"]["reading"], "100");
        assert_eq!(body["data"]["bill"]["total_amount"], "1500.00");
    }

    #[tokio::test]
    async fn invalid_detection_is_unprocessable() {
        let bad = json!({
            "label": "1",
            "confidence": 1.5,
            "bbox": { "x1": 0.0, "y1": 0.0, "x2": 10.0, "y2": 10.0 }
        });
        let (status, body) =
            send(post_json("/api/v1/readings", json!({ "detections": [bad] }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = Request::post("/api/v1/bills")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tariffs_list_all_schedules() {
        let (status, body) =
            send(Request::get("/api/v1/tariffs").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["currency_symbol"], "Rs");
        assert_eq!(body["data"]["gas"]["rate"], "15");
        assert_eq!(body["data"]["electricity"]["slabs"][5]["to_units"], Value::Null);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let req = Request::get("/health")
            .header(request_id::REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get(request_id::REQUEST_ID_HEADER).unwrap(),
            "abc-123"
        );
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/readings",
            "/api/v1/bills",
            "/api/v1/meter-bills",
            "/api/v1/tariffs",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
