//! Bill REST API handlers

use axum::{extract::State, Json};

use super::dto::{BillRequest, BillResponse, MeterBillRequest, MeterBillResponse};
use crate::application::BillingService;
use crate::domain::Detection;
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};

/// State shared by the reading and billing routes
#[derive(Clone)]
pub struct BillingState {
    pub billing: BillingService,
}

/// Bill a consumption value directly.
///
/// Soft failures (non-positive consumption, unknown utility type) are
/// reported in the bill's `status` with a zero total, not as HTTP errors.
#[utoipa::path(
    post,
    path = "/api/v1/bills",
    tag = "Bills",
    request_body = BillRequest,
    responses(
        (status = 200, description = "Bill", body = ApiResponse<BillResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Invalid request")
    )
)]
pub async fn calculate_bill(
    State(state): State<BillingState>,
    ValidatedJson(req): ValidatedJson<BillRequest>,
) -> Json<ApiResponse<BillResponse>> {
    let bill = state
        .billing
        .calculate_bill(req.consumption, &req.utility_type);
    Json(ApiResponse::success(BillResponse::from(&bill)))
}

/// Assemble the reading from detections and bill it.
#[utoipa::path(
    post,
    path = "/api/v1/meter-bills",
    tag = "Bills",
    request_body = MeterBillRequest,
    responses(
        (status = 200, description = "Reading and bill", body = ApiResponse<MeterBillResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Invalid detection")
    )
)]
pub async fn process_meter(
    State(state): State<BillingState>,
    ValidatedJson(req): ValidatedJson<MeterBillRequest>,
) -> Json<ApiResponse<MeterBillResponse>> {
    let detections: Vec<Detection> = req.detections.into_iter().map(Into::into).collect();
    let result = state.billing.process(&detections, &req.utility_type);
    Json(ApiResponse::success(MeterBillResponse::from(&result)))
}
