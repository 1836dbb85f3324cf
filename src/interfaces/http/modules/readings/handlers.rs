//! Reading REST API handlers

use axum::{extract::State, Json};

use super::dto::{ReadingRequest, ReadingResponse};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};
use crate::interfaces::http::modules::bills::BillingState;

#[utoipa::path(
    post,
    path = "/api/v1/readings",
    tag = "Readings",
    request_body = ReadingRequest,
    responses(
        (status = 200, description = "Assembled reading", body = ApiResponse<ReadingResponse>),
        (status = 400, description = "Malformed JSON"),
        (status = 422, description = "Invalid detection")
    )
)]
pub async fn assemble_reading(
    State(state): State<BillingState>,
    ValidatedJson(req): ValidatedJson<ReadingRequest>,
) -> Json<ApiResponse<ReadingResponse>> {
    let detections = req.into_detections();
    let reading = state.billing.assemble_reading(&detections);
    Json(ApiResponse::success(ReadingResponse::from(&reading)))
}
