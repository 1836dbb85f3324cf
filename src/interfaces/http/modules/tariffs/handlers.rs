//! Tariff REST API handlers

use axum::{extract::State, Json};

use super::dto::TariffSchedulesResponse;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::modules::bills::BillingState;

#[utoipa::path(
    get,
    path = "/api/v1/tariffs",
    tag = "Tariffs",
    responses(
        (status = 200, description = "Configured tariff schedules", body = ApiResponse<TariffSchedulesResponse>)
    )
)]
pub async fn list_tariffs(
    State(state): State<BillingState>,
) -> Json<ApiResponse<TariffSchedulesResponse>> {
    Json(ApiResponse::success(state.billing.schedules().into()))
}
