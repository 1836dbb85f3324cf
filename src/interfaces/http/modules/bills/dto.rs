//! Bill DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::MeterBill;
use crate::domain::{BillItem, BillResult, UtilityType};
use crate::interfaces::http::modules::readings::{DetectionDto, ReadingResponse};

fn default_utility_type() -> String {
    UtilityType::default().to_string()
}

/// Amounts are rendered with exactly two decimals, e.g. "1064.08".
fn money(amount: rust_decimal::Decimal) -> String {
    format!("{:.2}", amount)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BillRequest {
    /// Units consumed. Zero or negative values produce an "Invalid consumption" bill.
    pub consumption: i64,
    /// "electricity" (default), "gas" or "water"
    #[serde(default = "default_utility_type")]
    #[validate(length(max = 32, message = "utility_type is too long"))]
    pub utility_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillItemDto {
    pub label: String,
    pub amount: String,
}

impl From<&BillItem> for BillItemDto {
    fn from(i: &BillItem) -> Self {
        Self {
            label: i.label.clone(),
            amount: money(i.amount),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillResponse {
    /// "Calculated", "InvalidConsumption" or "UnsupportedUtility"
    pub status: String,
    pub utility_type: Option<String>,
    /// Total rounded to two decimals
    pub total_amount: String,
    /// Human-readable itemization, one component per line
    pub breakdown: String,
    pub items: Vec<BillItemDto>,
}

impl From<&BillResult> for BillResponse {
    fn from(b: &BillResult) -> Self {
        Self {
            status: b.status.to_string(),
            utility_type: b.utility_type.map(|u| u.to_string()),
            total_amount: money(b.total_amount),
            breakdown: b.breakdown.clone(),
            items: b.items.iter().map(Into::into).collect(),
        }
    }
}

/// Detections for one meter image plus the utility to bill
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MeterBillRequest {
    #[validate(
        length(max = 256, message = "at most 256 detections per request"),
        nested
    )]
    pub detections: Vec<DetectionDto>,
    #[serde(default = "default_utility_type")]
    #[validate(length(max = 32, message = "utility_type is too long"))]
    pub utility_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeterBillResponse {
    pub reading: ReadingResponse,
    pub bill: BillResponse,
}

impl From<&MeterBill> for MeterBillResponse {
    fn from(m: &MeterBill) -> Self {
        Self {
            reading: ReadingResponse::from(&m.reading),
            bill: BillResponse::from(&m.bill),
        }
    }
}
