//! Common API response wrapper

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response envelope
///
/// Every REST endpoint wraps its payload in this envelope.
/// On success: `{"success": true, "data": {...}}`,
/// on failure: `{"success": false, "data": null, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the request was handled successfully
    pub success: bool,
    /// Payload. `null` on failure
    pub data: Option<T>,
    /// Error description. Omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
