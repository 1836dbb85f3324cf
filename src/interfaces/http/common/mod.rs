//! Shared HTTP building blocks

pub mod response;
pub mod validated_json;

pub use response::ApiResponse;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
