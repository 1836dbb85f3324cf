pub mod http;

pub use http::{create_api_router, ApiState};
