pub mod bills;
pub mod health;
pub mod metrics;
pub mod readings;
pub mod request_id;
pub mod tariffs;
