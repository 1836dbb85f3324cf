//! # Meter Billing
//!
//! Turns the digit detections found in a utility meter photo into a reading,
//! and the reading into an electricity, gas or water bill.
//!
//! ## Architecture
//!
//! - **domain**: detections, reading assembly, tariff schedules and the bill calculator
//! - **application**: the billing service that runs the pipeline with logs and metrics
//! - **interfaces**: REST API with Swagger documentation
//! - **config**: TOML configuration, including the tariff schedules
//! - **server**: server lifecycle, tracing and metrics setup
//! - **shared**: errors and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{BillingService, MeterBill};
pub use domain::{assemble_reading, parse_consumption, Detection, TariffCalculator, UtilityType};

pub use interfaces::create_api_router;
