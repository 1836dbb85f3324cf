//! Meter billing service
//!
//! Runs the detections → reading → consumption → bill pipeline and records
//! a log line and counters for each stage.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    assemble_reading, BillResult, BillStatus, Detection, Reading, TariffCalculator,
    TariffSchedules,
};

/// Everything produced for one meter photo
#[derive(Debug, Clone, PartialEq)]
pub struct MeterBill {
    pub reading: Reading,
    /// Consumption parsed from the reading; `0` when it is not numeric
    pub consumption: i64,
    pub bill: BillResult,
}

/// Service for reading assembly and bill calculation.
///
/// Cheap to clone; the tariff schedules are shared read-only.
#[derive(Debug, Clone)]
pub struct BillingService {
    calculator: Arc<TariffCalculator>,
}

impl BillingService {
    pub fn new(schedules: TariffSchedules) -> Self {
        Self {
            calculator: Arc::new(TariffCalculator::new(schedules)),
        }
    }

    pub fn schedules(&self) -> &TariffSchedules {
        self.calculator.schedules()
    }

    pub fn assemble_reading(&self, detections: &[Detection]) -> Reading {
        let reading = assemble_reading(detections);

        metrics::counter!("meter_readings_total", "empty" => reading.is_empty().to_string())
            .increment(1);
        debug!(
            detections = detections.len(),
            reading = %reading.value,
            "Reading assembled"
        );

        reading
    }

    pub fn calculate_bill(&self, consumption: i64, utility_type: &str) -> BillResult {
        let bill = self.calculator.calculate_bill(consumption, utility_type);

        metrics::counter!(
            "meter_bills_total",
            "utility" => bill.utility_type.map(|u| u.as_str()).unwrap_or("unknown"),
            "status" => bill.status.to_string()
        )
        .increment(1);

        match bill.status {
            BillStatus::Calculated => info!(
                consumption,
                utility_type,
                total = %bill.total_amount,
                "Bill calculated"
            ),
            BillStatus::InvalidConsumption => {
                warn!(consumption, utility_type, "Bill skipped: invalid consumption")
            }
            BillStatus::UnsupportedUtility => {
                warn!(consumption, utility_type, "Bill skipped: unsupported utility type")
            }
        }

        bill
    }

    /// Full pipeline. The whole reading is treated as the consumption.
    pub fn process(&self, detections: &[Detection], utility_type: &str) -> MeterBill {
        let reading = self.assemble_reading(detections);
        let consumption = reading.consumption();

        if let Some(problem) = unusable_reading(&reading, consumption) {
            // Not an error; the bill reports the zero.
            warn!(reading = %reading.value, "{problem}; consumption set to 0");
        }

        let bill = self.calculate_bill(consumption, utility_type);

        MeterBill {
            reading,
            consumption,
            bill,
        }
    }
}

/// Why a non-empty reading produced a zero consumption, if it did.
/// A reading of all zeros is a genuine zero.
fn unusable_reading(reading: &Reading, consumption: i64) -> Option<&'static str> {
    if consumption != 0 || reading.is_empty() {
        return None;
    }
    let value = reading.value.as_bytes();
    if !value.iter().all(u8::is_ascii_digit) {
        Some("Reading is not numeric")
    } else if value.iter().any(|&b| b != b'0') {
        Some("Reading exceeds the supported range")
    } else {
        None
    }
}

impl Default for BillingService {
    fn default() -> Self {
        Self::new(TariffSchedules::default())
    }
}
