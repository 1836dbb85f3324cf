//! Tariff calculation
//!
//! Pure functions over an immutable [`TariffSchedules`] value. Bad input never
//! errors: a non-positive consumption or an unknown utility type produces a
//! zero bill whose breakdown says why.

use rust_decimal::{Decimal, RoundingStrategy};

use super::model::{
    BillItem, BillResult, BillStatus, ElectricitySchedule, FlatRateSchedule, TariffSchedules,
    UtilityType,
};

pub const INVALID_CONSUMPTION: &str = "Invalid consumption";
pub const UNSUPPORTED_UTILITY: &str = "No bill calc for this type";

/// Round half away from zero to two decimals.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

/// Charge components of an electricity bill, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityCharges {
    pub energy_charge: Decimal,
    pub fixed_charge: Decimal,
    pub gst: Decimal,
    pub income_tax: Decimal,
}

impl ElectricityCharges {
    pub fn total(&self) -> Decimal {
        self.energy_charge + self.fixed_charge + self.gst + self.income_tax
    }
}

impl ElectricitySchedule {
    /// Walk the slabs greedily, billing each band at its own rate.
    pub fn energy_charge(&self, consumption: u64) -> Decimal {
        let mut energy_charge = Decimal::ZERO;
        let mut remaining = consumption;

        for slab in &self.slabs {
            if remaining == 0 {
                break;
            }
            let consumed = slab.units.map_or(remaining, |width| remaining.min(width));
            energy_charge += Decimal::from(consumed) * slab.rate;
            remaining -= consumed;
        }

        energy_charge
    }

    pub fn charges(&self, consumption: u64) -> ElectricityCharges {
        let energy_charge = self.energy_charge(consumption);
        let income_tax = if consumption > self.income_tax_threshold {
            energy_charge * self.income_tax_rate
        } else {
            Decimal::ZERO
        };

        ElectricityCharges {
            energy_charge,
            fixed_charge: self.fixed_charge,
            gst: energy_charge * self.gst_rate,
            income_tax,
        }
    }
}

impl FlatRateSchedule {
    pub fn charge(&self, consumption: u64) -> Decimal {
        Decimal::from(consumption) * self.rate
    }
}

/// Bills consumption against a fixed set of schedules
#[derive(Debug, Clone, Default)]
pub struct TariffCalculator {
    schedules: TariffSchedules,
}

impl TariffCalculator {
    pub fn new(schedules: TariffSchedules) -> Self {
        Self { schedules }
    }

    pub fn schedules(&self) -> &TariffSchedules {
        &self.schedules
    }

    /// Bill `consumption` for a utility named by string.
    ///
    /// Consumption is checked before the name, so `(0, "anything")` reports
    /// an invalid consumption rather than an unsupported utility.
    pub fn calculate_bill(&self, consumption: i64, utility_type: &str) -> BillResult {
        if consumption <= 0 {
            return BillResult::rejected(BillStatus::InvalidConsumption, INVALID_CONSUMPTION);
        }

        match utility_type.parse::<UtilityType>() {
            Ok(utility) => self.calculate(consumption, utility),
            Err(_) => BillResult::rejected(BillStatus::UnsupportedUtility, UNSUPPORTED_UTILITY),
        }
    }

    pub fn calculate(&self, consumption: i64, utility: UtilityType) -> BillResult {
        let units = match u64::try_from(consumption) {
            Ok(units) if units > 0 => units,
            _ => return BillResult::rejected(BillStatus::InvalidConsumption, INVALID_CONSUMPTION),
        };

        match utility {
            UtilityType::Electricity => self.electricity_bill(units),
            UtilityType::Gas => self.flat_rate_bill(UtilityType::Gas, &self.schedules.gas, units),
            UtilityType::Water => {
                self.flat_rate_bill(UtilityType::Water, &self.schedules.water, units)
            }
        }
    }

    fn electricity_bill(&self, units: u64) -> BillResult {
        let charges = self.schedules.electricity.charges(units);
        let total = charges.total();
        let cur = &self.schedules.currency_symbol;

        let items = vec![
            item("Energy Charge", charges.energy_charge),
            item("Fixed", charges.fixed_charge),
            item("GST", charges.gst),
            item("Income Tax", charges.income_tax),
        ];

        let mut breakdown = items
            .iter()
            .map(|i| format!("{}: {} {:.2}", i.label, cur, i.amount))
            .collect::<Vec<_>>();
        breakdown.push(format!("Total: {} {}", cur, format_money(total)));

        BillResult {
            status: BillStatus::Calculated,
            utility_type: Some(UtilityType::Electricity),
            total_amount: round_money(total),
            breakdown: breakdown.join("\n"),
            items,
        }
    }

    fn flat_rate_bill(
        &self,
        utility: UtilityType,
        schedule: &FlatRateSchedule,
        units: u64,
    ) -> BillResult {
        let total = schedule.charge(units);
        let cur = &self.schedules.currency_symbol;

        BillResult {
            status: BillStatus::Calculated,
            utility_type: Some(utility),
            total_amount: round_money(total),
            breakdown: format!(
                "Approx Bill ({}{}/{}): {} {}",
                cur,
                schedule.rate.normalize(),
                schedule.unit,
                cur,
                format_money(total)
            ),
            items: vec![item("Consumption Charge", total)],
        }
    }
}

fn item(label: &str, amount: Decimal) -> BillItem {
    BillItem {
        label: label.to_string(),
        amount: round_money(amount),
    }
}

// ── Tests ──────────────────────────────────────────────────────
