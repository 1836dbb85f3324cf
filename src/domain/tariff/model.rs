//! Tariff domain entities
//!
//! Schedules are plain configuration values. They are loaded once (from the
//! `[tariffs]` config section or the built-in defaults) and then shared
//! read-only by every calculation.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Utility whose consumption is being billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityType {
    Electricity,
    Gas,
    Water,
}

impl UtilityType {
    pub const ALL: [UtilityType; 3] = [Self::Electricity, Self::Gas, Self::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
            Self::Water => "water",
        }
    }
}

impl Default for UtilityType {
    fn default() -> Self {
        Self::Electricity
    }
}

impl std::fmt::Display for UtilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown utility type: {0}")]
pub struct UnknownUtilityType(pub String);

impl FromStr for UtilityType {
    type Err = UnknownUtilityType;

    /// Names are matched exactly: "electricity", "gas", "water".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(Self::Electricity),
            "gas" => Ok(Self::Gas),
            "water" => Ok(Self::Water),
            other => Err(UnknownUtilityType(other.to_string())),
        }
    }
}

/// One band of a progressive tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    /// Width of the band in units; `None` means unbounded
    #[serde(default)]
    pub units: Option<u64>,
    /// Price per unit inside the band
    pub rate: Decimal,
}

impl Slab {
    pub fn bounded(units: u64, rate: Decimal) -> Self {
        Self {
            units: Some(units),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self { units: None, rate }
    }
}

/// Progressive slab schedule with fixed charge and taxes on the energy charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricitySchedule {
    /// Ordered bands, cheapest first. Only the last may be unbounded.
    pub slabs: Vec<Slab>,
    pub fixed_charge: Decimal,
    /// GST as a fraction of the energy charge (0.17 = 17%)
    pub gst_rate: Decimal,
    /// Income tax as a fraction of the energy charge
    pub income_tax_rate: Decimal,
    /// Income tax applies only when consumption is strictly above this
    pub income_tax_threshold: u64,
}

impl Default for ElectricitySchedule {
    /// Residential slabs, Rs/unit.
    fn default() -> Self {
        Self {
            slabs: vec![
                Slab::bounded(50, Decimal::new(1648, 2)),
                Slab::bounded(50, Decimal::new(2085, 2)),
                Slab::bounded(100, Decimal::new(2294, 2)),
                Slab::bounded(100, Decimal::new(2714, 2)),
                Slab::bounded(400, Decimal::new(3203, 2)),
                Slab::unbounded(Decimal::new(3524, 2)),
            ],
            fixed_charge: Decimal::from(100),
            gst_rate: Decimal::new(17, 2),
            income_tax_rate: Decimal::new(75, 3),
            income_tax_threshold: 200,
        }
    }
}

/// Single-rate schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRateSchedule {
    pub rate: Decimal,
    /// Unit name used in the breakdown ("unit", "liter")
    pub unit: String,
}

impl FlatRateSchedule {
    pub fn new(rate: Decimal, unit: impl Into<String>) -> Self {
        Self {
            rate,
            unit: unit.into(),
        }
    }

    /// Gas: Rs 1500 per 100 units.
    pub fn default_gas() -> Self {
        Self::new(Decimal::from(1500) / Decimal::from(100), "unit")
    }

    /// Water: Rs 50 per 1000 liters.
    pub fn default_water() -> Self {
        Self::new(Decimal::from(50) / Decimal::from(1000), "liter")
    }
}

fn default_currency_symbol() -> String {
    "Rs".to_string()
}

fn default_gas() -> FlatRateSchedule {
    FlatRateSchedule::default_gas()
}

fn default_water() -> FlatRateSchedule {
    FlatRateSchedule::default_water()
}

/// Every schedule the calculator knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSchedules {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub electricity: ElectricitySchedule,
    #[serde(default = "default_gas")]
    pub gas: FlatRateSchedule,
    #[serde(default = "default_water")]
    pub water: FlatRateSchedule,
}

impl Default for TariffSchedules {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            electricity: ElectricitySchedule::default(),
            gas: default_gas(),
            water: default_water(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TariffConfigError {
    #[error("electricity schedule has no slabs")]
    NoSlabs,

    #[error("slab {index} is unbounded but is not the last slab")]
    UnboundedSlabNotLast { index: usize },

    #[error("last slab must be unbounded")]
    LastSlabBounded,

    #[error("slab {index} has zero width")]
    EmptySlab { index: usize },

    #[error("negative value for {0}")]
    Negative(&'static str),
}

impl TariffSchedules {
    /// Check the invariants the calculator relies on: the slab list covers
    /// every consumption value and no rate or charge is negative, which keeps
    /// totals non-decreasing in consumption.
    pub fn validate(&self) -> Result<(), TariffConfigError> {
        let e = &self.electricity;
        let last = e.slabs.len().checked_sub(1).ok_or(TariffConfigError::NoSlabs)?;

        for (index, slab) in e.slabs.iter().enumerate() {
            match slab.units {
                None if index != last => {
                    return Err(TariffConfigError::UnboundedSlabNotLast { index })
                }
                Some(_) if index == last => return Err(TariffConfigError::LastSlabBounded),
                Some(0) => return Err(TariffConfigError::EmptySlab { index }),
                _ => {}
            }
            if slab.rate.is_sign_negative() {
                return Err(TariffConfigError::Negative("slab rate"));
            }
        }

        let non_negative = [
            (e.fixed_charge, "fixed_charge"),
            (e.gst_rate, "gst_rate"),
            (e.income_tax_rate, "income_tax_rate"),
            (self.gas.rate, "gas rate"),
            (self.water.rate, "water rate"),
        ];
        for (value, name) in non_negative {
            if value.is_sign_negative() {
                return Err(TariffConfigError::Negative(name));
            }
        }

        Ok(())
    }
}

/// Outcome of a bill calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Calculated,
    /// Consumption was zero or negative
    InvalidConsumption,
    /// No schedule exists for the requested utility type
    UnsupportedUtility,
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calculated => write!(f, "Calculated"),
            Self::InvalidConsumption => write!(f, "InvalidConsumption"),
            Self::UnsupportedUtility => write!(f, "UnsupportedUtility"),
        }
    }
}

/// One itemized line of a bill, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub label: String,
    pub amount: Decimal,
}

/// Result of billing one consumption value
#[derive(Debug, Clone, PartialEq)]
pub struct BillResult {
    pub status: BillStatus,
    pub utility_type: Option<UtilityType>,
    /// Total rounded to 2 decimals
    pub total_amount: Decimal,
    /// Human-readable itemization, one component per line
    pub breakdown: String,
    pub items: Vec<BillItem>,
}

impl BillResult {
    pub fn rejected(status: BillStatus, message: &str) -> Self {
        Self {
            status,
            utility_type: None,
            total_amount: Decimal::ZERO,
            breakdown: message.to_string(),
            items: Vec::new(),
        }
    }

    pub fn is_calculated(&self) -> bool {
        self.status == BillStatus::Calculated
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utility_type_parses_exact_names() {
        assert_eq!("electricity".parse::<UtilityType>(), Ok(UtilityType::Electricity));
        assert_eq!("gas".parse::<UtilityType>(), Ok(UtilityType::Gas));
        assert_eq!("water".parse::<UtilityType>(), Ok(UtilityType::Water));
        assert_eq!(
            "Gas".parse::<UtilityType>(),
            Err(UnknownUtilityType("Gas".to_string()))
        );
    }

    #[test]
    fn utility_type_display_round_trips() {
        for utility in UtilityType::ALL {
            assert_eq!(utility.to_string().parse::<UtilityType>(), Ok(utility));
        }
    }

    #[test]
    fn default_flat_rates() {
        assert_eq!(FlatRateSchedule::default_gas().rate, Decimal::from(15));
        assert_eq!(FlatRateSchedule::default_water().rate, Decimal::new(5, 2));
    }

    #[test]
    fn default_schedules_are_valid() {
        assert_eq!(TariffSchedules::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_slab_list() {
        let mut s = TariffSchedules::default();
        s.electricity.slabs.clear();
        assert_eq!(s.validate(), Err(TariffConfigError::NoSlabs));
    }

    #[test]
    fn validate_rejects_bounded_last_slab() {
        let mut s = TariffSchedules::default();
        s.electricity.slabs.pop();
        assert_eq!(s.validate(), Err(TariffConfigError::LastSlabBounded));
    }

    #[test]
    fn validate_rejects_unbounded_middle_slab() {
        let mut s = TariffSchedules::default();
        s.electricity.slabs[1].units = None;
        assert_eq!(
            s.validate(),
            Err(TariffConfigError::UnboundedSlabNotLast { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_zero_width_and_negative_values() {
        let mut s = TariffSchedules::default();
        s.electricity.slabs[0].units = Some(0);
        assert_eq!(s.validate(), Err(TariffConfigError::EmptySlab { index: 0 }));

        let mut s = TariffSchedules::default();
        s.water.rate = Decimal::new(-1, 2);
        assert_eq!(s.validate(), Err(TariffConfigError::Negative("water rate")));
    }

    #[test]
    fn schedules_deserialize_from_toml_with_defaults() {
        let src = r#"
            currency_symbol = "PKR"

            [electricity]
            fixed_charge = 250
            slabs = [
                { units = 100, rate = 10.5 },
                { rate = 20 },
            ]
        "#;
        let s: TariffSchedules = toml::from_str(src).unwrap();
        assert_eq!(s.currency_symbol, "PKR");
        assert_eq!(s.electricity.fixed_charge, Decimal::from(250));
        assert_eq!(s.electricity.slabs.len(), 2);
        assert_eq!(s.electricity.slabs[1].units, None);
        assert_eq!(s.electricity.gst_rate, Decimal::new(17, 2));
        assert_eq!(s.gas, FlatRateSchedule::default_gas());
        assert_eq!(s.validate(), Ok(()));
    }

    #[test]
    fn bill_status_display() {
        assert_eq!(BillStatus::Calculated.to_string(), "Calculated");
        assert_eq!(BillStatus::UnsupportedUtility.to_string(), "UnsupportedUtility");
    }
}
