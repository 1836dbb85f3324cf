//! Tariff aggregate
//!
//! Contains the tariff schedules, bill types, and the slab calculation.

pub mod calculator;
pub mod model;

pub use calculator::{round_money, ElectricityCharges, TariffCalculator};
pub use model::{
    BillItem, BillResult, BillStatus, ElectricitySchedule, FlatRateSchedule, Slab,
    TariffConfigError, TariffSchedules, UnknownUtilityType, UtilityType,
};
