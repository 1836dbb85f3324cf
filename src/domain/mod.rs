pub mod detection;
pub mod reading;
pub mod tariff;

// Re-export commonly used types
pub use detection::{BoundingBox, Detection};
pub use reading::{assemble_reading, parse_consumption, Reading, NO_DETECTION};
pub use tariff::{
    BillItem, BillResult, BillStatus, ElectricitySchedule, FlatRateSchedule, Slab,
    TariffCalculator, TariffConfigError, TariffSchedules, UnknownUtilityType, UtilityType,
};
