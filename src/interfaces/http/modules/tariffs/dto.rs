//! Tariff DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ElectricitySchedule, FlatRateSchedule, TariffSchedules};

/// One electricity band with its cumulative unit range
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlabResponse {
    /// Units already billed by earlier bands
    pub from_units: u64,
    /// Last unit billed in this band; `null` for the open-ended band
    pub to_units: Option<u64>,
    pub rate: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ElectricityTariffResponse {
    pub slabs: Vec<SlabResponse>,
    pub fixed_charge: String,
    pub gst_rate: String,
    pub income_tax_rate: String,
    pub income_tax_threshold: u64,
}

impl From<&ElectricitySchedule> for ElectricityTariffResponse {
    fn from(e: &ElectricitySchedule) -> Self {
        let mut from_units = 0u64;
        let slabs = e
            .slabs
            .iter()
            .map(|slab| {
                let to_units = slab.units.map(|w| from_units.saturating_add(w));
                let response = SlabResponse {
                    from_units,
                    to_units,
                    rate: slab.rate.normalize().to_string(),
                };
                from_units = to_units.unwrap_or(from_units);
                response
            })
            .collect();

        Self {
            slabs,
            fixed_charge: e.fixed_charge.normalize().to_string(),
            gst_rate: e.gst_rate.normalize().to_string(),
            income_tax_rate: e.income_tax_rate.normalize().to_string(),
            income_tax_threshold: e.income_tax_threshold,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlatRateTariffResponse {
    pub rate: String,
    pub unit: String,
}

impl From<&FlatRateSchedule> for FlatRateTariffResponse {
    fn from(f: &FlatRateSchedule) -> Self {
        Self {
            rate: f.rate.normalize().to_string(),
            unit: f.unit.clone(),
        }
    }
}

/// Schedules the service bills against
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TariffSchedulesResponse {
    pub currency_symbol: String,
    pub electricity: ElectricityTariffResponse,
    pub gas: FlatRateTariffResponse,
    pub water: FlatRateTariffResponse,
}

impl From<&TariffSchedules> for TariffSchedulesResponse {
    fn from(t: &TariffSchedules) -> Self {
        Self {
            currency_symbol: t.currency_symbol.clone(),
            electricity: (&t.electricity).into(),
            gas: (&t.gas).into(),
            water: (&t.water).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slabs_report_cumulative_ranges() {
        let resp = ElectricityTariffResponse::from(&ElectricitySchedule::default());
        let ranges: Vec<(u64, Option<u64>)> =
            resp.slabs.iter().map(|s| (s.from_units, s.to_units)).collect();
        assert_eq!(
            ranges,
            vec![
                (0, Some(50)),
                (50, Some(100)),
                (100, Some(200)),
                (200, Some(300)),
                (300, Some(700)),
                (700, None),
            ]
        );
        assert_eq!(resp.slabs[0].rate, "16.48");
        assert_eq!(resp.gst_rate, "0.17");
    }
}
