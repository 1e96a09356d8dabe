//! Solar-farm player: irradiance-driven injection.

use crate::config::{MarketConfig, SolarConfig};
use crate::market::prices::PriceSeries;
use crate::market::types::LoadSeries;
use crate::scenario::{ScenarioData, ScenarioEntry};

use super::types::{Player, PlayerMeta, UninitializedPlayerError};

/// Converts the drawn hourly irradiance profile (W/m²) into negative
/// load (injection): `kw = irradiance * area * efficiency / 1000`.
///
/// The hourly profile is shorter than the half-hour horizon, so each
/// slot reads the hourly value covering it (`t * hours / horizon`).
#[derive(Debug, Clone)]
pub struct SolarFarm {
    meta: PlayerMeta,
    horizon: usize,
    panel_area_m2: f64,
    efficiency: f64,
    irradiance: Option<Vec<f64>>,
    prices: Option<PriceSeries>,
}

impl SolarFarm {
    pub fn new(meta: PlayerMeta, market: &MarketConfig, solar: &SolarConfig) -> Self {
        Self {
            meta,
            horizon: market.horizon,
            panel_area_m2: solar.panel_area_m2,
            efficiency: solar.efficiency,
            irradiance: None,
            prices: None,
        }
    }
}

impl Player for SolarFarm {
    fn meta(&self) -> &PlayerMeta {
        &self.meta
    }

    fn reset(&mut self) {
        self.irradiance = None;
        self.prices = None;
    }

    fn set_scenario(&mut self, entry: &ScenarioEntry) {
        if let ScenarioData::Profile(values) = &entry.data {
            self.irradiance = Some(values.clone());
        }
    }

    fn set_prices(&mut self, prices: &PriceSeries) {
        self.prices = Some(prices.clone());
    }

    fn compute_load(&mut self) -> Result<LoadSeries, UninitializedPlayerError> {
        let irradiance = self
            .irradiance
            .as_ref()
            .ok_or_else(|| UninitializedPlayerError::missing_scenario(&self.meta))?;
        if self.prices.is_none() {
            return Err(UninitializedPlayerError::missing_prices(&self.meta));
        }

        let hours = irradiance.len();
        if hours == 0 {
            return Ok(vec![0.0; self.horizon]);
        }
        let load = (0..self.horizon)
            .map(|t| {
                let w_per_m2 = irradiance[t * hours / self.horizon];
                -(w_per_m2 * self.panel_area_m2 * self.efficiency / 1000.0)
            })
            .collect();
        Ok(load)
    }
}
