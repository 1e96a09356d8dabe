//! Data-center player: scenario-less constant baseline.

use crate::config::{DataCenterConfig, MarketConfig};
use crate::market::prices::PriceSeries;
use crate::market::types::LoadSeries;
use crate::scenario::ScenarioEntry;

use super::types::{Player, PlayerMeta, UninitializedPlayerError};

/// The only category with no stochastic driver: a flat `baseline_kw`
/// draw in every slot, every round.
#[derive(Debug, Clone)]
pub struct DataCenter {
    meta: PlayerMeta,
    horizon: usize,
    baseline_kw: f64,
    prices: Option<PriceSeries>,
}

impl DataCenter {
    pub fn new(meta: PlayerMeta, market: &MarketConfig, data_center: &DataCenterConfig) -> Self {
        Self {
            meta,
            horizon: market.horizon,
            baseline_kw: data_center.baseline_kw,
            prices: None,
        }
    }
}

impl Player for DataCenter {
    fn meta(&self) -> &PlayerMeta {
        &self.meta
    }

    fn reset(&mut self) {
        self.prices = None;
    }

    fn set_scenario(&mut self, _entry: &ScenarioEntry) {
        // no scenario driver
    }

    fn set_prices(&mut self, prices: &PriceSeries) {
        self.prices = Some(prices.clone());
    }

    fn compute_load(&mut self) -> Result<LoadSeries, UninitializedPlayerError> {
        if self.prices.is_none() {
            return Err(UninitializedPlayerError::missing_prices(&self.meta));
        }
        Ok(vec![self.baseline_kw; self.horizon])
    }
}
