//! Industrial-consumer player: fixed daily consumption profile.

use crate::market::prices::PriceSeries;
use crate::market::types::LoadSeries;
use crate::scenario::{ScenarioData, ScenarioEntry};

use super::types::{Player, PlayerMeta, UninitializedPlayerError};

/// Price-insensitive consumer: the drawn consumption profile is the
/// load, verbatim, every round.
#[derive(Debug, Clone)]
pub struct IndustrialConsumer {
    meta: PlayerMeta,
    profile: Option<Vec<f64>>,
    prices: Option<PriceSeries>,
}

impl IndustrialConsumer {
    pub fn new(meta: PlayerMeta) -> Self {
        Self {
            meta,
            profile: None,
            prices: None,
        }
    }
}

impl Player for IndustrialConsumer {
    fn meta(&self) -> &PlayerMeta {
        &self.meta
    }

    fn reset(&mut self) {
        self.profile = None;
        self.prices = None;
    }

    fn set_scenario(&mut self, entry: &ScenarioEntry) {
        if let ScenarioData::Profile(values) = &entry.data {
            self.profile = Some(values.clone());
        }
    }

    fn set_prices(&mut self, prices: &PriceSeries) {
        self.prices = Some(prices.clone());
    }

    fn compute_load(&mut self) -> Result<LoadSeries, UninitializedPlayerError> {
        let profile = self
            .profile
            .as_ref()
            .ok_or_else(|| UninitializedPlayerError::missing_scenario(&self.meta))?;
        if self.prices.is_none() {
            return Err(UninitializedPlayerError::missing_prices(&self.meta));
        }
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::Category;

    fn consumer() -> IndustrialConsumer {
        IndustrialConsumer::new(PlayerMeta::new(
            Category::IndustrialConsumer,
            "plant_a",
            "team_PIR",
        ))
    }

    fn profile_entry(values: Vec<f64>) -> ScenarioEntry {
        ScenarioEntry {
            label: "scenario_1".to_string(),
            data: ScenarioData::Profile(values),
        }
    }

    #[test]
    fn load_is_the_profile_regardless_of_prices() {
        let mut player = consumer();
        player.set_scenario(&profile_entry(vec![2.0, 2.0, 2.0, 2.0]));

        player.set_prices(&PriceSeries::uniform(4, 1.0, 1.0));
        let cheap = player.compute_load().expect("initialized");
        player.set_prices(&PriceSeries::uniform(4, 100.0, 100.0));
        let expensive = player.compute_load().expect("initialized");

        assert_eq!(cheap, vec![2.0, 2.0, 2.0, 2.0]);
        assert_eq!(cheap, expensive);
    }

    #[test]
    fn uninitialized_compute_is_an_error() {
        let mut player = consumer();
        let err = player.compute_load().expect_err("no scenario yet");
        assert_eq!(err.missing, "scenario");
        assert_eq!(err.category, Category::IndustrialConsumer);

        player.set_scenario(&profile_entry(vec![1.0]));
        let err = player.compute_load().expect_err("no prices yet");
        assert_eq!(err.missing, "prices");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut player = consumer();
        player.reset();
        player.reset();
        assert!(player.compute_load().is_err());
    }
}
