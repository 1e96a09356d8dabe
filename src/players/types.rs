//! Player capability contract, category tags, and declaration metadata.

use std::fmt;

use serde::Deserialize;

use crate::market::prices::PriceSeries;
use crate::market::types::LoadSeries;
use crate::scenario::ScenarioEntry;

/// Player category, each with its own load strategy and scenario driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ChargingStation,
    SolarFarm,
    IndustrialConsumer,
    DataCenter,
}

impl Category {
    /// Stable snake_case name, matching the catalog `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargingStation => "charging_station",
            Self::SolarFarm => "solar_farm",
            Self::IndustrialConsumer => "industrial_consumer",
            Self::DataCenter => "data_center",
        }
    }

    /// Whether the category draws a stochastic scenario each game.
    ///
    /// Data centers have no external driver and run a fixed baseline.
    pub fn has_scenario_driver(&self) -> bool {
        !matches!(self, Self::DataCenter)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One player declaration from the team catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerDecl {
    /// Player category.
    #[serde(rename = "type")]
    pub category: Category,
    /// Instance identity (the catalog's folder name).
    pub folder: String,
}

/// Immutable identity metadata carried by every runtime player.
#[derive(Debug, Clone)]
pub struct PlayerMeta {
    pub category: Category,
    pub identity: String,
    pub team: String,
}

impl PlayerMeta {
    pub fn new(category: Category, identity: &str, team: &str) -> Self {
        Self {
            category,
            identity: identity.to_string(),
            team: team.to_string(),
        }
    }
}

/// Contract violation: `compute_load` called before the player was fed
/// its scenario and prices for the current game.
#[derive(Debug, Clone)]
pub struct UninitializedPlayerError {
    pub category: Category,
    pub identity: String,
    /// Which precondition was missing (`"scenario"` or `"prices"`).
    pub missing: &'static str,
}

impl UninitializedPlayerError {
    pub fn missing_scenario(meta: &PlayerMeta) -> Self {
        Self {
            category: meta.category,
            identity: meta.identity.clone(),
            missing: "scenario",
        }
    }

    pub fn missing_prices(meta: &PlayerMeta) -> Self {
        Self {
            category: meta.category,
            identity: meta.identity.clone(),
            missing: "prices",
        }
    }
}

impl fmt::Display for UninitializedPlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "player \"{}\" ({}) computed load before {} was set",
            self.identity, self.category, self.missing
        )
    }
}

impl std::error::Error for UninitializedPlayerError {}

/// A pluggable market participant.
///
/// The coordinator drives every player through the same sequence each
/// game: `reset`, `set_scenario` (once, for categories with a driver),
/// then per iteration `set_prices` followed by `compute_load`.
pub trait Player {
    /// Identity metadata (category, instance, team).
    fn meta(&self) -> &PlayerMeta;

    /// Clears all per-game state. Idempotent.
    fn reset(&mut self);

    /// Records the scenario driver for the current game.
    ///
    /// Called exactly once per game, before the price loop starts.
    /// Scenario-less categories ignore the call.
    fn set_scenario(&mut self, entry: &ScenarioEntry);

    /// Records the current round's prices.
    fn set_prices(&mut self, prices: &PriceSeries);

    /// Computes this round's load over the horizon.
    ///
    /// Deterministic in the current scenario, latest prices, and any
    /// accumulated per-game state. Producers return negative values
    /// (injection).
    ///
    /// # Errors
    ///
    /// Returns [`UninitializedPlayerError`] if called before the
    /// required `set_scenario`/`set_prices` calls for this game.
    fn compute_load(&mut self) -> Result<LoadSeries, UninitializedPlayerError>;
}
