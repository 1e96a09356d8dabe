//! Resolves catalog declarations into runtime player instances.

use std::collections::BTreeSet;

use crate::config::RunConfig;

use super::charging_station::ChargingStation;
use super::data_center::DataCenter;
use super::industrial_consumer::IndustrialConsumer;
use super::solar_farm::SolarFarm;
use super::types::{Category, Player, PlayerDecl, PlayerMeta};

/// The resolved roster: one boxed player per catalog declaration,
/// created once and reused (reset, not recreated) across all games.
pub struct PlayerRegistry {
    players: Vec<Box<dyn Player>>,
}

impl PlayerRegistry {
    /// Builds the roster for a team from its catalog declarations.
    ///
    /// Category-to-constructor resolution is this explicit match; adding
    /// a category means adding an arm here, never touching the
    /// coordinator.
    pub fn from_roster(team: &str, roster: &[PlayerDecl], config: &RunConfig) -> Self {
        let players = roster
            .iter()
            .map(|decl| {
                let meta = PlayerMeta::new(decl.category, &decl.folder, team);
                let player: Box<dyn Player> = match decl.category {
                    Category::ChargingStation => {
                        Box::new(ChargingStation::new(meta, &config.market, &config.fleet))
                    }
                    Category::SolarFarm => {
                        Box::new(SolarFarm::new(meta, &config.market, &config.solar))
                    }
                    Category::IndustrialConsumer => Box::new(IndustrialConsumer::new(meta)),
                    Category::DataCenter => {
                        Box::new(DataCenter::new(meta, &config.market, &config.data_center))
                    }
                };
                player
            })
            .collect();
        Self { players }
    }

    /// Wraps pre-built players; used by tests to inject stub strategies.
    pub fn from_players(players: Vec<Box<dyn Player>>) -> Self {
        Self { players }
    }

    /// Distinct categories present in the roster, in sorted order.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.players.iter().map(|p| p.meta().category).collect()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn Player>> {
        self.players.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
