//! Runs N independent games over one process-wide draw stream.

use rand::{SeedableRng, rngs::StdRng};

use crate::players::PlayerRegistry;
use crate::scenario::ScenarioLibrary;

use super::coordinator::{GameError, PriceCoordinator};
use super::results::ResultStore;
use super::types::SimulationResult;

/// Sequential simulation runner.
///
/// Games share the library, registry, and one seeded rng; draws are not
/// re-seeded per game, so a fixed seed reproduces the entire run.
pub struct SimulationDriver {
    coordinator: PriceCoordinator,
    store: ResultStore,
    rng: StdRng,
}

impl SimulationDriver {
    pub fn new(coordinator: PriceCoordinator, seed: u64) -> Self {
        Self {
            coordinator,
            store: ResultStore::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Plays `simulations` games back to back and returns the
    /// accumulated results in simulation order.
    ///
    /// Players are reset one final time after the last game, leaving the
    /// registry clean for any later run.
    ///
    /// # Errors
    ///
    /// Returns the first `GameError`; games are never retried.
    pub fn run(
        &mut self,
        simulations: usize,
        library: &ScenarioLibrary,
        registry: &mut PlayerRegistry,
    ) -> Result<Vec<SimulationResult>, GameError> {
        for simulation in 0..simulations {
            self.coordinator
                .play(simulation, library, registry, &mut self.store, &mut self.rng)?;
        }
        for player in registry.iter_mut() {
            player.reset();
        }
        Ok(self.store.all_results())
    }

    /// The underlying store (for callers that want raw access).
    pub fn store(&self) -> &ResultStore {
        &self.store
    }
}
