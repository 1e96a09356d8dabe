//! Append-only two-level store of every iteration of every game.

use std::collections::BTreeMap;

use super::types::{IterationSnapshot, SimulationResult};

#[derive(Debug, Clone, Default)]
struct GameRecord {
    snapshots: BTreeMap<usize, IterationSnapshot>,
    converged: bool,
}

/// Snapshot store addressed by simulation id then iteration id.
///
/// Created per run, owned by the driver, read after all games complete.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    games: BTreeMap<usize, GameRecord>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one snapshot, overwriting any prior entry at the same key.
    ///
    /// Always succeeds; overwrite keeps single-iteration re-runs idempotent.
    pub fn record(&mut self, simulation: usize, iteration: usize, snapshot: IterationSnapshot) {
        self.games
            .entry(simulation)
            .or_default()
            .snapshots
            .insert(iteration, snapshot);
    }

    /// Sets the convergence flag for one game.
    pub fn set_converged(&mut self, simulation: usize, converged: bool) {
        self.games.entry(simulation).or_default().converged = converged;
    }

    /// Number of games with at least one recorded entry.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// All results in simulation-id order, iterations in iteration order.
    pub fn all_results(&self) -> Vec<SimulationResult> {
        self.games
            .iter()
            .map(|(&simulation, record)| SimulationResult {
                simulation,
                snapshots: record.snapshots.values().cloned().collect(),
                converged: record.converged,
            })
            .collect()
    }
}
