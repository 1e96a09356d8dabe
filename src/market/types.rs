//! Core market data: load series, bills, and per-iteration snapshots.

use std::collections::BTreeMap;
use std::fmt;

use crate::players::Category;

/// Net energy draw per slot; negative values are injection.
pub type LoadSeries = Vec<f64>;

/// Slot-wise dot product of a load with the purchase price.
pub fn bill(load: &[f64], purchase: &[f64]) -> f64 {
    load.iter().zip(purchase).map(|(l, p)| l * p).sum()
}

/// Everything recorded for one (simulation, iteration) pair.
#[derive(Debug, Clone)]
pub struct IterationSnapshot {
    /// Label of the scenario entry drawn for each category this game.
    pub scenario: BTreeMap<Category, String>,
    /// Actual per-category loads (injection included).
    pub category_loads: BTreeMap<Category, LoadSeries>,
    /// Per-category bills against the purchase price.
    pub category_bills: BTreeMap<Category, f64>,
    /// Aggregate congestion signal (per-player loads clipped at zero).
    pub microgrid_load: LoadSeries,
    /// Aggregate bill: `Σ_t microgrid_load[t] * purchase[t]`.
    pub microgrid_bill: f64,
}

impl IterationSnapshot {
    /// Peak slot of the aggregate load, 0.0 for an empty horizon.
    pub fn peak_load_kw(&self) -> f64 {
        self.microgrid_load.iter().copied().fold(0.0, f64::max)
    }

    /// Scenario labels joined for reporting, e.g. `"solar_farm=region_1/scenario_3"`.
    pub fn scenario_summary(&self) -> String {
        self.scenario
            .iter()
            .map(|(cat, label)| format!("{cat}={label}"))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// The ordered snapshot sequence for one game.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Simulation id (outer loop index).
    pub simulation: usize,
    /// Snapshots in iteration order.
    pub snapshots: Vec<IterationSnapshot>,
    /// Whether the price loop met the convergence predicate.
    pub converged: bool,
}

impl SimulationResult {
    /// Number of recorded iterations.
    pub fn iterations(&self) -> usize {
        self.snapshots.len()
    }

    /// Last recorded snapshot, if any iteration ran.
    pub fn final_snapshot(&self) -> Option<&IterationSnapshot> {
        self.snapshots.last()
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let final_bill = self
            .final_snapshot()
            .map(|s| s.microgrid_bill)
            .unwrap_or(0.0);
        write!(
            f,
            "sim={:>3} | iterations={:>2}  converged={}  final_bill={:.2}",
            self.simulation,
            self.iterations(),
            self.converged,
            final_bill,
        )
    }
}
