//! Charging-station player: a vehicle fleet that charges in the
//! cheapest plugged-in slots.

use crate::config::{FleetConfig, MarketConfig};
use crate::market::prices::PriceSeries;
use crate::market::types::LoadSeries;
use crate::scenario::{ScenarioData, ScenarioEntry, VehicleWindow};

use super::types::{Player, PlayerMeta, UninitializedPlayerError};

/// Price-responsive fleet charging.
///
/// Each vehicle is away during `[departure_slot, arrival_slot)` and must
/// recover `battery_kwh` while plugged in. The station fills the
/// cheapest plugged-in slots first (ties broken by slot index) at up to
/// `max_charge_kw` per vehicle, which is what makes this category shift
/// load away from congested slots as prices rise.
#[derive(Debug, Clone)]
pub struct ChargingStation {
    meta: PlayerMeta,
    horizon: usize,
    dt_hours: f64,
    battery_kwh: f64,
    max_charge_kw: f64,
    fleet: Option<Vec<VehicleWindow>>,
    prices: Option<PriceSeries>,
}

impl ChargingStation {
    pub fn new(meta: PlayerMeta, market: &MarketConfig, fleet: &FleetConfig) -> Self {
        Self {
            meta,
            horizon: market.horizon,
            dt_hours: market.dt_hours(),
            battery_kwh: fleet.battery_kwh,
            max_charge_kw: fleet.max_charge_kw,
            fleet: None,
            prices: None,
        }
    }

    /// Plugged-in slots for one vehicle, cheapest purchase price first.
    fn charging_order(&self, window: &VehicleWindow, prices: &PriceSeries) -> Vec<usize> {
        let mut slots: Vec<usize> = (0..self.horizon)
            .filter(|&t| t < window.departure_slot || t >= window.arrival_slot)
            .collect();
        slots.sort_by(|&a, &b| {
            prices.purchase[a]
                .total_cmp(&prices.purchase[b])
                .then(a.cmp(&b))
        });
        slots
    }
}

impl Player for ChargingStation {
    fn meta(&self) -> &PlayerMeta {
        &self.meta
    }

    fn reset(&mut self) {
        self.fleet = None;
        self.prices = None;
    }

    fn set_scenario(&mut self, entry: &ScenarioEntry) {
        if let ScenarioData::Fleet(windows) = &entry.data {
            self.fleet = Some(windows.clone());
        }
    }

    fn set_prices(&mut self, prices: &PriceSeries) {
        self.prices = Some(prices.clone());
    }

    fn compute_load(&mut self) -> Result<LoadSeries, UninitializedPlayerError> {
        let fleet = self
            .fleet
            .clone()
            .ok_or_else(|| UninitializedPlayerError::missing_scenario(&self.meta))?;
        let prices = self
            .prices
            .clone()
            .ok_or_else(|| UninitializedPlayerError::missing_prices(&self.meta))?;

        let mut load = vec![0.0; self.horizon];
        if self.dt_hours <= 0.0 {
            return Ok(load);
        }

        let per_slot_kwh = self.max_charge_kw * self.dt_hours;
        for window in &fleet {
            let mut remaining_kwh = self.battery_kwh;
            for t in self.charging_order(window, &prices) {
                if remaining_kwh <= 0.0 {
                    break;
                }
                let delivered_kwh = per_slot_kwh.min(remaining_kwh);
                load[t] += delivered_kwh / self.dt_hours;
                remaining_kwh -= delivered_kwh;
            }
        }
        Ok(load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::Category;

    fn station(horizon: usize, battery_kwh: f64, max_charge_kw: f64) -> ChargingStation {
        let market = MarketConfig {
            horizon,
            ..MarketConfig::default()
        };
        let fleet = FleetConfig {
            vehicles: 1,
            battery_kwh,
            max_charge_kw,
        };
        ChargingStation::new(
            PlayerMeta::new(Category::ChargingStation, "station_a", "team_PIR"),
            &market,
            &fleet,
        )
    }

    fn fleet_entry(windows: Vec<VehicleWindow>) -> ScenarioEntry {
        ScenarioEntry {
            label: "scenario_1".to_string(),
            data: ScenarioData::Fleet(windows),
        }
    }

    #[test]
    fn uninitialized_compute_is_an_error() {
        let mut station = station(4, 10.0, 3.0);
        let err = station.compute_load().expect_err("no scenario yet");
        assert_eq!(err.missing, "scenario");

        station.set_scenario(&fleet_entry(vec![VehicleWindow {
            departure_slot: 1,
            arrival_slot: 2,
        }]));
        let err = station.compute_load().expect_err("no prices yet");
        assert_eq!(err.missing, "prices");
    }

    #[test]
    fn never_charges_while_away() {
        // away during [2, 6) on an 8-slot day, dt = 3h, 3 kW
        let mut station = station(8, 100.0, 3.0);
        station.set_scenario(&fleet_entry(vec![VehicleWindow {
            departure_slot: 2,
            arrival_slot: 6,
        }]));
        station.set_prices(&PriceSeries::uniform(8, 1.0, 1.0));
        let load = station.compute_load().expect("initialized");
        for t in 2..6 {
            assert_eq!(load[t], 0.0, "slot {t}");
        }
        assert!(load.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn fills_cheapest_slots_first() {
        // 4 slots, dt = 6h, needs one full slot plus a partial one
        let mut station = station(4, 20.0, 3.0);
        station.set_scenario(&fleet_entry(vec![VehicleWindow {
            departure_slot: 4,
            arrival_slot: 4,
        }]));
        station.set_prices(&PriceSeries::from_parts(
            vec![5.0, 1.0, 3.0, 2.0],
            vec![1.0; 4],
        ));
        let load = station.compute_load().expect("initialized");
        // slot 1 is cheapest: full 3 kW; slot 3 next: remaining 2 kWh over 6 h
        assert_eq!(load[1], 3.0);
        assert!((load[3] - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(load[0], 0.0);
        assert_eq!(load[2], 0.0);
    }

    #[test]
    fn demand_caps_at_available_slots() {
        // only 1 plugged-in slot, demand far exceeds deliverable energy
        let mut station = station(4, 500.0, 3.0);
        station.set_scenario(&fleet_entry(vec![VehicleWindow {
            departure_slot: 1,
            arrival_slot: 4,
        }]));
        station.set_prices(&PriceSeries::uniform(4, 1.0, 1.0));
        let load = station.compute_load().expect("initialized");
        assert_eq!(load, vec![3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn reset_then_refeed_matches_fresh_instance() {
        let windows = vec![VehicleWindow {
            departure_slot: 3,
            arrival_slot: 5,
        }];
        let prices = PriceSeries::from_parts(vec![2.0; 8], vec![1.0; 8]);

        let mut fresh = station(8, 12.0, 3.0);
        fresh.set_scenario(&fleet_entry(windows.clone()));
        fresh.set_prices(&prices);

        let mut reused = station(8, 12.0, 3.0);
        reused.set_scenario(&fleet_entry(windows.clone()));
        reused.set_prices(&PriceSeries::uniform(8, 9.0, 9.0));
        reused.compute_load().expect("initialized");
        reused.reset();
        reused.set_scenario(&fleet_entry(windows));
        reused.set_prices(&prices);

        assert_eq!(
            fresh.compute_load().expect("initialized"),
            reused.compute_load().expect("initialized")
        );
    }
}
