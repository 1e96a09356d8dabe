//! Shared test fixtures for integration tests.

use microgrid_market::config::RunConfig;
use microgrid_market::scenario::ScenarioLibrary;

/// Catalog with one mixed-category team and one single-consumer team.
pub const CATALOG: &str = r#"
{
    "team_PIR": [
        { "type": "charging_station", "folder": "station_a" },
        { "type": "solar_farm", "folder": "farm_a" },
        { "type": "industrial_consumer", "folder": "plant_a" },
        { "type": "data_center", "folder": "dc_a" }
    ],
    "team_single": [
        { "type": "industrial_consumer", "folder": "plant_b" }
    ]
}
"#;

/// EV table: `days * fleet_size` rows of 1-based slot windows.
pub fn ev_csv(days: usize, fleet_size: usize, horizon: usize) -> String {
    let mut s = String::from("car;time_slot_dep;time_slot_arr\n");
    for day in 0..days {
        for car in 0..fleet_size {
            let dep = 1 + (day + car) % (horizon / 2);
            let arr = dep + horizon / 4;
            s.push_str(&format!("{};{};{}\n", car + 1, dep, arr));
        }
    }
    s
}

/// PV table: region-major hourly irradiance rows.
pub fn pv_csv(regions: usize, days: usize, hours: usize) -> String {
    let mut s = String::from("region;pv_prod (W/m2)\n");
    for region in 0..regions {
        for day in 0..days {
            for hour in 0..hours {
                // a crude daylight bump peaking mid-day
                let mid = hours as f64 / 2.0;
                let value =
                    (500.0 - 40.0 * (hour as f64 - mid).abs()).max(0.0) + (region + day) as f64;
                s.push_str(&format!("{};{value}\n", region + 1));
            }
        }
    }
    s
}

/// Industrial table: constant per-scenario consumption profiles.
pub fn indus_csv(scenarios: usize, slots: usize, cons_kw: f64) -> String {
    let mut s = String::from("time_slot;cons (kW)\n");
    for _ in 0..scenarios {
        for slot in 0..slots {
            s.push_str(&format!("{};{cons_kw}\n", slot + 1));
        }
    }
    s
}

/// A small mixed-category library consistent with `small_config()`.
pub fn small_library(config: &RunConfig) -> ScenarioLibrary {
    let horizon = config.market.horizon;
    let mut lib = ScenarioLibrary::empty();
    lib.read_fleet(
        ev_csv(3, config.fleet.vehicles, horizon).as_bytes(),
        config.fleet.vehicles,
    )
    .expect("fleet fixture parses");
    lib.read_solar(pv_csv(config.solar.regions, 2, 24).as_bytes(), config.solar.regions, 24)
        .expect("solar fixture parses");
    lib.read_industrial(indus_csv(3, horizon, 2.0).as_bytes(), horizon)
        .expect("industrial fixture parses");
    lib
}

/// Default config shrunk to a 2-vehicle fleet and 2 solar regions so
/// the fixture tables stay small.
pub fn small_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.fleet.vehicles = 2;
    config.solar.regions = 2;
    config
}
