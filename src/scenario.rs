//! Scenario pools loaded from the per-category CSV tables, plus random draws.
//!
//! Three table shapes exist upstream, all `;`-delimited:
//! - `ev_scenarios.csv`: one row per (day, vehicle) with 1-based
//!   `time_slot_dep`/`time_slot_arr` columns;
//! - `pv_prod_scenarios.csv`: one row per (region, day, hour) with a
//!   `pv_prod (W/m2)` column, region-major;
//! - `indus_cons_scenarios.csv`: one row per (scenario, slot) with
//!   `time_slot` (1-based, restarting each scenario) and `cons (kW)`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::{Rng, rngs::StdRng};

use crate::players::Category;

/// EV table file name inside the scenario directory.
pub const EV_FILE: &str = "ev_scenarios.csv";
/// PV table file name inside the scenario directory.
pub const PV_FILE: &str = "pv_prod_scenarios.csv";
/// Industrial table file name inside the scenario directory.
pub const INDUSTRIAL_FILE: &str = "indus_cons_scenarios.csv";

/// Expected per-category table shapes.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Rows per day in the EV table (vehicles per station).
    pub fleet_size: usize,
    /// Number of regions in the PV table.
    pub regions: usize,
    /// Hourly values per (region, day) in the PV table.
    pub hours_per_day: usize,
    /// Slots per scenario in the industrial table.
    pub slots_per_scenario: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            fleet_size: 10,
            regions: 8,
            hours_per_day: 24,
            slots_per_scenario: 48,
        }
    }
}

/// Away window for one vehicle: gone in `[departure_slot, arrival_slot)`.
///
/// Slots are 0-based (normalized from the 1-based table values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleWindow {
    pub departure_slot: usize,
    pub arrival_slot: usize,
}

/// Category-specific scenario payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioData {
    /// A plain numeric time series (irradiance, consumption, ...).
    Profile(Vec<f64>),
    /// Per-vehicle departure/arrival windows for one day.
    Fleet(Vec<VehicleWindow>),
}

/// One labeled scenario drawn into a game.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEntry {
    /// Stable label for reporting (e.g., `"region_3/scenario_41"`).
    pub label: String,
    pub data: ScenarioData,
}

/// A scenario source table has an unexpected shape.
#[derive(Debug)]
pub struct DataFormatError {
    /// Offending table or file name.
    pub table: String,
    pub message: String,
}

impl DataFormatError {
    fn new(table: &str, message: impl Into<String>) -> Self {
        Self {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario data error in {}: {}", self.table, self.message)
    }
}

impl std::error::Error for DataFormatError {}

/// All per-category scenario pools, read-only after construction.
///
/// Safe to share across simulations; draws go through a caller-supplied
/// rng so one seeded stream covers the whole run.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLibrary {
    fleet: Vec<ScenarioEntry>,
    solar: Vec<Vec<ScenarioEntry>>,
    industrial: Vec<ScenarioEntry>,
}

impl ScenarioLibrary {
    /// Creates a library with no pools (every draw returns `None`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the tables needed by the given categories from a directory.
    ///
    /// Only categories with a scenario driver are consulted; a category
    /// absent from `categories` leaves its pool empty.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` if a required file is missing or a
    /// table does not match the expected shape. No partial library is
    /// returned.
    pub fn load(
        dir: &Path,
        categories: &BTreeSet<Category>,
        layout: &TableLayout,
    ) -> Result<Self, DataFormatError> {
        let mut library = Self::empty();
        if categories.contains(&Category::ChargingStation) {
            library.read_fleet(open_table(dir, EV_FILE)?, layout.fleet_size)?;
        }
        if categories.contains(&Category::SolarFarm) {
            library.read_solar(open_table(dir, PV_FILE)?, layout.regions, layout.hours_per_day)?;
        }
        if categories.contains(&Category::IndustrialConsumer) {
            library.read_industrial(
                open_table(dir, INDUSTRIAL_FILE)?,
                layout.slots_per_scenario,
            )?;
        }
        Ok(library)
    }

    /// Parses the EV table: `fleet_size` rows per day, 1-based slot columns.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` on a missing column, an unparsable or
    /// zero slot value, or a row count not divisible by `fleet_size`.
    pub fn read_fleet(
        &mut self,
        reader: impl Read,
        fleet_size: usize,
    ) -> Result<(), DataFormatError> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_reader(reader);
        let headers = headers_of(&mut rdr, EV_FILE)?;
        let dep_col = column_index(&headers, "time_slot_dep", EV_FILE)?;
        let arr_col = column_index(&headers, "time_slot_arr", EV_FILE)?;

        let mut windows = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|e| DataFormatError::new(EV_FILE, format!("row {}: {e}", row + 1)))?;
            let departure = parse_slot(&record, dep_col, row, EV_FILE)?;
            let arrival = parse_slot(&record, arr_col, row, EV_FILE)?;
            windows.push(VehicleWindow {
                departure_slot: departure,
                arrival_slot: arrival,
            });
        }

        if windows.is_empty() {
            return Err(DataFormatError::new(EV_FILE, "table has no data rows"));
        }
        if fleet_size == 0 || windows.len() % fleet_size != 0 {
            return Err(DataFormatError::new(
                EV_FILE,
                format!(
                    "{} rows is not a whole number of {fleet_size}-vehicle days",
                    windows.len()
                ),
            ));
        }

        self.fleet = windows
            .chunks(fleet_size)
            .enumerate()
            .map(|(day, chunk)| ScenarioEntry {
                label: format!("scenario_{}", day + 1),
                data: ScenarioData::Fleet(chunk.to_vec()),
            })
            .collect();
        Ok(())
    }

    /// Parses the PV table: region-major rows of hourly irradiance.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` on a missing column, an unparsable
    /// value, or a row count that is not `regions * days * hours_per_day`.
    pub fn read_solar(
        &mut self,
        reader: impl Read,
        regions: usize,
        hours_per_day: usize,
    ) -> Result<(), DataFormatError> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_reader(reader);
        let headers = headers_of(&mut rdr, PV_FILE)?;
        let prod_col = column_index(&headers, "pv_prod (W/m2)", PV_FILE)?;

        let mut values = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record
                .map_err(|e| DataFormatError::new(PV_FILE, format!("row {}: {e}", row + 1)))?;
            values.push(parse_number(&record, prod_col, row, PV_FILE)?);
        }

        if regions == 0 || hours_per_day == 0 {
            return Err(DataFormatError::new(PV_FILE, "layout has zero regions or hours"));
        }
        if values.is_empty() || values.len() % (regions * hours_per_day) != 0 {
            return Err(DataFormatError::new(
                PV_FILE,
                format!(
                    "{} rows does not split into {regions} regions of {hours_per_day}-hour days",
                    values.len()
                ),
            ));
        }

        let days = values.len() / (regions * hours_per_day);
        let mut pools = Vec::with_capacity(regions);
        for region in 0..regions {
            let mut pool = Vec::with_capacity(days);
            for day in 0..days {
                let start = region * days * hours_per_day + day * hours_per_day;
                pool.push(ScenarioEntry {
                    label: format!("region_{}/scenario_{}", region + 1, day + 1),
                    data: ScenarioData::Profile(
                        values[start..start + hours_per_day].to_vec(),
                    ),
                });
            }
            pools.push(pool);
        }
        self.solar = pools;
        Ok(())
    }

    /// Parses the industrial table: `slots_per_scenario` rows per scenario.
    ///
    /// # Errors
    ///
    /// Returns a `DataFormatError` on a missing column, an unparsable
    /// value, a row count not divisible by `slots_per_scenario`, or a
    /// scenario whose `time_slot` column does not restart at 1.
    pub fn read_industrial(
        &mut self,
        reader: impl Read,
        slots_per_scenario: usize,
    ) -> Result<(), DataFormatError> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_reader(reader);
        let headers = headers_of(&mut rdr, INDUSTRIAL_FILE)?;
        let slot_col = column_index(&headers, "time_slot", INDUSTRIAL_FILE)?;
        let cons_col = column_index(&headers, "cons (kW)", INDUSTRIAL_FILE)?;

        let mut slots = Vec::new();
        let mut consumptions = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                DataFormatError::new(INDUSTRIAL_FILE, format!("row {}: {e}", row + 1))
            })?;
            slots.push(parse_slot(&record, slot_col, row, INDUSTRIAL_FILE)?);
            consumptions.push(parse_number(&record, cons_col, row, INDUSTRIAL_FILE)?);
        }

        if consumptions.is_empty() {
            return Err(DataFormatError::new(INDUSTRIAL_FILE, "table has no data rows"));
        }
        if slots_per_scenario == 0 || consumptions.len() % slots_per_scenario != 0 {
            return Err(DataFormatError::new(
                INDUSTRIAL_FILE,
                format!(
                    "{} rows is not a whole number of {slots_per_scenario}-slot scenarios",
                    consumptions.len()
                ),
            ));
        }

        let mut pool = Vec::new();
        for (index, chunk) in consumptions.chunks(slots_per_scenario).enumerate() {
            let first_slot = slots[index * slots_per_scenario];
            if first_slot != 0 {
                return Err(DataFormatError::new(
                    INDUSTRIAL_FILE,
                    format!("scenario {} does not restart at time_slot 1", index + 1),
                ));
            }
            pool.push(ScenarioEntry {
                label: format!("scenario_{}", index + 1),
                data: ScenarioData::Profile(chunk.to_vec()),
            });
        }
        self.industrial = pool;
        Ok(())
    }

    /// Whether the library holds at least one entry for the category.
    pub fn has_scenarios(&self, category: Category) -> bool {
        match category {
            Category::ChargingStation => !self.fleet.is_empty(),
            Category::SolarFarm => self.solar.iter().any(|pool| !pool.is_empty()),
            Category::IndustrialConsumer => !self.industrial.is_empty(),
            Category::DataCenter => false,
        }
    }

    /// Number of regions in the solar pool.
    pub fn regions(&self) -> usize {
        self.solar.len()
    }

    /// Draws one entry uniformly at random for the category.
    ///
    /// For the solar pool, `region` fixes the region; otherwise a region
    /// is drawn uniformly first (the upstream behavior). Returns `None`
    /// when the category has no pool or the region index is out of range.
    pub fn draw(
        &self,
        category: Category,
        region: Option<usize>,
        rng: &mut StdRng,
    ) -> Option<ScenarioEntry> {
        match category {
            Category::ChargingStation => pick(&self.fleet, rng),
            Category::IndustrialConsumer => pick(&self.industrial, rng),
            Category::SolarFarm => {
                if self.solar.is_empty() {
                    return None;
                }
                let region = match region {
                    Some(r) => r,
                    None => rng.random_range(0..self.solar.len()),
                };
                pick(self.solar.get(region)?, rng)
            }
            Category::DataCenter => None,
        }
    }
}

fn pick(pool: &[ScenarioEntry], rng: &mut StdRng) -> Option<ScenarioEntry> {
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.random_range(0..pool.len())].clone())
}

fn open_table(dir: &Path, file: &str) -> Result<File, DataFormatError> {
    let path = dir.join(file);
    File::open(&path)
        .map_err(|e| DataFormatError::new(file, format!("cannot open \"{}\": {e}", path.display())))
}

fn headers_of(
    rdr: &mut csv::Reader<impl Read>,
    table: &str,
) -> Result<csv::StringRecord, DataFormatError> {
    rdr.headers()
        .map(csv::StringRecord::clone)
        .map_err(|e| DataFormatError::new(table, format!("cannot read header: {e}")))
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    table: &str,
) -> Result<usize, DataFormatError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataFormatError::new(table, format!("missing expected column \"{name}\"")))
}

fn parse_number(
    record: &csv::StringRecord,
    col: usize,
    row: usize,
    table: &str,
) -> Result<f64, DataFormatError> {
    let raw = record
        .get(col)
        .ok_or_else(|| DataFormatError::new(table, format!("row {}: too few columns", row + 1)))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DataFormatError::new(table, format!("row {}: \"{raw}\" is not a number", row + 1)))
}

/// Parses a 1-based slot index and normalizes it to 0-based.
fn parse_slot(
    record: &csv::StringRecord,
    col: usize,
    row: usize,
    table: &str,
) -> Result<usize, DataFormatError> {
    let raw = record
        .get(col)
        .ok_or_else(|| DataFormatError::new(table, format!("row {}: too few columns", row + 1)))?;
    let slot = raw.trim().parse::<usize>().map_err(|_| {
        DataFormatError::new(table, format!("row {}: \"{raw}\" is not a slot index", row + 1))
    })?;
    if slot == 0 {
        return Err(DataFormatError::new(
            table,
            format!("row {}: slot indices are 1-based, got 0", row + 1),
        ));
    }
    Ok(slot - 1)
}

/// Reads the optional external purchase-price seed: a single headerless
/// `;`-delimited row of exactly `horizon` values.
///
/// # Errors
///
/// Returns a `DataFormatError` on a missing file, an unparsable value,
/// or a length other than `horizon`.
pub fn load_external_purchase(path: &Path, horizon: usize) -> Result<Vec<f64>, DataFormatError> {
    let file = File::open(path).map_err(|e| {
        DataFormatError::new("prices", format!("cannot open \"{}\": {e}", path.display()))
    })?;
    read_external_purchase(file, horizon)
}

/// Reader-generic form of [`load_external_purchase`].
///
/// # Errors
///
/// Same conditions as [`load_external_purchase`].
pub fn read_external_purchase(
    reader: impl Read,
    horizon: usize,
) -> Result<Vec<f64>, DataFormatError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_reader(reader);
    let mut records = rdr.records();
    let record = records
        .next()
        .ok_or_else(|| DataFormatError::new("prices", "price table is empty"))?
        .map_err(|e| DataFormatError::new("prices", e.to_string()))?;

    let mut prices = Vec::with_capacity(record.len());
    for (col, raw) in record.iter().enumerate() {
        let value = raw.trim().parse::<f64>().map_err(|_| {
            DataFormatError::new("prices", format!("column {}: \"{raw}\" is not a number", col + 1))
        })?;
        prices.push(value);
    }
    if prices.len() != horizon {
        return Err(DataFormatError::new(
            "prices",
            format!("expected {horizon} values, found {}", prices.len()),
        ));
    }
    Ok(prices)
}
