//! TOML-based run configuration for the market simulation.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the reference market constants.
/// Load from TOML with [`RunConfig::from_toml_file`] or use
/// [`RunConfig::default`] for the built-in baseline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Run identity, simulation count, and random seed.
    #[serde(default)]
    pub run: RunSection,
    /// Price-coordination loop parameters.
    #[serde(default)]
    pub market: MarketConfig,
    /// Charging-station fleet parameters.
    #[serde(default)]
    pub fleet: FleetConfig,
    /// Solar-farm parameters.
    #[serde(default)]
    pub solar: SolarConfig,
    /// Data-center parameters.
    #[serde(default)]
    pub data_center: DataCenterConfig,
}

/// Run identity, simulation count, and random seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Experiment name used in log output.
    pub name: String,
    /// Number of independent games to play.
    pub simulations: usize,
    /// Master random seed for the process-wide draw stream.
    pub seed: u64,
    /// Fixed solar region index (0-based); random per game when absent.
    pub region: Option<usize>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            simulations: 1,
            seed: 42,
            region: None,
        }
    }
}

/// Price-coordination loop parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Number of time slots in one simulated day.
    pub horizon: usize,
    /// Iteration cap for the negotiation loop.
    pub max_iterations: usize,
    /// Baseline purchase price per slot.
    pub base_purchase: f64,
    /// Baseline sale price per slot.
    pub base_sale: f64,
    /// Congestion penalization factor K in `base + K * load`.
    pub penalization: f64,
    /// Per-slot convergence tolerance on `|Δpurchase| + |Δsale|`.
    pub epsilon: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            horizon: 48,
            max_iterations: 50,
            base_purchase: 1.0,
            base_sale: 1.0,
            penalization: 1.0,
            epsilon: 0.1,
        }
    }
}

impl MarketConfig {
    /// Duration of one slot in hours, derived as `24 / horizon`.
    ///
    /// Returns 0.0 for a zero horizon (the loop is a no-op there anyway).
    pub fn dt_hours(&self) -> f64 {
        if self.horizon == 0 {
            0.0
        } else {
            24.0 / self.horizon as f64
        }
    }
}

/// Charging-station fleet parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FleetConfig {
    /// Number of vehicles per station (also the EV table row group size).
    pub vehicles: usize,
    /// Energy each vehicle must recover per day (kWh).
    pub battery_kwh: f64,
    /// Maximum charging power per vehicle (kW).
    pub max_charge_kw: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vehicles: 10,
            battery_kwh: 40.0,
            max_charge_kw: 3.0,
        }
    }
}

/// Solar-farm parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarConfig {
    /// Panel surface in square meters.
    pub panel_area_m2: f64,
    /// Panel conversion efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Number of regions in the irradiance table.
    pub regions: usize,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            panel_area_m2: 100.0,
            efficiency: 0.15,
            regions: 8,
        }
    }
}

/// Data-center parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataCenterConfig {
    /// Constant baseline draw per slot (kW).
    pub baseline_kw: f64,
}

impl Default for DataCenterConfig {
    fn default() -> Self {
        Self { baseline_kw: 2.0 }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"market.epsilon"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl RunConfig {
    /// Parses a run configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a run configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let m = &self.market;
        if m.max_iterations == 0 {
            errors.push(ConfigError {
                field: "market.max_iterations".into(),
                message: "must be > 0".into(),
            });
        }
        if m.epsilon < 0.0 {
            errors.push(ConfigError {
                field: "market.epsilon".into(),
                message: "must be >= 0".into(),
            });
        }
        if m.penalization < 0.0 {
            errors.push(ConfigError {
                field: "market.penalization".into(),
                message: "must be >= 0".into(),
            });
        }
        if m.base_purchase < 0.0 || m.base_sale < 0.0 {
            errors.push(ConfigError {
                field: "market.base_purchase".into(),
                message: "baseline prices must be >= 0".into(),
            });
        }

        let fl = &self.fleet;
        if fl.vehicles == 0 {
            errors.push(ConfigError {
                field: "fleet.vehicles".into(),
                message: "must be > 0".into(),
            });
        }
        if fl.max_charge_kw <= 0.0 {
            errors.push(ConfigError {
                field: "fleet.max_charge_kw".into(),
                message: "must be > 0".into(),
            });
        }
        if fl.battery_kwh < 0.0 {
            errors.push(ConfigError {
                field: "fleet.battery_kwh".into(),
                message: "must be >= 0".into(),
            });
        }

        let sol = &self.solar;
        if !(sol.efficiency > 0.0 && sol.efficiency <= 1.0) {
            errors.push(ConfigError {
                field: "solar.efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if sol.panel_area_m2 < 0.0 {
            errors.push(ConfigError {
                field: "solar.panel_area_m2".into(),
                message: "must be >= 0".into(),
            });
        }
        if sol.regions == 0 {
            errors.push(ConfigError {
                field: "solar.regions".into(),
                message: "must be > 0".into(),
            });
        }

        if self.data_center.baseline_kw < 0.0 {
            errors.push(ConfigError {
                field: "data_center.baseline_kw".into(),
                message: "must be >= 0".into(),
            });
        }

        let r = &self.run;
        if r.simulations == 0 {
            errors.push(ConfigError {
                field: "run.simulations".into(),
                message: "must be > 0".into(),
            });
        }
        if let Some(region) = r.region
            && region >= sol.regions
        {
            errors.push(ConfigError {
                field: "run.region".into(),
                message: format!("must be < solar.regions ({})", sol.regions),
            });
        }

        errors
    }
}
