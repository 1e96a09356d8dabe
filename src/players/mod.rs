//! Market participants: the capability contract and the four reference
//! category strategies.

/// Price-responsive vehicle-fleet charging.
pub mod charging_station;
/// Scenario-less constant baseline draw.
pub mod data_center;
/// Fixed daily consumption profile.
pub mod industrial_consumer;
pub mod registry;
/// Irradiance-driven injection.
pub mod solar_farm;
pub mod types;

// Re-export the main types for convenience
pub use charging_station::ChargingStation;
pub use data_center::DataCenter;
pub use industrial_consumer::IndustrialConsumer;
pub use registry::PlayerRegistry;
pub use solar_farm::SolarFarm;
pub use types::Category;
pub use types::Player;
pub use types::PlayerDecl;
pub use types::PlayerMeta;
pub use types::UninitializedPlayerError;
