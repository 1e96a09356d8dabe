//! The price-coordination core: price series, negotiation loop,
//! result store, and the simulation driver.

pub mod coordinator;
pub mod driver;
pub mod prices;
/// Two-level (simulation, iteration) snapshot store.
pub mod results;
pub mod types;

// Re-export the main types for convenience
pub use coordinator::GameError;
pub use coordinator::PriceCoordinator;
pub use driver::SimulationDriver;
pub use prices::PriceSeries;
pub use results::ResultStore;
pub use types::IterationSnapshot;
pub use types::LoadSeries;
pub use types::SimulationResult;
