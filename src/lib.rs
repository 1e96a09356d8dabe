//! Decentralized microgrid energy market simulator.
//!
//! A coordinator iteratively posts purchase/sale prices to a set of
//! heterogeneous players (charging station, solar farm, industrial
//! consumer, data center), collects their load responses, and adjusts
//! prices with a congestion penalty until the market converges or an
//! iteration cap is reached.

pub mod catalog;
pub mod config;
pub mod io;
/// Price series, negotiation loop, result store, and simulation driver.
pub mod market;
pub mod players;
pub mod scenario;
