//! Concentrated-Liquidity (V3) Protocol Implementation
//!
//! Fee tiers, pool snapshots and their prices, deterministic pool
//! addresses, multi-pool routes, and the gas constants for V3 swaps.

pub mod address;
pub mod constants;
pub mod fee;
pub mod route;
pub mod state;

// Re-exports
pub use address::{compute_pool_address, compute_pool_address_with_factory, PoolAddress};
pub use constants::{factory, gas};
pub use fee::FeeAmount;
pub use route::V3Route;
pub use state::{V3Error, V3Pool};
