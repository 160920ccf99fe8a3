//! Constant-Product (V2) Protocol Implementation
//!
//! Pair state and swap math, deterministic pair addresses, and multi-pair
//! routes for x * y = k pools.

pub mod address;
pub mod calculator;
pub mod constants;
pub mod route;
pub mod state;

// Re-exports
pub use address::{compute_pair_address, compute_pair_address_with_factory, create2_address, PairAddress};
pub use calculator::{calculate_input, calculate_output};
pub use constants::{factory, fees, gas};
pub use route::V2Route;
pub use state::{V2Error, V2Pool};
