//! smart-router: Multi-protocol swap routing core
//!
//! Selects candidate pools for a token pair across V2 and V3 (and routes that
//! mix both), enumerates paths over them, prices every path at every split
//! of the trade net of gas, and re-prices an assembled route after simulating
//! its transaction.
//!
//! Data comes in through the ports in `chain-providers`; nothing here talks to
//! a network directly.

pub mod amount_distribution;
pub mod candidate_pools;
pub mod entities;
pub mod gas_accounting;
pub mod gas_models;
pub mod quoters;
pub mod routes;
pub mod simulation;

pub use amount_distribution::get_amount_distribution;
pub use candidate_pools::{
    get_mixed_route_candidate_pools, get_v2_candidate_pools, get_v3_candidate_pools, CandidatePoolSelections,
    CandidatePoolsBySelection, CandidatePoolsParams, MixedCandidatePools, MixedCandidatePoolsParams,
    V2CandidatePools, V3CandidatePools,
};
pub use entities::{adjust_quote_for_gas, QuoteParams, RouteWithValidQuote, TickDetails, ValidQuote};
pub use gas_accounting::{calculate_gas_used, GasUsedEstimate};
pub use gas_models::{GasCostEstimate, GasModel, MixedRouteGasModel, V2GasModel, V3GasModel};
pub use quoters::{GetQuotesResult, GetRoutesResult, MixedQuoter, QuoteRequest, V2Quoter, V3Quoter};
pub use routes::{compute_all_mixed_routes, compute_all_v2_routes, compute_all_v3_routes, MixedPool, MixedRoute};
pub use simulation::{
    adjust_gas_estimate, EthEstimateGasSimulator, FullSimulationSimulator, MethodParameters, SimulationStatus,
    Simulator, SwapRoute, SwapType, Trade,
};
