//! V3 Constants
//!
//! Factory parameters for pool address derivation and the per-chain gas
//! costs used by the V3 and mixed gas models.

/// Pool factory parameters
pub mod factory {
    /// Uniswap V3 factory
    pub const FACTORY_ADDRESS: &str = "0x1F98431c8aD98523631AE4a59f267346ea31F984";

    /// keccak256 of the pool creation code
    pub const POOL_INIT_CODE_HASH: &str =
        "e34f199b19b2b4f47f68442619d555527d244f78a3297ea89349f1f2f1d5c2de";
}

/// Gas costs for V3 swaps
pub mod gas {
    use router_core::ChainId;

    /// Fixed cost of entering the router
    pub fn base_swap_cost(chain: ChainId) -> u64 {
        match chain {
            ChainId::Arbitrum => 5_000,
            _ => 2_000,
        }
    }

    /// Cost of crossing one initialized tick
    pub fn cost_per_init_tick(_chain: ChainId) -> u64 {
        31_000
    }

    /// Cost of each pool in the path
    pub fn cost_per_hop(_chain: ChainId) -> u64 {
        80_000
    }

    /// Extra gas when the trade starts with the native currency
    pub const NATIVE_WRAP_OVERHEAD: u64 = 27_938;

    /// Extra gas when the trade ends with the native currency
    pub const NATIVE_UNWRAP_OVERHEAD: u64 = 36_000;
}
