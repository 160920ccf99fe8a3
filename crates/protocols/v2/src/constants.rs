//! V2 Constants
//!
//! Factory parameters for pair address derivation, the swap fee, and gas
//! costs used by the V2 gas model.

/// Pair factory parameters
pub mod factory {
    /// Uniswap V2 factory
    pub const FACTORY_ADDRESS: &str = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f";

    /// keccak256 of the pair creation code
    pub const INIT_CODE_HASH: &str =
        "96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f";
}

/// Fee constants
pub mod fees {
    /// Fee numerator (0.3% fee = 997/1000)
    pub const FEE_NUM: u32 = 997;

    /// Fee denominator
    pub const FEE_DENOM: u32 = 1000;
}

/// Gas costs for V2 swaps
pub mod gas {
    /// Cost of a single-pair swap
    pub const BASE_SWAP_COST: u64 = 135_000;

    /// Added for every pair after the first
    pub const COST_PER_EXTRA_HOP: u64 = 50_000;
}
