//! Error types for the router

use thiserror::Error;

use crate::types::ChainId;

/// Core errors that can occur while routing
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures reported by external data providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {name}")]
    Unavailable { name: String },

    #[error("Provider returned an invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Provider call failed: {0}")]
    Call(#[from] anyhow::Error),
}

/// Fatal caller-input errors; these abort the request
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Amounts must have at least one amount and must be same token")]
    InvalidAmounts,

    #[error("Gas price is required to quote {protocol} routes")]
    MissingGasPrice { protocol: &'static str },

    #[error("Gas model is required to quote {protocol} routes")]
    MissingGasModel { protocol: &'static str },

    #[error("Could not find a USD/{native} pool for computing gas costs on {chain}")]
    NoUsdPool { chain: ChainId, native: String },

    #[error("Chain {chain} is not supported: {reason}")]
    UnsupportedChain { chain: ChainId, reason: String },

    #[error("Unsupported trade type: {0}")]
    UnsupportedTradeType(String),

    #[error("Unsupported swap type: {0}")]
    UnsupportedSwapType(String),

    #[error("Unsupported fee tier: {0}")]
    UnsupportedFeeTier(String),

    #[error("Invalid pool: {message}")]
    InvalidPool { message: String },

    #[error("Invalid calldata: {message}")]
    InvalidCalldata { message: String },
}

/// Arithmetic errors on exact amounts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Denominator must be non-zero")]
    ZeroDenominator,

    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, Error>;

impl RoutingError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmounts => "invalid_amounts",
            Self::MissingGasPrice { .. } => "missing_gas_price",
            Self::MissingGasModel { .. } => "missing_gas_model",
            Self::NoUsdPool { .. } => "no_usd_pool",
            Self::UnsupportedChain { .. } => "unsupported_chain",
            Self::UnsupportedTradeType(_) => "unsupported_trade_type",
            Self::UnsupportedSwapType(_) => "unsupported_swap_type",
            Self::UnsupportedFeeTier(_) => "unsupported_fee_tier",
            Self::InvalidPool { .. } => "invalid_pool",
            Self::InvalidCalldata { .. } => "invalid_calldata",
        }
    }
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider_error",
            Self::Routing(e) => e.error_code(),
            Self::Amount(_) => "amount_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Wrap an arbitrary provider failure
    pub fn provider(err: impl Into<anyhow::Error>) -> Self {
        Self::Provider(ProviderError::Call(err.into()))
    }
}
