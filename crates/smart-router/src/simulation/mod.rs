//! Route simulation
//!
//! A [`Simulator`] takes an assembled [`SwapRoute`] and decides whether it
//! can run: the sender must hold enough of the input currency and have
//! approved the router, then a backend measures gas for the prepared
//! transaction. Every outcome is reported as a [`SimulationStatus`] on the
//! returned route; only accounting failures surface as errors.

pub mod eth_estimate;
pub mod full_simulation;

use std::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use chain_providers::{ChainProvider, L2GasData, TransactionRequest, V2PoolProvider, V3PoolProvider};
use router_core::{Address, BlockNumber, ChainId, Currency, CurrencyAmount, ProviderConfig, Result, TradeType};

use crate::entities::RouteWithValidQuote;
use crate::gas_accounting::calculate_gas_used;

pub use eth_estimate::EthEstimateGasSimulator;
pub use full_simulation::FullSimulationSimulator;

/// Permit2 is deployed at the same address on every chain
pub const PERMIT2_ADDRESS: &str = "0x000000000022D473030F116dDEE9F6B43aC78BA3";

pub const SWAP_ROUTER_02_ADDRESS: &str = "0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45";
const SWAP_ROUTER_02_ADDRESS_BASE: &str = "0x2626664c2603336E57B271c5C0b26F421741e481";
const SWAP_ROUTER_02_ADDRESS_BNB: &str = "0xB971eF87ede563556b2ED4b1C0b0019111Dd85d2";

pub fn permit2_address() -> Address {
    Address::new(PERMIT2_ADDRESS)
}

pub fn swap_router_02_address(chain: ChainId) -> Address {
    match chain {
        ChainId::Base => Address::new(SWAP_ROUTER_02_ADDRESS_BASE),
        ChainId::Bnb => Address::new(SWAP_ROUTER_02_ADDRESS_BNB),
        _ => Address::new(SWAP_ROUTER_02_ADDRESS),
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of simulating a route.
///
/// Starts at `Unattempted`; the other four are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimulationStatus {
    #[default]
    Unattempted,
    Succeeded,
    Failed,
    NotApproved,
    InsufficientBalance,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unattempted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unattempted => "unattempted",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotApproved => "not_approved",
            Self::InsufficientBalance => "insufficient_balance",
        }
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Router contract the calldata targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    UniversalRouter,
    #[serde(rename = "SWAP_ROUTER_02")]
    SwapRouter02,
}

impl SwapType {
    /// Contract the sender must have approved for ERC-20 input
    pub fn approval_spender(&self, chain: ChainId) -> Address {
        match self {
            Self::UniversalRouter => permit2_address(),
            Self::SwapRouter02 => swap_router_02_address(chain),
        }
    }
}

/// Encoded call for the chosen router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameters {
    /// `0x`-prefixed hex
    pub calldata: String,
    pub value: BigInt,
    pub to: Address,
}

impl MethodParameters {
    /// Native value is attached only when the swap spends the native currency
    pub fn to_transaction(&self, from: Address, currency_in: &Currency) -> TransactionRequest {
        let value = if currency_in.is_native() {
            self.value.clone()
        } else {
            BigInt::zero()
        };
        TransactionRequest {
            data: self.calldata.clone(),
            to: self.to.clone(),
            from,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
    pub trade_type: TradeType,
}

/// A fully assembled route, ready for simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    pub quote: CurrencyAmount,
    pub quote_gas_adjusted: CurrencyAmount,
    pub estimated_gas_used: BigInt,
    pub estimated_gas_used_quote_token: CurrencyAmount,
    pub estimated_gas_used_usd: CurrencyAmount,
    pub gas_price_wei: BigInt,
    pub trade: Trade,
    pub route: Vec<RouteWithValidQuote>,
    pub block_number: BlockNumber,
    pub method_parameters: Option<MethodParameters>,
    pub simulation_status: SimulationStatus,
}

impl SwapRoute {
    /// Record an outcome. Once terminal, the status never changes again.
    pub fn with_status(mut self, status: SimulationStatus) -> Self {
        if self.simulation_status.is_terminal() {
            tracing::warn!(
                current = %self.simulation_status,
                requested = %status,
                "Ignoring status change on an already simulated route"
            );
            return self;
        }
        self.simulation_status = status;
        self
    }
}

/// Scale a gas figure by `multiplier` in integer arithmetic:
/// `gas * (multiplier * 100) / 100`
pub fn adjust_gas_estimate(gas: &BigInt, multiplier: f64) -> BigInt {
    let factor = match (multiplier * 100.0).round().to_i64() {
        Some(factor) if factor > 0 => factor,
        _ => {
            tracing::warn!(multiplier, "Unusable gas estimate multiplier, using the raw estimate");
            100
        }
    };
    gas * BigInt::from(factor) / BigInt::from(100)
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Balance and approval gating around a backend-specific pre-execution
#[async_trait::async_trait]
pub trait Simulator: Send + Sync {
    fn chain(&self) -> ChainId;

    fn chain_provider(&self) -> &dyn ChainProvider;

    /// Measure gas for `route` and account for it. Estimation failures are
    /// reported as [`SimulationStatus::Failed`].
    async fn simulate_transaction(
        &self,
        from: &Address,
        swap_type: SwapType,
        route: SwapRoute,
        l2_gas_data: Option<&L2GasData>,
        provider_config: &ProviderConfig,
    ) -> Result<SwapRoute>;

    async fn simulate(
        &self,
        from: &Address,
        swap_type: SwapType,
        route: SwapRoute,
        l2_gas_data: Option<&L2GasData>,
        provider_config: &ProviderConfig,
    ) -> Result<SwapRoute> {
        if !has_sufficient_balance(self.chain_provider(), from, &route.trade.input_amount).await {
            tracing::error!(
                from = %from,
                needed = %route.trade.input_amount,
                "Sender has insufficient balance to simulate"
            );
            return Ok(route.with_status(SimulationStatus::InsufficientBalance));
        }

        if !is_token_approved(self.chain(), self.chain_provider(), from, &route.trade.input_amount, swap_type).await {
            tracing::error!(
                from = %from,
                swap_type = ?swap_type,
                "Token not approved, skipping simulation"
            );
            return Ok(route.with_status(SimulationStatus::NotApproved));
        }

        self.simulate_transaction(from, swap_type, route, l2_gas_data, provider_config)
            .await
    }
}

/// `false` when the balance can't be read
pub async fn has_sufficient_balance(provider: &dyn ChainProvider, from: &Address, needed: &CurrencyAmount) -> bool {
    match provider.balance_of(&needed.currency, from).await {
        Ok(balance) => balance >= needed.quotient(),
        Err(e) => {
            tracing::error!(from = %from, error = %e, "Error while checking balance");
            false
        }
    }
}

/// Native input needs no approval. `false` when the allowance can't be read.
pub async fn is_token_approved(
    chain: ChainId,
    provider: &dyn ChainProvider,
    from: &Address,
    input_amount: &CurrencyAmount,
    swap_type: SwapType,
) -> bool {
    let Currency::Token(token) = &input_amount.currency else {
        return true;
    };
    let spender = swap_type.approval_spender(chain);
    match provider.allowance(token, from, &spender).await {
        Ok(allowance) => {
            let approved = allowance >= input_amount.quotient();
            tracing::debug!(
                token = %token,
                spender = %spender,
                allowance = %allowance,
                approved,
                "Checked router allowance"
            );
            approved
        }
        Err(e) => {
            tracing::error!(token = %token, error = %e, "Error while checking allowance");
            false
        }
    }
}

/// Fill in gas figures from a measured `gas_used` and mark the route succeeded.
///
/// Only the route-level totals change. The trade and the per-route entries in
/// `route.route` keep the gas figures computed at quote time.
pub(crate) async fn apply_gas_used(
    chain: ChainId,
    route: SwapRoute,
    gas_used: BigInt,
    v2_pool_provider: &dyn V2PoolProvider,
    v3_pool_provider: &dyn V3PoolProvider,
    l2_gas_data: Option<&L2GasData>,
    provider_config: &ProviderConfig,
) -> Result<SwapRoute> {
    let used = calculate_gas_used(
        chain,
        &route,
        &gas_used,
        v2_pool_provider,
        v3_pool_provider,
        l2_gas_data,
        provider_config,
    )
    .await?;

    let route = SwapRoute {
        estimated_gas_used: gas_used,
        estimated_gas_used_quote_token: used.estimated_gas_used_quote_token,
        estimated_gas_used_usd: used.estimated_gas_used_usd,
        quote_gas_adjusted: used.quote_gas_adjusted,
        ..route
    };
    Ok(route.with_status(SimulationStatus::Succeeded))
}
