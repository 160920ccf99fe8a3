//! Gas accounting for a simulated route
//!
//! Prices a measured gas figure the way quoting prices estimated gas: total
//! wei (including any rollup data-posting fee) as wrapped native, converted
//! to USD and to the quote token, then applied to the route's quote.

use num_bigint::BigInt;
use num_traits::Zero;

use chain_providers::{ArbitrumGasData, L2GasData, OptimismGasData, V2PoolProvider, V3PoolProvider};
use router_core::tokens::wrapped_native;
use router_core::{ChainId, CurrencyAmount, L1FeeModel, ProviderConfig, Result, RoutingError};

use crate::entities::adjust_quote_for_gas;
use crate::gas_models::{
    gas_cost_in_native, gas_cost_in_quote_token, gas_cost_in_usd, get_highest_liquidity_v3_native_pool,
    get_highest_liquidity_v3_usd_pool, get_v2_native_pool, PricingPool,
};
use crate::simulation::SwapRoute;

/// Fixed per-transaction calldata charge: 68 bytes at the non-zero rate
const L1_TX_OVERHEAD_GAS: u64 = 68 * 16;
const ZERO_BYTE_GAS: u64 = 4;
const NON_ZERO_BYTE_GAS: u64 = 16;

/// Gas figures for a route after simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasUsedEstimate {
    pub estimated_gas_used_usd: CurrencyAmount,
    pub estimated_gas_used_quote_token: CurrencyAmount,
    pub quote_gas_adjusted: CurrencyAmount,
}

// ---------------------------------------------------------------------------
// Rollup surcharge
// ---------------------------------------------------------------------------

/// L1 gas to post `calldata`: 4 per zero byte, 16 per other byte, plus overhead
pub fn l1_calldata_gas(calldata: &str, overhead: &BigInt) -> Result<BigInt> {
    let hex_data = calldata.strip_prefix("0x").unwrap_or(calldata);
    let bytes = hex::decode(hex_data).map_err(|e| RoutingError::InvalidCalldata {
        message: e.to_string(),
    })?;
    let count: u64 = bytes
        .iter()
        .map(|b| if *b == 0 { ZERO_BYTE_GAS } else { NON_ZERO_BYTE_GAS })
        .sum();
    Ok(overhead + BigInt::from(count + L1_TX_OVERHEAD_GAS))
}

/// Returns `(l1_gas_used, l1_fee_wei)`
pub fn arbitrum_l1_fee(calldata: &str, gas_data: &ArbitrumGasData) -> Result<(BigInt, BigInt)> {
    let l1_gas_used = l1_calldata_gas(calldata, &BigInt::zero())?;
    let l1_fee = &l1_gas_used * &gas_data.per_l1_calldata_fee + &gas_data.per_l2_tx_fee;
    Ok((l1_gas_used, l1_fee))
}

/// Returns `(l1_gas_used, l1_fee_wei)`
pub fn optimism_l1_fee(calldata: &str, gas_data: &OptimismGasData) -> Result<(BigInt, BigInt)> {
    let l1_gas_used = l1_calldata_gas(calldata, &gas_data.overhead)?;
    let unscaled = &l1_gas_used * &gas_data.l1_base_fee * &gas_data.scalar;
    let scale: BigInt = BigInt::from(10u32).pow(gas_data.decimals);
    Ok((l1_gas_used, unscaled / scale))
}

/// Data-posting surcharge for `route` on `chain`, zero off rollups.
///
/// Missing calldata or gas data that doesn't match the chain's fee model
/// also price to zero, with a warning.
pub fn l2_surcharge(chain: ChainId, route: &SwapRoute, l2_gas_data: Option<&L2GasData>) -> Result<BigInt> {
    let Some(model) = chain.l1_fee_model() else {
        return Ok(BigInt::zero());
    };
    let Some(method_parameters) = &route.method_parameters else {
        tracing::warn!(chain = %chain, "No calldata on route, skipping L1 data fee");
        return Ok(BigInt::zero());
    };
    let calldata = method_parameters.calldata.as_str();

    match (model, l2_gas_data) {
        (L1FeeModel::Arbitrum, Some(L2GasData::Arbitrum(data))) => Ok(arbitrum_l1_fee(calldata, data)?.1),
        (L1FeeModel::Optimism, Some(L2GasData::Optimism(data))) => Ok(optimism_l1_fee(calldata, data)?.1),
        (_, data) => {
            tracing::warn!(
                chain = %chain,
                has_data = data.is_some(),
                "L2 gas data missing or for another fee model, skipping L1 data fee"
            );
            Ok(BigInt::zero())
        }
    }
}

// ---------------------------------------------------------------------------
// Accounting
// ---------------------------------------------------------------------------

/// Price `simulated_gas_used` for `route` and adjust its quote.
///
/// Fails if no wrapped-native/USD V3 pool exists. A missing quote-token
/// pool prices the quote-token cost at zero.
pub async fn calculate_gas_used(
    chain: ChainId,
    route: &SwapRoute,
    simulated_gas_used: &BigInt,
    v2_pool_provider: &dyn V2PoolProvider,
    v3_pool_provider: &dyn V3PoolProvider,
    l2_gas_data: Option<&L2GasData>,
    provider_config: &ProviderConfig,
) -> Result<GasUsedEstimate> {
    let quote_token = route.quote.currency.wrapped();
    let l2_to_l1_fee = l2_surcharge(chain, route, l2_gas_data)?;

    let gas_cost_wei = &route.gas_price_wei * simulated_gas_used + l2_to_l1_fee;
    let native = wrapped_native(chain);
    let cost_native = gas_cost_in_native(chain, gas_cost_wei);

    let usd_pool = get_highest_liquidity_v3_usd_pool(chain, v3_pool_provider, provider_config).await?;
    let estimated_gas_used_usd = gas_cost_in_usd(&PricingPool::V3(usd_pool), &cost_native)?;

    let estimated_gas_used_quote_token = if quote_token == native {
        cost_native
    } else {
        let (v3_pool, v2_pool) = futures::future::try_join(
            get_highest_liquidity_v3_native_pool(&quote_token, v3_pool_provider, provider_config),
            get_v2_native_pool(&quote_token, v2_pool_provider, provider_config),
        )
        .await?;
        match v3_pool.map(PricingPool::V3).or(v2_pool.map(PricingPool::V2)) {
            Some(pool) => gas_cost_in_quote_token(&pool, &cost_native)?,
            None => {
                tracing::info!("Could not find any V2 or V3 pools to convert the cost into the quote token");
                CurrencyAmount::zero(quote_token.into())
            }
        }
    };

    let quote_gas_adjusted =
        adjust_quote_for_gas(&route.quote, &estimated_gas_used_quote_token, route.trade.trade_type)?;

    Ok(GasUsedEstimate {
        estimated_gas_used_usd,
        estimated_gas_used_quote_token,
        quote_gas_adjusted,
    })
}
