//! V3 gas model

use num_bigint::BigInt;

use amm_v3::{gas, V3Route};
use chain_providers::{V2PoolProvider, V3PoolProvider};
use router_core::tokens::wrapped_native;
use router_core::{ChainId, ProviderConfig, Result, Token};

use super::{
    get_highest_liquidity_v3_native_pool, get_highest_liquidity_v3_usd_pool, get_v2_native_pool, GasCostEstimate,
    GasModel, GasPricing, PricingPool,
};

/// Resolve the pools shared by the V3 and mixed models.
///
/// USD pricing always goes through the deepest V3 USD pool. The quote
/// token is priced through its deepest V3 native pool, falling back to the
/// V2 native pair.
pub(crate) async fn build_v3_pricing(
    chain: ChainId,
    gas_price_wei: BigInt,
    v3_pool_provider: &dyn V3PoolProvider,
    v2_pool_provider: &dyn V2PoolProvider,
    quote_token: &Token,
    config: &ProviderConfig,
) -> Result<GasPricing> {
    let usd_pool = get_highest_liquidity_v3_usd_pool(chain, v3_pool_provider, config).await?;
    let native = wrapped_native(chain);

    let native_quote_pool = if quote_token == &native {
        None
    } else if let Some(pool) = get_highest_liquidity_v3_native_pool(quote_token, v3_pool_provider, config).await? {
        Some(PricingPool::V3(pool))
    } else if let Some(pair) = get_v2_native_pool(quote_token, v2_pool_provider, config).await? {
        Some(PricingPool::V2(pair))
    } else {
        tracing::info!(
            "Unable to find {} pool with the quote token, {}, to produce gas adjusted costs. Using amountToken as 0.",
            native,
            quote_token
        );
        None
    };

    Ok(GasPricing {
        chain,
        gas_price_wei,
        quote_token: quote_token.clone(),
        usd_pool: PricingPool::V3(usd_pool),
        native_quote_pool,
        overhead: config.additional_gas_overhead.clone().unwrap_or_default(),
    })
}

/// Tick crossings billed for a route; at least one
pub(crate) fn ticks_crossed(initialized_ticks_crossed: &[u32]) -> u64 {
    initialized_ticks_crossed
        .iter()
        .map(|t| *t as u64)
        .sum::<u64>()
        .max(1)
}

/// Base cost, per-hop cost and per-tick cost plus overhead
#[derive(Debug, Clone)]
pub struct V3GasModel {
    pricing: GasPricing,
}

impl V3GasModel {
    pub async fn build(
        chain: ChainId,
        gas_price_wei: BigInt,
        v3_pool_provider: &dyn V3PoolProvider,
        v2_pool_provider: &dyn V2PoolProvider,
        quote_token: &Token,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let pricing =
            build_v3_pricing(chain, gas_price_wei, v3_pool_provider, v2_pool_provider, quote_token, config).await?;
        Ok(Self { pricing })
    }

    pub fn gas_use(&self, hops: usize, initialized_ticks_crossed: &[u32]) -> BigInt {
        let chain = self.pricing.chain;
        let base = gas::base_swap_cost(chain);
        let hop_gas = gas::cost_per_hop(chain) * hops as u64;
        let tick_gas = gas::cost_per_init_tick(chain) * ticks_crossed(initialized_ticks_crossed);
        BigInt::from(base + hop_gas + tick_gas) + &self.pricing.overhead
    }
}

impl GasModel<V3Route> for V3GasModel {
    fn estimate_gas_cost(&self, route: &V3Route, initialized_ticks_crossed: &[u32]) -> Result<GasCostEstimate> {
        self.pricing
            .estimate(self.gas_use(route.hops(), initialized_ticks_crossed))
    }
}
