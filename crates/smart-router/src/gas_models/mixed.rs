//! Mixed-route gas model
//!
//! Consecutive pools of one family form a section. V3 sections cost the V3
//! base plus a per-pool charge, V2 sections cost the V2 base plus a charge
//! per extra pair. Tick crossings and overhead are added once per route.

use num_bigint::BigInt;

use amm_v2::gas as v2_gas;
use amm_v3::gas as v3_gas;
use chain_providers::{V2PoolProvider, V3PoolProvider};
use router_core::{ChainId, Protocol, ProviderConfig, Result, Token};

use super::v3::{build_v3_pricing, ticks_crossed};
use super::{GasCostEstimate, GasModel, GasPricing};
use crate::routes::{MixedPool, MixedRoute};

#[derive(Debug, Clone)]
pub struct MixedRouteGasModel {
    pricing: GasPricing,
}

impl MixedRouteGasModel {
    /// Priced like the V3 model: V3 USD pool, V3 then V2 quote-token pool
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

    fn section_gas(&self, section: &[MixedPool]) -> u64 {
        let chain = self.pricing.chain;
        let pools = section.len() as u64;
        match section.first().map(MixedPool::protocol) {
            Some(Protocol::V3) => v3_gas::base_swap_cost(chain) + v3_gas::cost_per_hop(chain) * pools,
            Some(_) => v2_gas::BASE_SWAP_COST + v2_gas::COST_PER_EXTRA_HOP * pools.saturating_sub(1),
            None => 0,
        }
    }

    pub fn gas_use(&self, route: &MixedRoute, initialized_ticks_crossed: &[u32]) -> BigInt {
        let sections: u64 = route.sections().into_iter().map(|s| self.section_gas(s)).sum();
        let tick_gas = v3_gas::cost_per_init_tick(self.pricing.chain) * ticks_crossed(initialized_ticks_crossed);
        BigInt::from(sections + tick_gas) + &self.pricing.overhead
    }
}

impl GasModel<MixedRoute> for MixedRouteGasModel {
    fn estimate_gas_cost(&self, route: &MixedRoute, initialized_ticks_crossed: &[u32]) -> Result<GasCostEstimate> {
        self.pricing
            .estimate(self.gas_use(route, initialized_ticks_crossed))
    }
}
