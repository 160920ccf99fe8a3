//! V2 gas model

use num_bigint::BigInt;

use amm_v2::{gas, V2Route};
use chain_providers::V2PoolProvider;
use router_core::tokens::wrapped_native;
use router_core::{ChainId, ProviderConfig, Result, Token};

use super::{
    get_highest_liquidity_v2_usd_pool, get_v2_native_pool, GasCostEstimate, GasModel, GasPricing, PricingPool,
};

/// `135000 + 50000 * (hops - 1)` plus overhead, priced through V2 pairs
#[derive(Debug, Clone)]
pub struct V2GasModel {
    pricing: GasPricing,
    /// No wrapped-native/quote pair: every cost prices to zero
    unpriced: bool,
}

impl V2GasModel {
    /// Load the reference pairs for `quote_token` on `chain`.
    ///
    /// Fails if no wrapped-native/USD pair exists.
    pub async fn build(
        chain: ChainId,
        gas_price_wei: BigInt,
        pool_provider: &dyn V2PoolProvider,
        quote_token: &Token,
        config: &ProviderConfig,
    ) -> Result<Self> {
        let usd_pool = get_highest_liquidity_v2_usd_pool(chain, pool_provider, config).await?;

        let mut unpriced = false;
        let native_quote_pool = if quote_token == &wrapped_native(chain) {
            None
        } else {
            let pool = get_v2_native_pool(quote_token, pool_provider, config).await?;
            if pool.is_none() {
                tracing::info!(
                    "Unable to find {} pool with the quote token, {}, to produce gas adjusted costs. Route will not account for gas.",
                    wrapped_native(chain),
                    quote_token
                );
                unpriced = true;
            }
            pool.map(PricingPool::V2)
        };

        Ok(Self {
            pricing: GasPricing {
                chain,
                gas_price_wei,
                quote_token: quote_token.clone(),
                usd_pool: PricingPool::V2(usd_pool),
                native_quote_pool,
                overhead: config.additional_gas_overhead.clone().unwrap_or_default(),
            },
            unpriced,
        })
    }

    pub fn gas_use(&self, hops: usize) -> BigInt {
        let extra_hops = hops.saturating_sub(1) as u64;
        BigInt::from(gas::BASE_SWAP_COST) + BigInt::from(gas::COST_PER_EXTRA_HOP * extra_hops) + &self.pricing.overhead
    }
}

impl GasModel<V2Route> for V2GasModel {
    fn estimate_gas_cost(&self, route: &V2Route, _initialized_ticks_crossed: &[u32]) -> Result<GasCostEstimate> {
        let gas_use = self.gas_use(route.hops());
        if self.unpriced {
            return self.pricing.zero(gas_use);
        }
        self.pricing.estimate(gas_use)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_models::test_fixtures::*;
    use amm_v2::V2Pool;
    use chain_providers::InMemoryV2PoolProvider;
    use router_core::tokens::known;

    fn make_route(hops: usize) -> V2Route {
        let (dai, weth, usdc) = (known::dai_mainnet(), known::weth_mainnet(), known::usdc_mainnet());
        let mut pairs = vec![V2Pool::new(dai.clone(), 10u64, weth.clone(), 10u64).unwrap()];
        let mut output = weth.clone();
        if hops == 2 {
            pairs.push(V2Pool::new(weth, 10u64, usdc.clone(), 10u64).unwrap());
            output = usdc;
        }
        V2Route::new(pairs, dai, output).unwrap()
    }

    #[tokio::test]
    async fn test_gas_use_per_hop() {
        let provider = InMemoryV2PoolProvider::new(vec![make_usd_v2_pool(), make_dai_v2_pool()]);
        let model = V2GasModel::build(
            ChainId::Mainnet,
            BigInt::from(10),
            &provider,
            &known::dai_mainnet(),
            &ProviderConfig::default(),
        )
        .await
        .unwrap();
        let one = model.estimate_gas_cost(&make_route(1), &[]).unwrap();
        let two = model.estimate_gas_cost(&make_route(2), &[]).unwrap();
        assert_eq!(one.gas_estimate, BigInt::from(135_000));
        assert_eq!(two.gas_estimate, BigInt::from(185_000));

        // 135000 gas * 10 wei = 1.35e6 wei; at 1000 DAI per WETH = 1.35e9 raw DAI
        assert_eq!(one.gas_cost_in_token.quotient(), BigInt::from(1_350_000_000u64));
        assert!(!one.gas_cost_in_usd.is_zero());
    }

    #[tokio::test]
    async fn test_overhead_is_added() {
        let provider = InMemoryV2PoolProvider::new(vec![make_usd_v2_pool(), make_dai_v2_pool()]);
        let config = ProviderConfig {
            block_number: None,
            additional_gas_overhead: Some(BigInt::from(27_938)),
        };
        let model = V2GasModel::build(ChainId::Mainnet, BigInt::from(1), &provider, &known::dai_mainnet(), &config)
            .await
            .unwrap();
        assert_eq!(model.gas_use(1), BigInt::from(162_938));
    }

    #[tokio::test]
    async fn test_missing_quote_pair_prices_to_zero() {
        let provider = InMemoryV2PoolProvider::new(vec![make_usd_v2_pool()]);
        let model = V2GasModel::build(
            ChainId::Mainnet,
            BigInt::from(10),
            &provider,
            &known::dai_mainnet(),
            &ProviderConfig::default(),
        )
        .await
        .unwrap();
        let cost = model.estimate_gas_cost(&make_route(1), &[]).unwrap();
        assert!(cost.gas_cost_in_token.is_zero());
        assert!(cost.gas_cost_in_usd.is_zero());
        assert_eq!(cost.gas_estimate, BigInt::from(135_000));
    }

    #[tokio::test]
    async fn test_weth_quote_uses_native_cost() {
        let provider = InMemoryV2PoolProvider::new(vec![make_usd_v2_pool()]);
        let model = V2GasModel::build(
            ChainId::Mainnet,
            BigInt::from(2),
            &provider,
            &known::weth_mainnet(),
            &ProviderConfig::default(),
        )
        .await
        .unwrap();
        let cost = model.estimate_gas_cost(&make_route(1), &[]).unwrap();
        assert_eq!(cost.gas_cost_in_token.quotient(), BigInt::from(270_000));
        assert_eq!(cost.gas_cost_in_token.currency, known::weth_mainnet().into());
    }
}
