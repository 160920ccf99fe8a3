//! Pool state providers
//!
//! Providers load on-chain state for a batch of token pairs and hand back an
//! accessor keyed by the sorted pair (and fee tier for V3). Address
//! derivation is pure and never touches the network.

use std::collections::HashMap;
use std::sync::RwLock;

use amm_v2::{compute_pair_address, PairAddress, V2Pool};
use amm_v3::{compute_pool_address, FeeAmount, PoolAddress, V3Pool};
use router_core::{Address, ProviderConfig, ProviderError, Result, Token};

fn sorted_key(token_a: &Token, token_b: &Token) -> (Address, Address) {
    if token_a.sorts_before(token_b) {
        (token_a.address.clone(), token_b.address.clone())
    } else {
        (token_b.address.clone(), token_a.address.clone())
    }
}

// ---------------------------------------------------------------------------
// V2
// ---------------------------------------------------------------------------

/// Loaded V2 pairs
#[derive(Debug, Clone, Default)]
pub struct V2PoolAccessor {
    pools: Vec<V2Pool>,
    index: HashMap<(Address, Address), usize>,
}

impl V2PoolAccessor {
    pub fn new(pools: impl IntoIterator<Item = V2Pool>) -> Self {
        let mut accessor = Self::default();
        for pool in pools {
            let key = sorted_key(&pool.token0, &pool.token1);
            if accessor.index.contains_key(&key) {
                continue;
            }
            accessor.index.insert(key, accessor.pools.len());
            accessor.pools.push(pool);
        }
        accessor
    }

    pub fn get_pool(&self, token_a: &Token, token_b: &Token) -> Option<&V2Pool> {
        self.index
            .get(&sorted_key(token_a, token_b))
            .and_then(|i| self.pools.get(*i))
    }

    /// Pools in load order
    pub fn get_all_pools(&self) -> &[V2Pool] {
        &self.pools
    }
}

#[async_trait::async_trait]
pub trait V2PoolProvider: Send + Sync {
    async fn get_pools(&self, token_pairs: &[(Token, Token)], config: &ProviderConfig) -> Result<V2PoolAccessor>;

    fn get_pool_address(&self, token_a: &Token, token_b: &Token) -> Result<PairAddress> {
        Ok(compute_pair_address(token_a, token_b)?)
    }
}

/// Serves pairs from a fixed, replaceable set
#[derive(Debug, Default)]
pub struct InMemoryV2PoolProvider {
    pools: RwLock<Vec<V2Pool>>,
    requests: RwLock<Vec<Vec<(Token, Token)>>>,
}

impl InMemoryV2PoolProvider {
    pub fn new(pools: Vec<V2Pool>) -> Self {
        Self {
            pools: RwLock::new(pools),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Replace the served state, e.g. after new blocks
    pub fn set_pools(&self, pools: Vec<V2Pool>) {
        if let Ok(mut guard) = self.pools.write() {
            *guard = pools;
        }
    }

    /// Pair batches requested so far
    pub fn requests(&self) -> Vec<Vec<(Token, Token)>> {
        self.requests.read().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl V2PoolProvider for InMemoryV2PoolProvider {
    async fn get_pools(&self, token_pairs: &[(Token, Token)], _config: &ProviderConfig) -> Result<V2PoolAccessor> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(token_pairs.to_vec());
        }
        let pools = self.pools.read().map_err(|_| ProviderError::Unavailable {
            name: "in-memory V2 pools".into(),
        })?;
        let matched = token_pairs.iter().filter_map(|(a, b)| {
            pools
                .iter()
                .find(|pool| pool.involves_token(a) && pool.involves_token(b))
                .cloned()
        });
        Ok(V2PoolAccessor::new(matched))
    }
}

// ---------------------------------------------------------------------------
// V3
// ---------------------------------------------------------------------------

/// Loaded V3 pools
#[derive(Debug, Clone, Default)]
pub struct V3PoolAccessor {
    pools: Vec<V3Pool>,
    index: HashMap<(Address, Address, FeeAmount), usize>,
}

impl V3PoolAccessor {
    pub fn new(pools: impl IntoIterator<Item = V3Pool>) -> Self {
        let mut accessor = Self::default();
        for pool in pools {
            let (a, b) = sorted_key(&pool.token0, &pool.token1);
            let key = (a, b, pool.fee);
            if accessor.index.contains_key(&key) {
                continue;
            }
            accessor.index.insert(key, accessor.pools.len());
            accessor.pools.push(pool);
        }
        accessor
    }

    pub fn get_pool(&self, token_a: &Token, token_b: &Token, fee: FeeAmount) -> Option<&V3Pool> {
        let (a, b) = sorted_key(token_a, token_b);
        self.index.get(&(a, b, fee)).and_then(|i| self.pools.get(*i))
    }

    pub fn get_all_pools(&self) -> &[V3Pool] {
        &self.pools
    }
}

#[async_trait::async_trait]
pub trait V3PoolProvider: Send + Sync {
    async fn get_pools(
        &self,
        token_pairs: &[(Token, Token, FeeAmount)],
        config: &ProviderConfig,
    ) -> Result<V3PoolAccessor>;

    fn get_pool_address(&self, token_a: &Token, token_b: &Token, fee: FeeAmount) -> Result<PoolAddress> {
        Ok(compute_pool_address(token_a, token_b, fee)?)
    }
}

/// Serves pools from a fixed, replaceable set
#[derive(Debug, Default)]
pub struct InMemoryV3PoolProvider {
    pools: RwLock<Vec<V3Pool>>,
    requests: RwLock<Vec<Vec<(Token, Token, FeeAmount)>>>,
}

impl InMemoryV3PoolProvider {
    pub fn new(pools: Vec<V3Pool>) -> Self {
        Self {
            pools: RwLock::new(pools),
            requests: RwLock::new(Vec::new()),
        }
    }

    pub fn set_pools(&self, pools: Vec<V3Pool>) {
        if let Ok(mut guard) = self.pools.write() {
            *guard = pools;
        }
    }

    pub fn requests(&self) -> Vec<Vec<(Token, Token, FeeAmount)>> {
        self.requests.read().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl V3PoolProvider for InMemoryV3PoolProvider {
    async fn get_pools(
        &self,
        token_pairs: &[(Token, Token, FeeAmount)],
        _config: &ProviderConfig,
    ) -> Result<V3PoolAccessor> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(token_pairs.to_vec());
        }
        let pools = self.pools.read().map_err(|_| ProviderError::Unavailable {
            name: "in-memory V3 pools".into(),
        })?;
        let matched = token_pairs.iter().filter_map(|(a, b, fee)| {
            pools
                .iter()
                .find(|pool| pool.fee == *fee && pool.involves_token(a) && pool.involves_token(b))
                .cloned()
        });
        Ok(V3PoolAccessor::new(matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::One;
    use router_core::tokens::known;

    fn make_v3(fee: FeeAmount, liquidity: u64) -> V3Pool {
        V3Pool::new(known::weth_mainnet(), known::usdc_mainnet(), fee, BigInt::one() << 96, liquidity, 0).unwrap()
    }

    #[tokio::test]
    async fn test_v2_accessor_lookup_is_order_independent() {
        let pool = V2Pool::new(known::usdc_mainnet(), 10u64, known::weth_mainnet(), 20u64).unwrap();
        let provider = InMemoryV2PoolProvider::new(vec![pool.clone()]);
        let accessor = provider
            .get_pools(
                &[(known::weth_mainnet(), known::usdc_mainnet()), (known::dai_mainnet(), known::usdc_mainnet())],
                &ProviderConfig::default(),
            )
            .await
            .unwrap();
        assert_eq!(accessor.get_all_pools().len(), 1);
        assert_eq!(accessor.get_pool(&known::usdc_mainnet(), &known::weth_mainnet()), Some(&pool));
        assert!(accessor.get_pool(&known::dai_mainnet(), &known::usdc_mainnet()).is_none());
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_v3_accessor_distinguishes_fee_tiers() {
        let provider = InMemoryV3PoolProvider::new(vec![make_v3(FeeAmount::Low, 5), make_v3(FeeAmount::High, 9)]);
        let weth = known::weth_mainnet();
        let usdc = known::usdc_mainnet();
        let request: Vec<_> = FeeAmount::ALL.iter().map(|f| (weth.clone(), usdc.clone(), *f)).collect();
        let accessor = provider.get_pools(&request, &ProviderConfig::default()).await.unwrap();
        assert_eq!(accessor.get_all_pools().len(), 2);
        assert_eq!(
            accessor.get_pool(&usdc, &weth, FeeAmount::High).map(|p| p.liquidity.clone()),
            Some(BigInt::from(9))
        );
        assert!(accessor.get_pool(&usdc, &weth, FeeAmount::Medium).is_none());
    }

    #[test]
    fn test_pool_address_is_pure() {
        let provider = InMemoryV3PoolProvider::default();
        let a = provider
            .get_pool_address(&known::usdc_mainnet(), &known::weth_mainnet(), FeeAmount::Low)
            .unwrap();
        let b = provider
            .get_pool_address(&known::weth_mainnet(), &known::usdc_mainnet(), FeeAmount::Low)
            .unwrap();
        assert_eq!(a.pool_address, b.pool_address);
    }
}
