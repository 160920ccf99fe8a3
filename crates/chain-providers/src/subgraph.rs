//! Pool discovery records and the discovery provider port
//!
//! Discovery providers return lightweight pool records ranked by a liquidity
//! metric. Addresses are canonicalised to lower case when the records are
//! built or deserialised, so selection code compares them directly.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use router_core::{Address, BlockNumber, Result, Token};

/// Token reference inside a discovery record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphToken {
    pub id: Address,
}

impl SubgraphToken {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self { id: Address::new(id) }
    }
}

/// Common view over V2 and V3 discovery records
pub trait SubgraphPool: Clone + fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> &Address;
    fn token0_id(&self) -> &Address;
    fn token1_id(&self) -> &Address;

    /// Metric pools are ranked by
    fn liquidity_metric(&self) -> f64;

    fn involves(&self, token: &Address) -> bool {
        self.token0_id() == token || self.token1_id() == token
    }

    /// Whether the pool connects `a` and `b` in either order
    fn connects(&self, a: &Address, b: &Address) -> bool {
        (self.token0_id() == a && self.token1_id() == b) || (self.token0_id() == b && self.token1_id() == a)
    }

    fn other_token_id(&self, token: &Address) -> Option<&Address> {
        if self.token0_id() == token {
            Some(self.token1_id())
        } else if self.token1_id() == token {
            Some(self.token0_id())
        } else {
            None
        }
    }
}

/// Constant-product pool as reported by discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2SubgraphPool {
    pub id: Address,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    pub supply: f64,
    /// Reserve in native units; ranking metric
    pub reserve: f64,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: f64,
}

impl SubgraphPool for V2SubgraphPool {
    fn id(&self) -> &Address {
        &self.id
    }

    fn token0_id(&self) -> &Address {
        &self.token0.id
    }

    fn token1_id(&self) -> &Address {
        &self.token1.id
    }

    fn liquidity_metric(&self) -> f64 {
        self.reserve
    }
}

/// Concentrated-liquidity pool as reported by discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V3SubgraphPool {
    pub id: Address,
    pub fee_tier: String,
    pub liquidity: String,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    #[serde(rename = "tvlETH")]
    pub tvl_eth: f64,
    /// Ranking metric
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: f64,
}

impl SubgraphPool for V3SubgraphPool {
    fn id(&self) -> &Address {
        &self.id
    }

    fn token0_id(&self) -> &Address {
        &self.token0.id
    }

    fn token1_id(&self) -> &Address {
        &self.token1.id
    }

    fn liquidity_metric(&self) -> f64 {
        self.tvl_usd
    }
}

/// Discovery port: every known pool relevant to a pair
#[async_trait::async_trait]
pub trait SubgraphProvider<P: SubgraphPool>: Send + Sync {
    async fn get_pools(&self, token_in: &Token, token_out: &Token, block_number: Option<BlockNumber>)
        -> Result<Vec<P>>;
}

/// Serves a fixed pool list regardless of the pair
#[derive(Debug, Clone)]
pub struct InMemorySubgraphProvider<P> {
    pools: Arc<Vec<P>>,
}

impl<P: SubgraphPool> InMemorySubgraphProvider<P> {
    pub fn new(pools: Vec<P>) -> Self {
        Self { pools: Arc::new(pools) }
    }

    /// Load records from a discovery JSON dump
    pub fn from_json(json: &str) -> Result<Self>
    where
        P: for<'de> Deserialize<'de>,
    {
        let pools: Vec<P> = serde_json::from_str(json).map_err(|e| {
            router_core::ProviderError::InvalidResponse {
                message: format!("bad discovery dump: {e}"),
            }
        })?;
        Ok(Self::new(pools))
    }
}

#[async_trait::async_trait]
impl<P: SubgraphPool> SubgraphProvider<P> for InMemorySubgraphProvider<P> {
    async fn get_pools(
        &self,
        _token_in: &Token,
        _token_out: &Token,
        _block_number: Option<BlockNumber>,
    ) -> Result<Vec<P>> {
        Ok(self.pools.as_ref().clone())
    }
}
