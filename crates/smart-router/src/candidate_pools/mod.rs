//! Candidate pool selection
//!
//! Narrows the discovery provider's pool list for a pair down to a small
//! candidate set. Each heuristic fills one named bucket, and a pool claimed
//! by one bucket is never offered to a later one.

pub mod mixed;
pub mod v2;
pub mod v3;

use std::collections::HashSet;
use std::time::Instant;

use chain_providers::{SubgraphPool, SubgraphProvider, TokenAccessor, TokenListProvider, TokenProvider};
use router_core::{Address, BlockNumber, MetricUnit, MetricsSink, Protocol, Result, RoutingConfig, Token, TradeType};

pub use mixed::{get_mixed_route_candidate_pools, MixedCandidatePools, MixedCandidatePoolsParams, MixedSubgraphPool};
pub use v2::{get_v2_candidate_pools, V2CandidatePools};
pub use v3::{get_v3_candidate_pools, V3CandidatePools};

/// Liquidity assigned to synthesized direct-swap placeholders
pub const PLACEHOLDER_LIQUIDITY: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything one family's selector needs
pub struct CandidatePoolsParams<'a, P: SubgraphPool, PP: ?Sized> {
    pub token_in: &'a Token,
    pub token_out: &'a Token,
    pub trade_type: TradeType,
    pub routing_config: &'a RoutingConfig,
    pub subgraph_provider: &'a dyn SubgraphProvider<P>,
    pub token_provider: &'a dyn TokenProvider,
    pub pool_provider: &'a PP,
    pub blocked_token_list_provider: Option<&'a dyn TokenListProvider>,
    pub metrics: &'a dyn MetricsSink,
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Pools chosen by each heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePoolSelections<P> {
    pub top_by_base_with_token_in: Vec<P>,
    pub top_by_base_with_token_out: Vec<P>,
    pub top_by_direct_swap_pool: Vec<P>,
    pub top_by_eth_quote_token_pool: Vec<P>,
    pub top_by_tvl: Vec<P>,
    pub top_by_tvl_using_token_in: Vec<P>,
    pub top_by_tvl_using_token_out: Vec<P>,
    pub top_by_tvl_using_token_in_second_hops: Vec<P>,
    pub top_by_tvl_using_token_out_second_hops: Vec<P>,
}

impl<P> Default for CandidatePoolSelections<P> {
    fn default() -> Self {
        Self {
            top_by_base_with_token_in: Vec::new(),
            top_by_base_with_token_out: Vec::new(),
            top_by_direct_swap_pool: Vec::new(),
            top_by_eth_quote_token_pool: Vec::new(),
            top_by_tvl: Vec::new(),
            top_by_tvl_using_token_in: Vec::new(),
            top_by_tvl_using_token_out: Vec::new(),
            top_by_tvl_using_token_in_second_hops: Vec::new(),
            top_by_tvl_using_token_out_second_hops: Vec::new(),
        }
    }
}

impl<P: SubgraphPool> CandidatePoolSelections<P> {
    /// Buckets with their names, in union order
    pub fn buckets(&self) -> [(&'static str, &[P]); 9] {
        [
            ("topByBaseWithTokenIn", self.top_by_base_with_token_in.as_slice()),
            ("topByBaseWithTokenOut", self.top_by_base_with_token_out.as_slice()),
            ("topByDirectSwapPool", self.top_by_direct_swap_pool.as_slice()),
            ("topByEthQuoteTokenPool", self.top_by_eth_quote_token_pool.as_slice()),
            ("topByTVL", self.top_by_tvl.as_slice()),
            ("topByTVLUsingTokenIn", self.top_by_tvl_using_token_in.as_slice()),
            ("topByTVLUsingTokenOut", self.top_by_tvl_using_token_out.as_slice()),
            ("topByTVLUsingTokenInSecondHops", self.top_by_tvl_using_token_in_second_hops.as_slice()),
            ("topByTVLUsingTokenOutSecondHops", self.top_by_tvl_using_token_out_second_hops.as_slice()),
        ]
    }

    /// Every selected pool once, in bucket order
    pub fn union(&self) -> Vec<P> {
        let mut seen = HashSet::new();
        self.buckets()
            .into_iter()
            .flat_map(|(_, pools)| pools.iter())
            .filter(|pool| seen.insert(pool.id().clone()))
            .cloned()
            .collect()
    }

    /// Rebuild every bucket through `f`
    pub fn map_buckets<Q>(&self, mut f: impl FnMut(&str, &[P]) -> Vec<Q>) -> CandidatePoolSelections<Q> {
        CandidatePoolSelections {
            top_by_base_with_token_in: f("topByBaseWithTokenIn", &self.top_by_base_with_token_in),
            top_by_base_with_token_out: f("topByBaseWithTokenOut", &self.top_by_base_with_token_out),
            top_by_direct_swap_pool: f("topByDirectSwapPool", &self.top_by_direct_swap_pool),
            top_by_eth_quote_token_pool: f("topByEthQuoteTokenPool", &self.top_by_eth_quote_token_pool),
            top_by_tvl: f("topByTVL", &self.top_by_tvl),
            top_by_tvl_using_token_in: f("topByTVLUsingTokenIn", &self.top_by_tvl_using_token_in),
            top_by_tvl_using_token_out: f("topByTVLUsingTokenOut", &self.top_by_tvl_using_token_out),
            top_by_tvl_using_token_in_second_hops: f(
                "topByTVLUsingTokenInSecondHops",
                &self.top_by_tvl_using_token_in_second_hops,
            ),
            top_by_tvl_using_token_out_second_hops: f(
                "topByTVLUsingTokenOutSecondHops",
                &self.top_by_tvl_using_token_out_second_hops,
            ),
        }
    }
}

/// Tagged bucket breakdown for one family
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePoolsBySelection<P> {
    pub protocol: Protocol,
    pub selections: CandidatePoolSelections<P>,
}

// ---------------------------------------------------------------------------
// Seen-pool accumulator
// ---------------------------------------------------------------------------

/// Pool ids already claimed by an earlier heuristic
#[derive(Debug, Default, Clone)]
pub struct SeenPools {
    ids: HashSet<Address>,
}

impl SeenPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &Address) -> bool {
        self.ids.contains(id)
    }

    /// Mark one id; false if it was already claimed
    pub fn insert(&mut self, id: Address) -> bool {
        self.ids.insert(id)
    }

    pub fn claim<P: SubgraphPool>(&mut self, pools: &[P]) {
        for pool in pools {
            self.ids.insert(pool.id().clone());
        }
    }

    /// Up to `limit` unclaimed pools matching `pred`, in list order, claimed
    pub fn take<P: SubgraphPool>(&mut self, pools: &[P], limit: usize, pred: impl Fn(&P) -> bool) -> Vec<P> {
        let taken: Vec<P> = pools
            .iter()
            .filter(|pool| !self.contains(pool.id()) && pred(pool))
            .take(limit)
            .cloned()
            .collect();
        self.claim(&taken);
        taken
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shared steps
// ---------------------------------------------------------------------------

/// Sort by liquidity metric, descending; ties keep provider order
pub(crate) fn sort_by_liquidity<P: SubgraphPool>(pools: &mut [P]) {
    pools.sort_by(|a, b| b.liquidity_metric().total_cmp(&a.liquidity_metric()));
}

/// Whether either token is blocked. Lookup failures count as not blocked.
pub(crate) async fn is_blocked<P: SubgraphPool>(blocklist: Option<&dyn TokenListProvider>, pool: &P) -> bool {
    let Some(blocklist) = blocklist else {
        return false;
    };
    let (token0, token1) = futures::join!(
        blocklist.has_token_by_address(pool.token0_id()),
        blocklist.has_token_by_address(pool.token1_id())
    );
    let lookup = |result: Result<bool>, token: &Address| match result {
        Ok(blocked) => blocked,
        Err(e) => {
            tracing::warn!(token = %token, error = %e, "blocklist lookup failed, treating token as allowed");
            false
        }
    };
    lookup(token0, pool.token0_id()) || lookup(token1, pool.token1_id())
}

/// Drop pools with a blocked token
pub(crate) async fn filter_blocked<P: SubgraphPool>(pools: Vec<P>, blocklist: Option<&dyn TokenListProvider>) -> Vec<P> {
    if blocklist.is_none() {
        return pools;
    }
    let mut kept = Vec::with_capacity(pools.len());
    for pool in pools {
        if !is_blocked(blocklist, &pool).await {
            kept.push(pool);
        }
    }
    kept
}

/// Resolve metadata for every token the pools touch
pub(crate) async fn resolve_tokens<P: SubgraphPool>(
    pools: &[P],
    token_provider: &dyn TokenProvider,
    block_number: Option<BlockNumber>,
) -> Result<TokenAccessor> {
    let mut seen = HashSet::new();
    let addresses: Vec<Address> = pools
        .iter()
        .flat_map(|pool| [pool.token0_id(), pool.token1_id()])
        .filter(|addr| seen.insert((*addr).clone()))
        .cloned()
        .collect();
    token_provider.get_tokens(&addresses, block_number).await
}

/// `SYM0/SYM1`, falling back to addresses for unknown tokens
pub(crate) fn pair_label<P: SubgraphPool>(tokens: &TokenAccessor, pool: &P) -> String {
    let symbol = |addr: &Address| {
        tokens
            .get_token_by_address(addr)
            .map(|t| t.display_symbol().to_string())
            .unwrap_or_else(|| addr.to_string())
    };
    format!("{}/{}", symbol(pool.token0_id()), symbol(pool.token1_id()))
}

/// Log each bucket as a list of labels
pub(crate) fn log_selections<P: SubgraphPool>(
    protocol: Protocol,
    selections: &CandidatePoolSelections<P>,
    label: impl Fn(&P) -> String,
) {
    for (name, pools) in selections.buckets() {
        let labels: Vec<String> = pools.iter().map(&label).collect();
        tracing::info!(protocol = %protocol, bucket = name, pools = ?labels, "candidate pools");
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

pub(crate) fn put_elapsed(metrics: &dyn MetricsSink, name: &str, start: Instant) {
    metrics.put_metric(name, elapsed_ms(start), MetricUnit::Milliseconds);
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chain_providers::{SubgraphToken, V2SubgraphPool, V3SubgraphPool};
    use router_core::Address;

    pub fn make_v2_subgraph(id: &str, token0: &Address, token1: &Address, reserve: f64) -> V2SubgraphPool {
        V2SubgraphPool {
            id: Address::new(id),
            token0: SubgraphToken::new(token0.as_str()),
            token1: SubgraphToken::new(token1.as_str()),
            supply: reserve,
            reserve,
            reserve_usd: reserve,
        }
    }

    pub fn make_v3_subgraph(id: &str, token0: &Address, token1: &Address, fee: &str, tvl_usd: f64) -> V3SubgraphPool {
        V3SubgraphPool {
            id: Address::new(id),
            fee_tier: fee.to_string(),
            liquidity: "1000".to_string(),
            token0: SubgraphToken::new(token0.as_str()),
            token1: SubgraphToken::new(token1.as_str()),
            tvl_eth: tvl_usd,
            tvl_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;
    use chain_providers::{InMemoryBlocklist, V3SubgraphPool};
    use router_core::tokens::known;

    fn make_pools() -> Vec<V3SubgraphPool> {
        let (usdc, weth, dai) = (
            known::usdc_mainnet().address,
            known::weth_mainnet().address,
            known::dai_mainnet().address,
        );
        vec![
            make_v3_subgraph("0x01", &usdc, &weth, "500", 10.0),
            make_v3_subgraph("0x02", &dai, &weth, "3000", 30.0),
            make_v3_subgraph("0x03", &usdc, &dai, "100", 20.0),
        ]
    }

    #[test]
    fn test_sort_by_liquidity_descending() {
        let mut pools = make_pools();
        sort_by_liquidity(&mut pools);
        let ids: Vec<&str> = pools.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["0x02", "0x03", "0x01"]);
    }

    #[test]
    fn test_seen_pools_take_skips_claimed() {
        let pools = make_pools();
        let mut seen = SeenPools::new();
        let first = seen.take(&pools, 1, |_| true);
        let second = seen.take(&pools, 5, |_| true);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert!(!second.iter().any(|p| p.id == first[0].id));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_union_dedups_in_bucket_order() {
        let pools = make_pools();
        let selections = CandidatePoolSelections {
            top_by_tvl: vec![pools[1].clone(), pools[0].clone()],
            top_by_direct_swap_pool: vec![pools[0].clone()],
            ..Default::default()
        };
        let union = selections.union();
        let ids: Vec<&str> = union.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["0x01", "0x02"]);
    }

    #[tokio::test]
    async fn test_filter_blocked() {
        let blocklist = InMemoryBlocklist::new(vec![known::dai_mainnet().address]);
        let kept = filter_blocked(make_pools(), Some(&blocklist)).await;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_str(), "0x01");

        let kept = filter_blocked(make_pools(), None).await;
        assert_eq!(kept.len(), 3);
    }
}
