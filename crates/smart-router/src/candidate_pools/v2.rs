//! Constant-product candidate selection
//!
//! V2 discovery returns far more pools than V3, so selection walks the
//! reserve-sorted list once, filling every first-hop bucket in the same pass
//! and stopping as soon as all of them are full. A second pass fills the
//! second-hop buckets.

use std::collections::HashSet;
use std::time::Instant;

use chain_providers::{SubgraphPool, SubgraphToken, TokenListProvider, V2PoolAccessor, V2PoolProvider, V2SubgraphPool};
use router_core::metrics::names;
use router_core::tokens::{base_tokens, wrapped_native};
use router_core::{Address, MetricUnit, Protocol, ProtocolPoolSelection, Result, Token, TradeType};

use super::{
    is_blocked, log_selections, pair_label, put_elapsed, resolve_tokens, sort_by_liquidity, CandidatePoolSelections,
    CandidatePoolsBySelection, CandidatePoolsParams, SeenPools, PLACEHOLDER_LIQUIDITY,
};

/// Result of V2 candidate selection
#[derive(Debug, Clone)]
pub struct V2CandidatePools {
    pub pool_accessor: V2PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelection<V2SubgraphPool>,
    pub subgraph_pools: Vec<V2SubgraphPool>,
}

/// Pools collected for one key, up to a target count
#[derive(Debug, Clone)]
struct SubcategoryPools {
    pools: Vec<V2SubgraphPool>,
    needed: usize,
}

impl SubcategoryPools {
    fn new(needed: usize) -> Self {
        Self {
            pools: Vec::new(),
            needed,
        }
    }

    fn has_enough_pools(&self) -> bool {
        self.pools.len() >= self.needed
    }
}

/// Insertion-ordered map from token to its subcategory
#[derive(Debug, Default)]
struct SubcategoryMap {
    entries: Vec<(Address, SubcategoryPools)>,
}

impl SubcategoryMap {
    fn get_mut(&mut self, token: &Address) -> Option<&mut SubcategoryPools> {
        self.entries.iter_mut().find(|(t, _)| t == token).map(|(_, pools)| pools)
    }

    fn insert_if_absent(&mut self, token: Address, needed: usize) {
        if !self.entries.iter().any(|(t, _)| *t == token) {
            self.entries.push((token, SubcategoryPools::new(needed)));
        }
    }

    fn all_full(&self) -> bool {
        self.entries.iter().all(|(_, pools)| pools.has_enough_pools())
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Try the pool against `token`'s subcategory; true if it was taken
    fn offer(&mut self, token: &Address, pool: &V2SubgraphPool) -> bool {
        match self.get_mut(token) {
            Some(entry) if !entry.has_enough_pools() => {
                entry.pools.push(pool.clone());
                true
            }
            _ => false,
        }
    }

    fn into_pools(self) -> Vec<V2SubgraphPool> {
        self.entries.into_iter().flat_map(|(_, entry)| entry.pools).collect()
    }
}

/// Running state of the first pass
struct FirstPass<'a> {
    token_in: &'a Address,
    token_out: &'a Address,
    native: Address,
    trade_type: TradeType,
    selection: &'a ProtocolPoolSelection,
    base_in: SubcategoryMap,
    base_out: SubcategoryMap,
    base_in_found: usize,
    base_out_found: usize,
    eth_quote_needed: usize,
    eth_quote_found: bool,
    eth_quote: Vec<V2SubgraphPool>,
    top_by_tvl: Vec<V2SubgraphPool>,
    token_in_bucket: Vec<V2SubgraphPool>,
    token_out_bucket: Vec<V2SubgraphPool>,
    /// First hops from token in, base pools included
    token_in_hops: Vec<V2SubgraphPool>,
    token_out_hops: Vec<V2SubgraphPool>,
}

impl FirstPass<'_> {
    fn is_satisfied(&self) -> bool {
        let limit = self.selection.top_n_with_base_token;
        self.base_in_found >= limit
            && self.base_out_found >= limit
            && (self.eth_quote_found || self.eth_quote_needed == 0)
            && self.top_by_tvl.len() >= self.selection.top_n
            && self.token_in_hops.len() >= self.selection.top_n_token_in_out
            && self.token_out_hops.len() >= self.selection.top_n_token_in_out
    }

    /// Base token on `pool` paired with `token`, excluding `other_side`
    fn base_pairing(&self, pool: &V2SubgraphPool, map: &SubcategoryMap, token: &Address, other_side: &Address) -> Option<Address> {
        let base = pool.other_token_id(token)?;
        if base == other_side || !map.entries.iter().any(|(t, _)| t == base) {
            return None;
        }
        Some(base.clone())
    }

    /// Offer one unclaimed pool to the buckets in precedence order
    fn offer(&mut self, pool: &V2SubgraphPool) -> bool {
        let top_n_token_in_out = self.selection.top_n_token_in_out;

        if self.base_in_found < self.selection.top_n_with_base_token {
            if let Some(base) = self.base_pairing(pool, &self.base_in, self.token_in, self.token_out) {
                if self.base_in.offer(&base, pool) {
                    self.base_in_found += 1;
                    if self.token_in_hops.len() < top_n_token_in_out {
                        self.token_in_hops.push(pool.clone());
                    }
                    if self.trade_type == TradeType::ExactOutput && base == self.native {
                        self.eth_quote_found = true;
                    }
                    return true;
                }
            }
        }

        if self.base_out_found < self.selection.top_n_with_base_token {
            if let Some(base) = self.base_pairing(pool, &self.base_out, self.token_out, self.token_in) {
                if self.base_out.offer(&base, pool) {
                    self.base_out_found += 1;
                    if self.token_out_hops.len() < top_n_token_in_out {
                        self.token_out_hops.push(pool.clone());
                    }
                    if self.trade_type == TradeType::ExactInput && base == self.native {
                        self.eth_quote_found = true;
                    }
                    return true;
                }
            }
        }

        if !self.eth_quote_found && self.eth_quote_needed > 0 {
            let target = match self.trade_type {
                TradeType::ExactInput => self.token_out,
                TradeType::ExactOutput => self.token_in,
            };
            if pool.connects(&self.native, target) {
                self.eth_quote.push(pool.clone());
                self.eth_quote_found = true;
                return true;
            }
        }

        if self.top_by_tvl.len() < self.selection.top_n {
            self.top_by_tvl.push(pool.clone());
            return true;
        }

        if self.token_in_hops.len() < top_n_token_in_out && pool.involves(self.token_in) {
            self.token_in_bucket.push(pool.clone());
            self.token_in_hops.push(pool.clone());
            return true;
        }

        if self.token_out_hops.len() < top_n_token_in_out && pool.involves(self.token_out) {
            self.token_out_bucket.push(pool.clone());
            self.token_out_hops.push(pool.clone());
            return true;
        }

        false
    }
}

/// Second-hop subcategories for each first hop out of `from`
fn second_hop_map(first_hops: &[V2SubgraphPool], from: &Address, selection: &ProtocolPoolSelection) -> SubcategoryMap {
    let mut map = SubcategoryMap::default();
    for pool in first_hops {
        let Some(hop) = pool.other_token_id(from) else {
            continue;
        };
        if selection.avoids_second_hop(hop) {
            continue;
        }
        map.insert_if_absent(hop.clone(), selection.second_hop_limit(hop));
    }
    map
}

/// Records blocked pools in `blocked` so each is looked up once
async fn unblocked(
    blocklist: Option<&dyn TokenListProvider>,
    pool: &V2SubgraphPool,
    blocked: &mut HashSet<Address>,
) -> bool {
    if blocked.contains(&pool.id) {
        return false;
    }
    if is_blocked(blocklist, pool).await {
        blocked.insert(pool.id.clone());
        return false;
    }
    true
}

/// Select V2 candidate pools for `token_in -> token_out`
pub async fn get_v2_candidate_pools(
    params: CandidatePoolsParams<'_, V2SubgraphPool, dyn V2PoolProvider>,
) -> Result<V2CandidatePools> {
    let CandidatePoolsParams {
        token_in,
        token_out,
        trade_type,
        routing_config,
        subgraph_provider,
        token_provider,
        pool_provider,
        blocked_token_list_provider,
        metrics,
    } = params;
    let selection = &routing_config.v2_pool_selection;
    let block_number = routing_config.block_number;
    let chain = token_in.chain;

    let before_subgraph = Instant::now();
    let mut sorted = subgraph_provider.get_pools(token_in, token_out, block_number).await?;
    put_elapsed(metrics, names::V2_SUBGRAPH_POOLS_LOAD, before_subgraph);
    tracing::info!(count = sorted.len(), "got all pools from V2 subgraph provider");

    let before_filter = Instant::now();
    sort_by_liquidity(&mut sorted);

    let mut seen = SeenPools::new();
    let mut selections = CandidatePoolSelections::default();

    // The direct pair is always considered, even if discovery lacks it
    if selection.top_n_direct_swaps > 0 {
        let pair = pool_provider.get_pool_address(token_in, token_out)?;
        seen.insert(pair.pool_address.clone());
        selections.top_by_direct_swap_pool.push(V2SubgraphPool {
            id: pair.pool_address,
            token0: SubgraphToken::new(pair.token0.address.as_str()),
            token1: SubgraphToken::new(pair.token1.address.as_str()),
            supply: PLACEHOLDER_LIQUIDITY,
            reserve: PLACEHOLDER_LIQUIDITY,
            reserve_usd: PLACEHOLDER_LIQUIDITY,
        });
    }

    let eth_quote_needed = match token_out.symbol.as_deref() {
        Some("WETH") | Some("WETH9") | Some("ETH") => 0,
        _ => 1,
    };

    let mut pass = FirstPass {
        token_in: &token_in.address,
        token_out: &token_out.address,
        native: wrapped_native(chain).address,
        trade_type,
        selection,
        base_in: SubcategoryMap::default(),
        base_out: SubcategoryMap::default(),
        base_in_found: 0,
        base_out_found: 0,
        eth_quote_needed,
        eth_quote_found: false,
        eth_quote: Vec::new(),
        top_by_tvl: Vec::new(),
        token_in_bucket: Vec::new(),
        token_out_bucket: Vec::new(),
        token_in_hops: Vec::new(),
        token_out_hops: Vec::new(),
    };
    for base in base_tokens(chain) {
        pass.base_in.insert_if_absent(base.address.clone(), selection.top_n_with_each_base_token);
        pass.base_out.insert_if_absent(base.address, selection.top_n_with_each_base_token);
    }

    let mut blocked = HashSet::new();
    let mut loops_in_first_iteration = 0u64;
    for pool in &sorted {
        loops_in_first_iteration += 1;
        if pass.is_satisfied() {
            break;
        }
        if seen.contains(pool.id()) || !unblocked(blocked_token_list_provider, pool, &mut blocked).await {
            continue;
        }
        if pass.offer(pool) {
            seen.insert(pool.id.clone());
        }
    }
    metrics.put_metric(names::V2_SUBGRAPH_LOOPS_FIRST, loops_in_first_iteration, MetricUnit::Count);

    let mut token_in_second_hops = second_hop_map(&pass.token_in_hops, &token_in.address, selection);
    let mut token_out_second_hops = second_hop_map(&pass.token_out_hops, &token_out.address, selection);

    let mut loops_in_second_iteration = 0u64;
    if !token_in_second_hops.is_empty() || !token_out_second_hops.is_empty() {
        for pool in &sorted {
            loops_in_second_iteration += 1;
            if token_in_second_hops.all_full() && token_out_second_hops.all_full() {
                break;
            }
            if seen.contains(pool.id()) || !unblocked(blocked_token_list_provider, pool, &mut blocked).await {
                continue;
            }
            let taken = token_in_second_hops.offer(pool.token0_id(), pool)
                || token_in_second_hops.offer(pool.token1_id(), pool)
                || token_out_second_hops.offer(pool.token0_id(), pool)
                || token_out_second_hops.offer(pool.token1_id(), pool);
            if taken {
                seen.insert(pool.id.clone());
            }
        }
    }
    metrics.put_metric(names::V2_SUBGRAPH_LOOPS_SECOND, loops_in_second_iteration, MetricUnit::Count);
    if blocked_token_list_provider.is_some() {
        tracing::info!(
            "After filtering blocked tokens went from {} to {}.",
            sorted.len(),
            sorted.len() - blocked.len()
        );
    }

    selections.top_by_base_with_token_in = pass.base_in.into_pools();
    selections.top_by_base_with_token_out = pass.base_out.into_pools();
    selections.top_by_eth_quote_token_pool = pass.eth_quote;
    selections.top_by_tvl = pass.top_by_tvl;
    selections.top_by_tvl_using_token_in = pass.token_in_bucket;
    selections.top_by_tvl_using_token_out = pass.token_out_bucket;
    selections.top_by_tvl_using_token_in_second_hops = token_in_second_hops.into_pools();
    selections.top_by_tvl_using_token_out_second_hops = token_out_second_hops.into_pools();

    let subgraph_pools = selections.union();
    let token_accessor = resolve_tokens(&subgraph_pools, token_provider, block_number).await?;
    tracing::info!(
        "Getting the {} tokens within the {} V2 pools we are considering",
        token_accessor.get_all_tokens().len(),
        subgraph_pools.len()
    );
    log_selections(Protocol::V2, &selections, |p| pair_label(&token_accessor, p));

    let token_pairs: Vec<(Token, Token)> = subgraph_pools
        .iter()
        .filter_map(|pool| {
            let token_a = token_accessor.get_token_by_address(&pool.token0.id);
            let token_b = token_accessor.get_token_by_address(&pool.token1.id);
            match (token_a, token_b) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => {
                    tracing::info!("Dropping candidate pool for {}/{}", pool.token0.id, pool.token1.id);
                    None
                }
            }
        })
        .collect();
    put_elapsed(metrics, names::V2_POOLS_FILTER_LOAD, before_filter);

    let before_load = Instant::now();
    let pool_accessor = pool_provider
        .get_pools(&token_pairs, &routing_config.provider_config())
        .await?;
    put_elapsed(metrics, names::V2_POOLS_LOAD, before_load);

    Ok(V2CandidatePools {
        pool_accessor,
        candidate_pools: CandidatePoolsBySelection {
            protocol: Protocol::V2,
            selections,
        },
        subgraph_pools,
    })
}
