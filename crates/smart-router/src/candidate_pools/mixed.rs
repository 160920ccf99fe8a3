//! Mixed-route candidate pools
//!
//! Merges the V2 and V3 selections. A V2 pair survives only when no V3 pool
//! covers the same tokens or when it is deeper than every such V3 pool.

use std::collections::HashSet;
use std::time::Instant;

use amm_v3::FeeAmount;
use chain_providers::{
    SubgraphPool, TokenProvider, V2PoolAccessor, V2PoolProvider, V2SubgraphPool, V3PoolAccessor, V3PoolProvider,
    V3SubgraphPool,
};
use router_core::metrics::names;
use router_core::{Address, MetricsSink, Protocol, Result, RoutingConfig, Token};

use super::{
    put_elapsed, resolve_tokens, CandidatePoolSelections, CandidatePoolsBySelection, V2CandidatePools,
    V3CandidatePools,
};

/// Discovery record of either family
#[derive(Debug, Clone, PartialEq)]
pub enum MixedSubgraphPool {
    V2(V2SubgraphPool),
    V3(V3SubgraphPool),
}

impl SubgraphPool for MixedSubgraphPool {
    fn id(&self) -> &Address {
        match self {
            Self::V2(pool) => &pool.id,
            Self::V3(pool) => &pool.id,
        }
    }

    fn token0_id(&self) -> &Address {
        match self {
            Self::V2(pool) => &pool.token0.id,
            Self::V3(pool) => &pool.token0.id,
        }
    }

    fn token1_id(&self) -> &Address {
        match self {
            Self::V2(pool) => &pool.token1.id,
            Self::V3(pool) => &pool.token1.id,
        }
    }

    /// USD depth for both families so they compare directly
    fn liquidity_metric(&self) -> f64 {
        match self {
            Self::V2(pool) => pool.reserve_usd,
            Self::V3(pool) => pool.tvl_usd,
        }
    }
}

/// Inputs for the merge
pub struct MixedCandidatePoolsParams<'a> {
    pub v2_candidate_pools: &'a V2CandidatePools,
    pub v3_candidate_pools: &'a V3CandidatePools,
    pub routing_config: &'a RoutingConfig,
    pub token_provider: &'a dyn TokenProvider,
    pub v2_pool_provider: &'a dyn V2PoolProvider,
    pub v3_pool_provider: &'a dyn V3PoolProvider,
    pub metrics: &'a dyn MetricsSink,
}

/// Result of the merge
#[derive(Debug, Clone)]
pub struct MixedCandidatePools {
    pub v2_pool_accessor: V2PoolAccessor,
    pub v3_pool_accessor: V3PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelection<MixedSubgraphPool>,
    pub subgraph_pools: Vec<MixedSubgraphPool>,
}

/// V2 pools worth mixing with V3, in reserve order
fn filter_v2_against_v3(v2_pools: &[V2SubgraphPool], v3_pools: &[V3SubgraphPool]) -> Vec<V2SubgraphPool> {
    v2_pools
        .iter()
        .filter(|v2| {
            let deepest_v3 = v3_pools
                .iter()
                .filter(|v3| v3.connects(v2.token0_id(), v2.token1_id()))
                .map(|v3| v3.tvl_usd)
                .fold(None, |acc: Option<f64>, tvl| Some(acc.map_or(tvl, |a| a.max(tvl))));
            match deepest_v3 {
                None => {
                    tracing::info!(
                        "V2 pool {}/{} has no V3 counterpart, keeping it",
                        v2.token0.id,
                        v2.token1.id
                    );
                    true
                }
                Some(tvl) if v2.reserve_usd > tvl => {
                    tracing::info!(
                        "V2 pool {}/{} is deeper than its V3 counterpart ({} > {}), keeping it",
                        v2.token0.id,
                        v2.token1.id,
                        v2.reserve_usd,
                        tvl
                    );
                    true
                }
                Some(_) => false,
            }
        })
        .cloned()
        .collect()
}

/// Build mixed-route candidates from the per-family selections
pub async fn get_mixed_route_candidate_pools(params: MixedCandidatePoolsParams<'_>) -> Result<MixedCandidatePools> {
    let MixedCandidatePoolsParams {
        v2_candidate_pools,
        v3_candidate_pools,
        routing_config,
        token_provider,
        v2_pool_provider,
        v3_pool_provider,
        metrics,
    } = params;
    let block_number = routing_config.block_number;
    let before_filter = Instant::now();

    let v2_selections = &v2_candidate_pools.candidate_pools.selections;
    let v3_selections = &v3_candidate_pools.candidate_pools.selections;

    // Only first-hop and direct buckets take part on the V2 side
    let v2_ids: HashSet<&Address> = [
        &v2_selections.top_by_tvl_using_token_in,
        &v2_selections.top_by_base_with_token_in,
        &v2_selections.top_by_tvl_using_token_out,
        &v2_selections.top_by_base_with_token_out,
        &v2_selections.top_by_direct_swap_pool,
    ]
    .into_iter()
    .flat_map(|bucket| bucket.iter().map(|pool| &pool.id))
    .collect();

    let mut v2_pools: Vec<V2SubgraphPool> = v2_candidate_pools
        .subgraph_pools
        .iter()
        .filter(|pool| v2_ids.contains(&pool.id))
        .cloned()
        .collect();
    v2_pools.sort_by(|a, b| b.reserve_usd.total_cmp(&a.reserve_usd));

    let mut v3_pools = v3_candidate_pools.subgraph_pools.clone();
    v3_pools.sort_by(|a, b| b.tvl_usd.total_cmp(&a.tvl_usd));

    let kept_v2 = filter_v2_against_v3(&v2_pools, &v3_pools);
    let kept_v2_ids: HashSet<Address> = kept_v2.iter().map(|pool| pool.id.clone()).collect();

    let subgraph_pools: Vec<MixedSubgraphPool> = kept_v2
        .iter()
        .cloned()
        .map(MixedSubgraphPool::V2)
        .chain(v3_pools.iter().cloned().map(MixedSubgraphPool::V3))
        .collect();

    let token_accessor = resolve_tokens(&subgraph_pools, token_provider, block_number).await?;
    let token_of = |addr: &Address| token_accessor.get_token_by_address(addr).cloned();

    let mut v2_pairs: Vec<(Token, Token)> = Vec::new();
    let mut v3_triples: Vec<(Token, Token, FeeAmount)> = Vec::new();
    for pool in &subgraph_pools {
        let (Some(a), Some(b)) = (token_of(pool.token0_id()), token_of(pool.token1_id())) else {
            tracing::info!(
                "Dropping mixed candidate pool {}/{}, token not found by token provider",
                pool.token0_id(),
                pool.token1_id()
            );
            continue;
        };
        match pool {
            MixedSubgraphPool::V2(_) => v2_pairs.push((a, b)),
            MixedSubgraphPool::V3(v3) => match v3.fee_tier.parse::<FeeAmount>() {
                Ok(fee) => v3_triples.push((a, b, fee)),
                Err(_) => tracing::info!(
                    "Dropping mixed candidate pool {}/{}/{} because fee tier not supported",
                    v3.token0.id,
                    v3.token1.id,
                    v3.fee_tier
                ),
            },
        }
    }
    put_elapsed(metrics, names::MIXED_POOLS_FILTER_LOAD, before_filter);

    let before_load = Instant::now();
    let provider_config = routing_config.provider_config();
    let (v2_pool_accessor, v3_pool_accessor) = futures::future::try_join(
        v2_pool_provider.get_pools(&v2_pairs, &provider_config),
        v3_pool_provider.get_pools(&v3_triples, &provider_config),
    )
    .await?;
    put_elapsed(metrics, names::MIXED_POOLS_LOAD, before_load);

    // Bucket membership is kept from the per-family selections
    let v2_buckets = v2_selections.map_buckets(|_, pools| {
        pools
            .iter()
            .filter(|pool| kept_v2_ids.contains(&pool.id))
            .cloned()
            .map(MixedSubgraphPool::V2)
            .collect()
    });
    let mut v3_buckets =
        v3_selections.map_buckets(|_, pools| pools.iter().cloned().map(MixedSubgraphPool::V3).collect());
    let selections = merge_selections(v2_buckets, &mut v3_buckets);

    Ok(MixedCandidatePools {
        v2_pool_accessor,
        v3_pool_accessor,
        candidate_pools: CandidatePoolsBySelection {
            protocol: Protocol::Mixed,
            selections,
        },
        subgraph_pools,
    })
}

/// Append each V3 bucket to its V2 counterpart
fn merge_selections(
    mut v2: CandidatePoolSelections<MixedSubgraphPool>,
    v3: &mut CandidatePoolSelections<MixedSubgraphPool>,
) -> CandidatePoolSelections<MixedSubgraphPool> {
    let pairs = [
        (&mut v2.top_by_base_with_token_in, &mut v3.top_by_base_with_token_in),
        (&mut v2.top_by_base_with_token_out, &mut v3.top_by_base_with_token_out),
        (&mut v2.top_by_direct_swap_pool, &mut v3.top_by_direct_swap_pool),
        (&mut v2.top_by_eth_quote_token_pool, &mut v3.top_by_eth_quote_token_pool),
        (&mut v2.top_by_tvl, &mut v3.top_by_tvl),
        (&mut v2.top_by_tvl_using_token_in, &mut v3.top_by_tvl_using_token_in),
        (&mut v2.top_by_tvl_using_token_out, &mut v3.top_by_tvl_using_token_out),
        (
            &mut v2.top_by_tvl_using_token_in_second_hops,
            &mut v3.top_by_tvl_using_token_in_second_hops,
        ),
        (
            &mut v2.top_by_tvl_using_token_out_second_hops,
            &mut v3.top_by_tvl_using_token_out_second_hops,
        ),
    ];
    for (into, from) in pairs {
        into.append(from);
    }
    v2
}
