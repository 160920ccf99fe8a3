//! Concentrated-liquidity candidate selection
//!
//! Multi-pass: each heuristic scans the liquidity-sorted list on its own,
//! skipping anything an earlier heuristic claimed.

use std::time::Instant;

use amm_v3::FeeAmount;
use chain_providers::{SubgraphPool, SubgraphToken, V3PoolAccessor, V3PoolProvider, V3SubgraphPool};
use router_core::metrics::names;
use router_core::tokens::{base_tokens, known, wrapped_native};
use router_core::{Address, ChainId, Protocol, Result, Token, TradeType};

use super::{
    filter_blocked, log_selections, pair_label, put_elapsed, resolve_tokens, sort_by_liquidity, CandidatePoolSelections,
    CandidatePoolsBySelection, CandidatePoolsParams, SeenPools, PLACEHOLDER_LIQUIDITY,
};

/// Result of V3 candidate selection
#[derive(Debug, Clone)]
pub struct V3CandidatePools {
    pub pool_accessor: V3PoolAccessor,
    pub candidate_pools: CandidatePoolsBySelection<V3SubgraphPool>,
    pub subgraph_pools: Vec<V3SubgraphPool>,
}

/// Whether the gas-quote pool is worth fetching for this output token.
///
/// Only WETH-style and WMATIC-style chains are handled; elsewhere the bucket
/// stays empty.
fn needs_eth_quote_pool(chain: ChainId, token_out: &Token) -> bool {
    let native_symbol = wrapped_native(chain).symbol;
    let out_symbol = token_out.symbol.as_deref().unwrap_or_default();
    if native_symbol == known::weth_mainnet().symbol {
        !matches!(out_symbol, "WETH" | "WETH9" | "ETH")
    } else if native_symbol == known::wmatic_polygon().symbol {
        !matches!(out_symbol, "MATIC" | "WMATIC")
    } else {
        false
    }
}

/// Placeholders for every fee tier of a pair the discovery index lacks
fn direct_placeholders(
    token_in: &Token,
    token_out: &Token,
    pool_provider: &dyn V3PoolProvider,
) -> Result<Vec<V3SubgraphPool>> {
    // Highest fee first
    FeeAmount::ALL
        .iter()
        .map(|fee| {
            let address = pool_provider.get_pool_address(token_in, token_out, *fee)?;
            Ok(V3SubgraphPool {
                id: address.pool_address,
                fee_tier: fee.fee().to_string(),
                liquidity: "10000".to_string(),
                token0: SubgraphToken::new(address.token0.address.as_str()),
                token1: SubgraphToken::new(address.token1.address.as_str()),
                tvl_eth: PLACEHOLDER_LIQUIDITY,
                tvl_usd: PLACEHOLDER_LIQUIDITY,
            })
        })
        .collect()
}

/// Top pools pairing each base token with `token`, then capped overall
fn top_by_base_with(
    seen: &mut SeenPools,
    pools: &[V3SubgraphPool],
    bases: &[Address],
    token: &Address,
    per_base: usize,
    total: usize,
) -> Vec<V3SubgraphPool> {
    let mut found: Vec<V3SubgraphPool> = bases
        .iter()
        .filter(|base| *base != token)
        .flat_map(|base| {
            pools
                .iter()
                .filter(|pool| !seen.contains(pool.id()) && pool.connects(base, token))
                .take(per_base)
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect();
    sort_by_liquidity(&mut found);
    found.truncate(total);

    // The same pool can surface under two bases only if both are its tokens
    let mut unique = SeenPools::new();
    found.retain(|pool| unique.insert(pool.id.clone()));
    seen.claim(&found);
    found
}

/// Pools extending each first-hop token by one more hop
fn second_hops(
    seen: &mut SeenPools,
    pools: &[V3SubgraphPool],
    first_hops: &[V3SubgraphPool],
    from: &Address,
    selection: &router_core::ProtocolPoolSelection,
) -> Vec<V3SubgraphPool> {
    let mut found = Vec::new();
    for pool in first_hops {
        let Some(hop) = pool.other_token_id(from) else {
            continue;
        };
        if selection.avoids_second_hop(hop) {
            continue;
        }
        let limit = selection.second_hop_limit(hop);
        found.extend(seen.take(pools, limit, |p| p.involves(hop)));
    }
    found
}

/// Select V3 candidate pools for `token_in -> token_out`
pub async fn get_v3_candidate_pools(
    params: CandidatePoolsParams<'_, V3SubgraphPool, dyn V3PoolProvider>,
) -> Result<V3CandidatePools> {
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
    let selection = &routing_config.v3_pool_selection;
    let block_number = routing_config.block_number;
    let chain = token_in.chain;
    let token_in_address = &token_in.address;
    let token_out_address = &token_out.address;

    let before_subgraph = Instant::now();
    let all_pools = subgraph_provider.get_pools(token_in, token_out, block_number).await?;
    tracing::info!(count = all_pools.len(), "got all pools from V3 subgraph provider");
    put_elapsed(metrics, names::V3_SUBGRAPH_POOLS_LOAD, before_subgraph);

    let before_filter = Instant::now();
    let total = all_pools.len();
    let mut sorted = filter_blocked(all_pools, blocked_token_list_provider).await;
    sort_by_liquidity(&mut sorted);
    tracing::info!("After filtering blocked tokens went from {} to {}.", total, sorted.len());

    let mut seen = SeenPools::new();
    let mut selections = CandidatePoolSelections::default();

    // Direct swaps
    selections.top_by_direct_swap_pool = seen.take(&sorted, selection.top_n_direct_swaps, |p| {
        p.connects(token_in_address, token_out_address)
    });
    if selections.top_by_direct_swap_pool.is_empty() && selection.top_n_direct_swaps > 0 {
        let placeholders = direct_placeholders(token_in, token_out, pool_provider)?;
        seen.claim(&placeholders);
        selections.top_by_direct_swap_pool = placeholders;
    }

    // Gas quote: if the best native/quote pool is already selected, nothing more is needed
    if needs_eth_quote_pool(chain, token_out) {
        let native = wrapped_native(chain).address;
        let target = match trade_type {
            TradeType::ExactInput => token_out_address,
            TradeType::ExactOutput => token_in_address,
        };
        if let Some(pool) = sorted.iter().find(|p| p.connects(&native, target)) {
            if seen.insert(pool.id.clone()) {
                selections.top_by_eth_quote_token_pool.push(pool.clone());
            }
        }
    }

    // Base tokens
    let bases: Vec<Address> = base_tokens(chain).into_iter().map(|t| t.address).collect();
    selections.top_by_base_with_token_in = top_by_base_with(
        &mut seen,
        &sorted,
        &bases,
        token_in_address,
        selection.top_n_with_each_base_token,
        selection.top_n_with_base_token,
    );
    selections.top_by_base_with_token_out = top_by_base_with(
        &mut seen,
        &sorted,
        &bases,
        token_out_address,
        selection.top_n_with_each_base_token,
        selection.top_n_with_base_token,
    );

    // Liquidity
    selections.top_by_tvl = seen.take(&sorted, selection.top_n, |_| true);
    selections.top_by_tvl_using_token_in =
        seen.take(&sorted, selection.top_n_token_in_out, |p| p.involves(token_in_address));
    selections.top_by_tvl_using_token_out =
        seen.take(&sorted, selection.top_n_token_in_out, |p| p.involves(token_out_address));

    // Second hops
    let token_in_first_hops = selections.top_by_tvl_using_token_in.clone();
    selections.top_by_tvl_using_token_in_second_hops =
        second_hops(&mut seen, &sorted, &token_in_first_hops, token_in_address, selection);
    let token_out_first_hops = selections.top_by_tvl_using_token_out.clone();
    selections.top_by_tvl_using_token_out_second_hops =
        second_hops(&mut seen, &sorted, &token_out_first_hops, token_out_address, selection);

    let subgraph_pools = selections.union();
    let token_accessor = resolve_tokens(&subgraph_pools, token_provider, block_number).await?;
    tracing::info!(
        "Getting the {} tokens within the {} V3 pools we are considering",
        token_accessor.get_all_tokens().len(),
        subgraph_pools.len()
    );
    log_selections(Protocol::V3, &selections, |p| {
        format!("{}/{}", pair_label(&token_accessor, p), p.fee_tier)
    });

    let mut token_pairs = Vec::with_capacity(subgraph_pools.len());
    for pool in &subgraph_pools {
        let fee: FeeAmount = match pool.fee_tier.parse() {
            Ok(fee) => fee,
            Err(_) => {
                tracing::info!(
                    "Dropping candidate pool for {}/{}/{} because fee tier not supported",
                    pool.token0.id,
                    pool.token1.id,
                    pool.fee_tier
                );
                continue;
            }
        };
        let token_a = token_accessor.get_token_by_address(&pool.token0.id);
        let token_b = token_accessor.get_token_by_address(&pool.token1.id);
        match (token_a, token_b) {
            (Some(a), Some(b)) => token_pairs.push((a.clone(), b.clone(), fee)),
            _ => {
                let missing = if token_a.is_some() { &pool.token1.id } else { &pool.token0.id };
                tracing::info!(
                    "Dropping candidate pool for {}/{}/{} because {} not found by token provider",
                    pool.token0.id,
                    pool.token1.id,
                    fee,
                    missing
                );
            }
        }
    }
    put_elapsed(metrics, names::V3_POOLS_FILTER_LOAD, before_filter);

    let before_load = Instant::now();
    let pool_accessor = pool_provider
        .get_pools(&token_pairs, &routing_config.provider_config())
        .await?;
    put_elapsed(metrics, names::V3_POOLS_LOAD, before_load);

    Ok(V3CandidatePools {
        pool_accessor,
        candidate_pools: CandidatePoolsBySelection {
            protocol: Protocol::V3,
            selections,
        },
        subgraph_pools,
    })
}
