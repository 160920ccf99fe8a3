//! Path enumeration
//!
//! Converts a candidate pool set into every acyclic token-in to token-out
//! path up to a hop limit. A path never reuses a pool and never revisits an
//! intermediate token.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use amm_v2::{V2Pool, V2Route};
use amm_v3::{V3Pool, V3Route};
use router_core::{Address, ChainId, Protocol, RoutingError, Token};

// ---------------------------------------------------------------------------
// Mixed routes
// ---------------------------------------------------------------------------

/// A pool of either family inside a mixed route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixedPool {
    V2(V2Pool),
    V3(V3Pool),
}

impl MixedPool {
    pub fn token0(&self) -> &Token {
        match self {
            Self::V2(pool) => &pool.token0,
            Self::V3(pool) => &pool.token0,
        }
    }

    pub fn token1(&self) -> &Token {
        match self {
            Self::V2(pool) => &pool.token1,
            Self::V3(pool) => &pool.token1,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::V2(_) => Protocol::V2,
            Self::V3(_) => Protocol::V3,
        }
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        self.token0() == token || self.token1() == token
    }

    pub fn other_token(&self, token: &Token) -> Option<&Token> {
        if self.token0() == token {
            Some(self.token1())
        } else if self.token1() == token {
            Some(self.token0())
        } else {
            None
        }
    }

    /// Deterministic on-chain address of the pool
    pub fn address(&self) -> Result<Address, RoutingError> {
        match self {
            Self::V2(pool) => amm_v2::compute_pair_address(&pool.token0, &pool.token1)
                .map(|p| p.pool_address)
                .map_err(|e| RoutingError::InvalidPool { message: e.to_string() }),
            Self::V3(pool) => amm_v3::compute_pool_address(&pool.token0, &pool.token1, pool.fee)
                .map(|p| p.pool_address)
                .map_err(|e| RoutingError::InvalidPool { message: e.to_string() }),
        }
    }
}

impl fmt::Display for MixedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2(pool) => write!(f, "V2 {}", pool),
            Self::V3(pool) => write!(f, "V3 {}", pool),
        }
    }
}

/// A path mixing V2 and V3 pools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedRoute {
    pub pools: Vec<MixedPool>,
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl MixedRoute {
    pub fn new(pools: Vec<MixedPool>, input: Token, output: Token) -> Result<Self, RoutingError> {
        let invalid = || RoutingError::InvalidPool {
            message: format!("pools do not connect {} to {}", input, output),
        };
        if pools.is_empty() {
            return Err(invalid());
        }
        let mut path = Vec::with_capacity(pools.len() + 1);
        path.push(input.clone());
        for pool in &pools {
            let next = path
                .last()
                .and_then(|current| pool.other_token(current))
                .cloned()
                .ok_or_else(invalid)?;
            path.push(next);
        }
        if path.last() != Some(&output) {
            return Err(invalid());
        }
        Ok(Self {
            pools,
            path,
            input,
            output,
        })
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::Mixed
    }

    pub fn chain(&self) -> ChainId {
        self.input.chain
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }

    /// Consecutive runs of same-protocol pools
    pub fn sections(&self) -> Vec<&[MixedPool]> {
        let mut sections = Vec::new();
        let mut start = 0;
        for i in 1..=self.pools.len() {
            if i == self.pools.len() || self.pools[i].protocol() != self.pools[start].protocol() {
                sections.push(&self.pools[start..i]);
                start = i;
            }
        }
        sections
    }
}

impl fmt::Display for MixedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[MIXED] {}", self.input)?;
        for (pool, token) in self.pools.iter().zip(self.path.iter().skip(1)) {
            match pool {
                MixedPool::V2(_) => write!(f, " -- [V2] --> {}", token)?,
                MixedPool::V3(p) => write!(f, " -- [V3] {}% --> {}", p.fee.fee() as f64 / 10_000.0, token)?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Breadth-first search over pool indices.
///
/// `connect(pool, token)` returns the token reached by crossing `pool` from
/// `token`, or `None` if the pool does not hold `token`.
fn find_pool_paths<P>(
    token_in: &Token,
    token_out: &Token,
    pools: &[P],
    max_hops: usize,
    connect: impl Fn(&P, &Token) -> Option<Token>,
) -> Vec<Vec<usize>> {
    let mut results: Vec<Vec<usize>> = Vec::new();
    if max_hops == 0 || token_in == token_out {
        return results;
    }

    type SearchState = (Token, Vec<usize>, HashSet<Token>);
    let mut queue: VecDeque<SearchState> = VecDeque::new();

    let mut initial_visited = HashSet::new();
    initial_visited.insert(token_in.clone());
    queue.push_back((token_in.clone(), Vec::new(), initial_visited));

    while let Some((current, path, visited)) = queue.pop_front() {
        for (index, pool) in pools.iter().enumerate() {
            if path.contains(&index) {
                continue;
            }
            let Some(next) = connect(pool, &current) else {
                continue;
            };

            if &next == token_out {
                let mut complete_path = path.clone();
                complete_path.push(index);
                results.push(complete_path);
            } else if path.len() + 1 < max_hops && !visited.contains(&next) {
                let mut new_visited = visited.clone();
                new_visited.insert(next.clone());
                let mut new_path = path.clone();
                new_path.push(index);
                queue.push_back((next, new_path, new_visited));
            }
        }
    }

    results
}

fn collect<P: Clone>(pools: &[P], indices: &[usize]) -> Vec<P> {
    indices.iter().filter_map(|i| pools.get(*i)).cloned().collect()
}

/// Every V2 path from `token_in` to `token_out` of at most `max_hops` pairs
pub fn compute_all_v2_routes(token_in: &Token, token_out: &Token, pools: &[V2Pool], max_hops: usize) -> Vec<V2Route> {
    let routes: Vec<V2Route> = find_pool_paths(token_in, token_out, pools, max_hops, |pool, token| {
        pool.other_token(token).ok().cloned()
    })
    .iter()
    .filter_map(|indices| V2Route::new(collect(pools, indices), token_in.clone(), token_out.clone()).ok())
    .collect();

    tracing::info!(count = routes.len(), "computed V2 routes");
    routes
}

/// Every V3 path from `token_in` to `token_out` of at most `max_hops` pools
pub fn compute_all_v3_routes(token_in: &Token, token_out: &Token, pools: &[V3Pool], max_hops: usize) -> Vec<V3Route> {
    let routes: Vec<V3Route> = find_pool_paths(token_in, token_out, pools, max_hops, |pool, token| {
        pool.other_token(token).ok().cloned()
    })
    .iter()
    .filter_map(|indices| V3Route::new(collect(pools, indices), token_in.clone(), token_out.clone()).ok())
    .collect();

    tracing::info!(count = routes.len(), "computed V3 routes");
    routes
}

/// Every path over both families, minus the pure-V3 ones
pub fn compute_all_mixed_routes(
    token_in: &Token,
    token_out: &Token,
    pools: &[MixedPool],
    max_hops: usize,
) -> Vec<MixedRoute> {
    let routes: Vec<MixedRoute> = find_pool_paths(token_in, token_out, pools, max_hops, |pool, token| {
        pool.other_token(token).cloned()
    })
    .iter()
    .map(|indices| collect(pools, indices))
    .filter(|route_pools| !route_pools.iter().all(|p| matches!(p, MixedPool::V3(_))))
    .filter_map(|route_pools| MixedRoute::new(route_pools, token_in.clone(), token_out.clone()).ok())
    .collect();

    tracing::info!(count = routes.len(), "computed mixed routes");
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm_v3::FeeAmount;
    use num_bigint::BigInt;
    use num_traits::One;
    use router_core::tokens::known;

    fn make_v2(a: Token, b: Token) -> V2Pool {
        V2Pool::new(a, 1_000_000u64, b, 1_000_000u64).unwrap()
    }

    fn make_v3(a: Token, b: Token, fee: FeeAmount) -> V3Pool {
        V3Pool::new(a, b, fee, BigInt::one() << 96, 1_000u64, 0).unwrap()
    }

    #[test]
    fn test_find_direct_and_multihop_v2_paths() {
        let (usdc, weth, dai) = (known::usdc_mainnet(), known::weth_mainnet(), known::dai_mainnet());
        let pools = vec![
            make_v2(usdc.clone(), weth.clone()),
            make_v2(usdc.clone(), dai.clone()),
            make_v2(dai.clone(), weth.clone()),
        ];
        let routes = compute_all_v2_routes(&usdc, &weth, &pools, 3);
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().any(|r| r.hops() == 1));
        let two_hop = routes.iter().find(|r| r.hops() == 2).unwrap();
        assert_eq!(two_hop.path, vec![usdc, dai, weth]);
    }

    #[test]
    fn test_max_hops_limit() {
        let (usdc, weth, dai, wbtc) = (
            known::usdc_mainnet(),
            known::weth_mainnet(),
            known::dai_mainnet(),
            known::wbtc_mainnet(),
        );
        let pools = vec![
            make_v2(usdc.clone(), dai.clone()),
            make_v2(dai.clone(), wbtc.clone()),
            make_v2(wbtc.clone(), weth.clone()),
        ];
        assert!(compute_all_v2_routes(&usdc, &weth, &pools, 2).is_empty());
        assert_eq!(compute_all_v2_routes(&usdc, &weth, &pools, 3).len(), 1);
        assert!(compute_all_v2_routes(&usdc, &weth, &pools, 0).is_empty());
    }

    #[test]
    fn test_no_cycles() {
        let (usdc, weth, dai) = (known::usdc_mainnet(), known::weth_mainnet(), known::dai_mainnet());
        let pools = vec![
            make_v3(usdc.clone(), dai.clone(), FeeAmount::Low),
            make_v3(usdc.clone(), dai.clone(), FeeAmount::Lowest),
            make_v3(dai.clone(), weth.clone(), FeeAmount::Medium),
        ];
        let routes = compute_all_v3_routes(&usdc, &weth, &pools, 4);
        // two parallel USDC/DAI tiers, each continuing through DAI/WETH
        assert_eq!(routes.len(), 2);
        for route in &routes {
            let unique: HashSet<_> = route.path.iter().collect();
            assert_eq!(unique.len(), route.path.len(), "cycle in {}", route);
        }
    }

    #[test]
    fn test_mixed_routes_drop_pure_v3() {
        let (usdc, weth, dai) = (known::usdc_mainnet(), known::weth_mainnet(), known::dai_mainnet());
        let pools = vec![
            MixedPool::V3(make_v3(usdc.clone(), weth.clone(), FeeAmount::Low)),
            MixedPool::V2(make_v2(usdc.clone(), dai.clone())),
            MixedPool::V3(make_v3(dai.clone(), weth.clone(), FeeAmount::Medium)),
        ];
        let routes = compute_all_mixed_routes(&usdc, &weth, &pools, 3);
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.hops(), 2);
        assert_eq!(route.sections().len(), 2);
        assert_eq!(route.to_string(), "[MIXED] USDC -- [V2] --> DAI -- [V3] 0.3% --> WETH");
    }

    #[test]
    fn test_mixed_sections_group_consecutive_protocols() {
        let (usdc, weth, dai, wbtc) = (
            known::usdc_mainnet(),
            known::weth_mainnet(),
            known::dai_mainnet(),
            known::wbtc_mainnet(),
        );
        let route = MixedRoute::new(
            vec![
                MixedPool::V2(make_v2(usdc.clone(), dai.clone())),
                MixedPool::V2(make_v2(dai.clone(), wbtc.clone())),
                MixedPool::V3(make_v3(wbtc.clone(), weth.clone(), FeeAmount::Medium)),
            ],
            usdc,
            weth,
        )
        .unwrap();
        let sections = route.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].len(), 2);
        assert_eq!(sections[1].len(), 1);
    }
}
