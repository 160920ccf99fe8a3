//! End-to-end routing scenarios over the in-memory providers

use std::collections::HashSet;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::One;

use amm_v2::V2Route;
use amm_v3::{FeeAmount, V3Pool, V3Route};
use chain_providers::{
    AmountQuote, FnQuoteProvider, InMemoryChainProvider, InMemorySubgraphProvider, InMemoryTokenProvider,
    InMemoryV2PoolProvider, InMemoryV3PoolProvider, SubgraphPool, SubgraphToken, V2PoolProvider, V2SubgraphPool,
    V3PoolProvider, V3SubgraphPool,
};
use router_core::tokens::known;
use router_core::{
    Address, ChainId, Currency, CurrencyAmount, NoopMetrics, ProviderConfig, RoutingConfig, Token, TradeType,
};
use smart_router::{
    calculate_gas_used, get_v2_candidate_pools, get_v3_candidate_pools, CandidatePoolSelections,
    CandidatePoolsParams, EthEstimateGasSimulator, MethodParameters, QuoteRequest, SimulationStatus, Simulator,
    SwapRoute, SwapType, Trade, V2Quoter, V3CandidatePools, V3GasModel, V3Quoter,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn make_token_x() -> Token {
    Token::new(ChainId::Mainnet, "0x1111111111111111111111111111111111111111", 18, "X")
}

fn make_token_y() -> Token {
    Token::new(ChainId::Mainnet, "0x2222222222222222222222222222222222222222", 18, "Y")
}

fn make_tokens() -> InMemoryTokenProvider {
    InMemoryTokenProvider::new(vec![
        make_token_x(),
        make_token_y(),
        known::weth_mainnet(),
        known::usdc_mainnet(),
        known::usdt_mainnet(),
        known::dai_mainnet(),
        known::wbtc_mainnet(),
    ])
}

fn make_v3_subgraph(id: &str, token0: &Token, token1: &Token, fee: &str, tvl_usd: f64) -> V3SubgraphPool {
    V3SubgraphPool {
        id: Address::new(id),
        fee_tier: fee.to_string(),
        liquidity: "1000".to_string(),
        token0: SubgraphToken::new(token0.address.as_str()),
        token1: SubgraphToken::new(token1.address.as_str()),
        tvl_eth: tvl_usd,
        tvl_usd,
    }
}

fn make_v2_subgraph(id: &str, token0: &Token, token1: &Token, reserve_usd: f64) -> V2SubgraphPool {
    V2SubgraphPool {
        id: Address::new(id),
        token0: SubgraphToken::new(token0.address.as_str()),
        token1: SubgraphToken::new(token1.address.as_str()),
        supply: reserve_usd,
        reserve: reserve_usd,
        reserve_usd,
    }
}

/// USDC/WETH at 2500 USDC per WETH
fn make_usd_pool() -> V3Pool {
    V3Pool::new(
        known::usdc_mainnet(),
        known::weth_mainnet(),
        FeeAmount::Low,
        BigInt::from(20_000u64) * (BigInt::one() << 96),
        1_000_000_000u64,
        0,
    )
    .unwrap()
}

fn make_x_usdc_pool() -> V3Pool {
    V3Pool::new(
        make_token_x(),
        known::usdc_mainnet(),
        FeeAmount::Medium,
        BigInt::one() << 96,
        1_000_000_000u64,
        0,
    )
    .unwrap()
}

async fn select_v3(pools: Vec<V3SubgraphPool>, token_in: &Token, token_out: &Token, config: &RoutingConfig) -> V3CandidatePools {
    let subgraph = InMemorySubgraphProvider::new(pools);
    let tokens = make_tokens();
    let pool_provider = InMemoryV3PoolProvider::default();
    get_v3_candidate_pools(CandidatePoolsParams {
        token_in,
        token_out,
        trade_type: TradeType::ExactInput,
        routing_config: config,
        subgraph_provider: &subgraph,
        token_provider: &tokens,
        pool_provider: &pool_provider as &dyn V3PoolProvider,
        blocked_token_list_provider: None,
        metrics: &NoopMetrics,
    })
    .await
    .unwrap()
}

fn make_pool_set() -> Vec<V3SubgraphPool> {
    let (x, y, weth, usdc, dai, wbtc) = (
        make_token_x(),
        make_token_y(),
        known::weth_mainnet(),
        known::usdc_mainnet(),
        known::dai_mainnet(),
        known::wbtc_mainnet(),
    );
    vec![
        make_v3_subgraph("0x01", &x, &y, "3000", 700.0),
        make_v3_subgraph("0x02", &x, &weth, "500", 650.0),
        make_v3_subgraph("0x03", &weth, &y, "3000", 600.0),
        make_v3_subgraph("0x04", &usdc, &weth, "500", 900.0),
        make_v3_subgraph("0x05", &dai, &usdc, "100", 800.0),
        make_v3_subgraph("0x06", &x, &dai, "10000", 300.0),
        make_v3_subgraph("0x07", &wbtc, &weth, "3000", 500.0),
        make_v3_subgraph("0x08", &y, &usdc, "500", 200.0),
        make_v3_subgraph("0x09", &x, &wbtc, "3000", 100.0),
        make_v3_subgraph("0x0a", &dai, &y, "500", 50.0),
    ]
}

fn assert_buckets_disjoint<P: SubgraphPool>(selections: &CandidatePoolSelections<P>) {
    let mut seen = HashSet::new();
    for (name, pools) in selections.buckets() {
        for pool in pools {
            assert!(seen.insert(pool.id().clone()), "pool {} repeated in {}", pool.id(), name);
        }
    }
}

fn make_swap_route(input: Currency, quote: Currency) -> SwapRoute {
    let quote_amount = CurrencyAmount::from_raw_amount(quote.clone(), 1_000_000_000_000_000_000u64);
    SwapRoute {
        quote: quote_amount.clone(),
        quote_gas_adjusted: quote_amount.clone(),
        estimated_gas_used: BigInt::from(150_000),
        estimated_gas_used_quote_token: CurrencyAmount::zero(quote.wrapped().into()),
        estimated_gas_used_usd: CurrencyAmount::zero(known::usdc_mainnet().into()),
        gas_price_wei: BigInt::from(1_000_000_000u64),
        trade: Trade {
            input_amount: CurrencyAmount::from_raw_amount(input, 1_000_000_000_000_000_000u64),
            output_amount: quote_amount,
            trade_type: TradeType::ExactInput,
        },
        route: Vec::new(),
        block_number: 17_000_000,
        method_parameters: Some(MethodParameters {
            calldata: "0x3593564c000000000000000000000000ff".to_string(),
            value: BigInt::from(0),
            to: Address::new("0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad"),
        }),
        simulation_status: SimulationStatus::Unattempted,
    }
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_direct_pool_into_weth() {
    let (x, weth) = (make_token_x(), known::weth_mainnet());
    let mut config = RoutingConfig::default();
    config.v3_pool_selection.top_n_direct_swaps = 2;

    let result = select_v3(vec![make_v3_subgraph("0xab", &x, &weth, "3000", 500.0)], &x, &weth, &config).await;
    let selections = &result.candidate_pools.selections;

    assert_eq!(selections.top_by_direct_swap_pool.len(), 1);
    assert_eq!(selections.top_by_direct_swap_pool[0].id, Address::new("0xab"));
    // Output is already the wrapped native token
    assert!(selections.top_by_eth_quote_token_pool.is_empty());
    assert_eq!(result.subgraph_pools.len(), 1);
}

#[tokio::test]
async fn test_empty_index_synthesizes_every_fee_tier() {
    let (x, y) = (make_token_x(), make_token_y());
    let mut config = RoutingConfig::default();
    config.v3_pool_selection.top_n_direct_swaps = 4;

    let result = select_v3(Vec::new(), &x, &y, &config).await;
    let direct = &result.candidate_pools.selections.top_by_direct_swap_pool;

    assert_eq!(direct.len(), 4);
    let fees: HashSet<&str> = direct.iter().map(|p| p.fee_tier.as_str()).collect();
    assert_eq!(fees, HashSet::from(["100", "500", "3000", "10000"]));
    assert!(direct.iter().all(|p| p.tvl_usd == 10_000.0));
}

#[tokio::test]
async fn test_selection_is_idempotent() {
    let (x, y) = (make_token_x(), make_token_y());
    let config = RoutingConfig::default();

    let first = select_v3(make_pool_set(), &x, &y, &config).await;
    let second = select_v3(make_pool_set(), &x, &y, &config).await;

    assert_eq!(first.candidate_pools, second.candidate_pools);
    assert_eq!(first.subgraph_pools, second.subgraph_pools);
}

#[tokio::test]
async fn test_no_pool_lands_in_two_buckets() {
    let (x, y) = (make_token_x(), make_token_y());
    let mut config = RoutingConfig::default();
    config.v3_pool_selection.top_n = 5;
    config.v3_pool_selection.top_n_token_in_out = 4;

    let v3 = select_v3(make_pool_set(), &x, &y, &config).await;
    assert_buckets_disjoint(&v3.candidate_pools.selections);

    let v2_pools: Vec<V2SubgraphPool> = make_pool_set()
        .into_iter()
        .map(|p| V2SubgraphPool {
            id: p.id,
            token0: p.token0,
            token1: p.token1,
            supply: p.tvl_usd,
            reserve: p.tvl_usd,
            reserve_usd: p.tvl_usd,
        })
        .chain([make_v2_subgraph("0x0b", &x, &known::usdt_mainnet(), 1_000.0)])
        .collect();
    let subgraph = InMemorySubgraphProvider::new(v2_pools);
    let tokens = make_tokens();
    let pool_provider = InMemoryV2PoolProvider::default();
    let v2 = get_v2_candidate_pools(CandidatePoolsParams {
        token_in: &x,
        token_out: &y,
        trade_type: TradeType::ExactOutput,
        routing_config: &config,
        subgraph_provider: &subgraph,
        token_provider: &tokens,
        pool_provider: &pool_provider as &dyn V2PoolProvider,
        blocked_token_list_provider: None,
        metrics: &NoopMetrics,
    })
    .await
    .unwrap();
    assert_buckets_disjoint(&v2.candidate_pools.selections);
}

// ---------------------------------------------------------------------------
// Quoting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_mixed_currency_amounts_rejected_before_quoting() {
    let provider = Arc::new(FnQuoteProvider::new(|_: &V2Route, amount: &CurrencyAmount, _| {
        AmountQuote::new(amount.clone(), Some(amount.quotient()))
    }));
    let quoter = V2Quoter::new(ChainId::Mainnet, Arc::new(InMemoryV2PoolProvider::default()), provider.clone());
    let amounts = vec![
        CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), 100),
        CurrencyAmount::from_raw_amount(known::dai_mainnet().into(), 100),
    ];
    let config = RoutingConfig::default();
    let weth = known::weth_mainnet();
    let request = QuoteRequest {
        amounts: &amounts,
        percents: &[50, 100],
        quote_token: &weth,
        trade_type: TradeType::ExactInput,
        routing_config: &config,
    };

    let err = quoter
        .get_quotes(&[], request, None, Some(&BigInt::from(1_000_000_000u64)))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "invalid_amounts");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_null_quotes_dropped_and_gas_moves_quote_the_right_way() {
    let (x, usdc) = (make_token_x(), known::usdc_mainnet());
    let v3_pools = InMemoryV3PoolProvider::new(vec![make_usd_pool(), make_x_usdc_pool()]);
    let v2_pools = InMemoryV2PoolProvider::default();
    let gas_model = V3GasModel::build(
        ChainId::Mainnet,
        BigInt::from(1_000_000_000u64),
        &v3_pools,
        &v2_pools,
        &usdc,
        &ProviderConfig::default(),
    )
    .await
    .unwrap();

    // The smallest split has no liquidity
    let provider = Arc::new(FnQuoteProvider::new(|_: &V3Route, amount: &CurrencyAmount, _| {
        if amount.quotient() < BigInt::from(500) {
            AmountQuote::new(amount.clone(), None)
        } else {
            AmountQuote::new(amount.clone(), Some(BigInt::from(1_000_000_000u64))).with_ticks(vec![BigInt::one()], vec![1])
        }
    }));
    let quoter = V3Quoter::new(Arc::new(v3_pools), provider);
    let route = V3Route::new(vec![make_x_usdc_pool()], x.clone(), usdc.clone()).unwrap();
    let amounts = vec![
        CurrencyAmount::from_raw_amount(x.clone().into(), 250),
        CurrencyAmount::from_raw_amount(x.clone().into(), 500),
        CurrencyAmount::from_raw_amount(x.clone().into(), 1_000),
    ];
    let config = RoutingConfig::default();

    for trade_type in [TradeType::ExactInput, TradeType::ExactOutput] {
        let request = QuoteRequest {
            amounts: &amounts,
            percents: &[25, 50, 100],
            quote_token: &usdc,
            trade_type,
            routing_config: &config,
        };
        let result = quoter
            .get_quotes(std::slice::from_ref(&route), request, None, Some(&gas_model))
            .await
            .unwrap();

        assert_eq!(result.routes_with_valid_quotes.len(), 2);
        for priced in &result.routes_with_valid_quotes {
            let quote = priced.quote();
            assert!(quote.percent >= 50);
            assert!(!quote.gas_cost_in_token.is_zero());
            match trade_type {
                TradeType::ExactInput => assert!(quote.quote_adjusted_for_gas < quote.quote),
                TradeType::ExactOutput => assert!(quote.quote_adjusted_for_gas > quote.quote),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation and gas accounting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_failed_estimate_keeps_route_and_marks_failed() {
    let sender = Address::new("0xabababababababababababababababababababab");
    let native = Currency::Native(ChainId::Mainnet);
    let chain_provider = InMemoryChainProvider::new().with_balance(&sender, &native, BigInt::from(10u64).pow(18));
    let simulator = EthEstimateGasSimulator::new(
        ChainId::Mainnet,
        Arc::new(chain_provider),
        Arc::new(InMemoryV2PoolProvider::default()),
        Arc::new(InMemoryV3PoolProvider::new(vec![make_usd_pool()])),
    );
    let route = make_swap_route(native, known::usdc_mainnet().into());

    let simulated = simulator
        .simulate(&sender, SwapType::UniversalRouter, route.clone(), None, &ProviderConfig::default())
        .await
        .unwrap();

    assert_eq!(simulated.simulation_status, SimulationStatus::Failed);
    assert_eq!(
        SwapRoute {
            simulation_status: SimulationStatus::Unattempted,
            ..simulated
        },
        route
    );
}

#[tokio::test]
async fn test_native_quote_token_needs_no_conversion_pool() {
    let route = make_swap_route(known::usdc_mainnet().into(), Currency::Native(ChainId::Mainnet));
    let v2_pools = InMemoryV2PoolProvider::default();
    let v3_pools = InMemoryV3PoolProvider::new(vec![make_usd_pool()]);

    let used = calculate_gas_used(
        ChainId::Mainnet,
        &route,
        &BigInt::from(200_000),
        &v2_pools,
        &v3_pools,
        None,
        &ProviderConfig::default(),
    )
    .await
    .unwrap();

    let expected_wei = BigInt::from(200_000u64 * 1_000_000_000u64);
    assert_eq!(used.estimated_gas_used_quote_token.quotient(), expected_wei);
    assert_eq!(
        used.estimated_gas_used_quote_token.currency,
        Currency::Token(known::weth_mainnet())
    );
    // 2e14 wei at 2500 USDC per WETH, in 6-decimal USDC
    assert_eq!(used.estimated_gas_used_usd.quotient(), BigInt::from(500_000));
    assert_eq!(used.quote_gas_adjusted.quotient(), BigInt::from(10u64).pow(18) - expected_wei);
    assert!(v2_pools.requests().is_empty());
}
