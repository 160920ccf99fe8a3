//! V3 quoter

use std::sync::Arc;
use std::time::Instant;

use amm_v3::{FeeAmount, V3Route};
use chain_providers::{QuoteProvider, TokenValidatorProvider, V3PoolProvider, V3SubgraphPool};
use router_core::metrics::names;
use router_core::{MetricsSink, NoopMetrics, Protocol, Result, RoutingConfig, RoutingError, Token, TradeType};

use super::{
    apply_token_validator, put_quotes_fetched, tick_details, validate_amounts, GetQuotesResult, GetRoutesResult,
    QuoteRequest,
};
use crate::candidate_pools::{put_elapsed, CandidatePoolsBySelection, V3CandidatePools};
use crate::entities::{QuoteParams, RouteWithValidQuote};
use crate::gas_models::GasModel;
use crate::routes::compute_all_v3_routes;

pub struct V3Quoter {
    pool_provider: Arc<dyn V3PoolProvider>,
    quote_provider: Arc<dyn QuoteProvider<V3Route>>,
    token_validator: Option<Arc<dyn TokenValidatorProvider>>,
    metrics: Arc<dyn MetricsSink>,
}

impl V3Quoter {
    pub fn new(pool_provider: Arc<dyn V3PoolProvider>, quote_provider: Arc<dyn QuoteProvider<V3Route>>) -> Self {
        Self {
            pool_provider,
            quote_provider,
            token_validator: None,
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_token_validator(mut self, validator: Arc<dyn TokenValidatorProvider>) -> Self {
        self.token_validator = Some(validator);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn get_routes(
        &self,
        token_in: &Token,
        token_out: &Token,
        candidates: &V3CandidatePools,
        routing_config: &RoutingConfig,
    ) -> Result<GetRoutesResult<V3Route, V3SubgraphPool>> {
        let before = Instant::now();
        let pools = apply_token_validator(
            candidates.pool_accessor.get_all_pools().to_vec(),
            |pool| [&pool.token0, &pool.token1],
            token_in,
            token_out,
            self.token_validator.as_deref(),
            &routing_config.provider_config(),
        )
        .await?;

        let routes = compute_all_v3_routes(token_in, token_out, &pools, routing_config.max_swaps_per_path);
        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("V3", names::GET_ROUTES_LOAD),
            before,
        );

        Ok(GetRoutesResult {
            routes,
            candidate_pools: candidates.candidate_pools.clone(),
        })
    }

    /// Price each route at each amount with a prebuilt gas model
    pub async fn get_quotes(
        &self,
        routes: &[V3Route],
        request: QuoteRequest<'_>,
        candidate_pools: Option<CandidatePoolsBySelection<V3SubgraphPool>>,
        gas_model: Option<&dyn GasModel<V3Route>>,
    ) -> Result<GetQuotesResult<V3SubgraphPool>> {
        let before_get_quotes = Instant::now();
        tracing::info!("Starting to get V3 quotes");

        let gas_model = gas_model.ok_or(RoutingError::MissingGasModel { protocol: "V3" })?;
        validate_amounts(request.amounts, request.percents)?;

        if routes.is_empty() {
            return Ok(GetQuotesResult::empty(candidate_pools));
        }

        let provider_config = request.routing_config.provider_config();
        let before_quotes = Instant::now();
        tracing::info!(
            "Getting quotes for V3 for {} routes with {} amounts per route.",
            routes.len(),
            request.amounts.len()
        );
        let routes_with_quotes = match request.trade_type {
            TradeType::ExactInput => {
                self.quote_provider
                    .get_quotes_many_exact_in(request.amounts, routes, &provider_config)
                    .await?
            }
            TradeType::ExactOutput => {
                self.quote_provider
                    .get_quotes_many_exact_out(request.amounts, routes, &provider_config)
                    .await?
            }
        };
        put_elapsed(self.metrics.as_ref(), &names::prefixed("V3", names::QUOTES_LOAD), before_quotes);
        put_quotes_fetched(self.metrics.as_ref(), Protocol::V3, &routes_with_quotes);

        let mut routes_with_valid_quotes = Vec::new();
        for (route, quotes) in routes_with_quotes {
            for (amount_quote, percent) in quotes.into_iter().zip(request.percents) {
                let ticks = tick_details(&amount_quote);
                let Some(raw_quote) = amount_quote.quote else {
                    tracing::debug!(
                        route = %route,
                        amount = %amount_quote.amount,
                        "Dropping a null V3 quote for route."
                    );
                    continue;
                };
                let params = QuoteParams {
                    amount: amount_quote.amount,
                    raw_quote,
                    percent: *percent,
                    quote_token: request.quote_token.clone(),
                    trade_type: request.trade_type,
                };
                routes_with_valid_quotes.push(RouteWithValidQuote::v3(route.clone(), params, ticks, gas_model)?);
            }
        }

        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("V3", names::GET_QUOTES_LOAD),
            before_get_quotes,
        );
        Ok(GetQuotesResult {
            routes_with_valid_quotes,
            candidate_pools,
        })
    }

    /// Reload the pools `routes` touch, recompute routes over them and quote
    pub async fn refresh_routes_then_get_quotes(
        &self,
        token_in: &Token,
        token_out: &Token,
        routes: &[V3Route],
        request: QuoteRequest<'_>,
        gas_model: Option<&dyn GasModel<V3Route>>,
    ) -> Result<GetQuotesResult<V3SubgraphPool>> {
        let token_pairs: Vec<(Token, Token, FeeAmount)> = routes
            .iter()
            .flat_map(|route| {
                route
                    .pools
                    .iter()
                    .map(|pool| (pool.token0.clone(), pool.token1.clone(), pool.fee))
            })
            .collect();

        let pool_accessor = self
            .pool_provider
            .get_pools(&token_pairs, &request.routing_config.provider_config())
            .await?;
        let routes = compute_all_v3_routes(
            token_in,
            token_out,
            pool_accessor.get_all_pools(),
            request.routing_config.max_swaps_per_path,
        );
        self.get_quotes(&routes, request, None, gas_model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_models::GasCostEstimate;
    use crate::quoters::test_fixtures::*;
    use chain_providers::{AmountQuote, FnQuoteProvider, InMemoryV3PoolProvider};
    use num_bigint::BigInt;
    use router_core::tokens::known;
    use router_core::CurrencyAmount;

    /// Charges 1000 quote-token units per crossed tick
    struct TickGas;

    impl GasModel<V3Route> for TickGas {
        fn estimate_gas_cost(&self, _route: &V3Route, ticks: &[u32]) -> Result<GasCostEstimate> {
            let ticks: u32 = ticks.iter().sum();
            Ok(GasCostEstimate {
                gas_estimate: BigInt::from(ticks),
                gas_cost_in_token: CurrencyAmount::from_raw_amount(known::dai_mainnet().into(), ticks * 1_000),
                gas_cost_in_usd: CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), ticks),
            })
        }
    }

    fn make_route() -> V3Route {
        let pool = make_v3_pool(make_token_x(), known::dai_mainnet(), FeeAmount::Medium);
        V3Route::new(vec![pool], make_token_x(), known::dai_mainnet()).unwrap()
    }

    fn make_request<'a>(
        amounts: &'a [CurrencyAmount],
        percents: &'a [u32],
        quote_token: &'a Token,
        trade_type: TradeType,
        config: &'a RoutingConfig,
    ) -> QuoteRequest<'a> {
        QuoteRequest {
            amounts,
            percents,
            quote_token,
            trade_type,
            routing_config: config,
        }
    }

    #[tokio::test]
    async fn test_missing_gas_model_is_fatal() {
        let quoter = V3Quoter::new(
            Arc::new(InMemoryV3PoolProvider::default()),
            Arc::new(FnQuoteProvider::new(|_: &V3Route, amount: &CurrencyAmount, _| {
                AmountQuote::new(amount.clone(), None)
            })),
        );
        let amounts = vec![CurrencyAmount::from_raw_amount(make_token_x().into(), 10)];
        let config = RoutingConfig::default();
        let dai = known::dai_mainnet();
        let err = quoter
            .get_quotes(
                &[make_route()],
                make_request(&amounts, &[100], &dai, TradeType::ExactInput, &config),
                None,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "missing_gas_model");
    }

    #[tokio::test]
    async fn test_tick_data_reaches_gas_model() {
        let provider = Arc::new(FnQuoteProvider::new(|_: &V3Route, amount: &CurrencyAmount, _| {
            AmountQuote::new(amount.clone(), Some(BigInt::from(100_000)))
                .with_ticks(vec![BigInt::from(1)], vec![3])
                .with_gas_estimate(90_000u64)
        }));
        let quoter = V3Quoter::new(Arc::new(InMemoryV3PoolProvider::default()), provider);
        let amounts = vec![CurrencyAmount::from_raw_amount(make_token_x().into(), 10)];
        let config = RoutingConfig::default();
        let dai = known::dai_mainnet();

        let exact_out = quoter
            .get_quotes(
                &[make_route()],
                make_request(&amounts, &[100], &dai, TradeType::ExactOutput, &config),
                None,
                Some(&TickGas),
            )
            .await
            .unwrap();

        let route = &exact_out.routes_with_valid_quotes[0];
        let quote = route.quote();
        assert_eq!(quote.gas_estimate, BigInt::from(3));
        assert_eq!(quote.quote_adjusted_for_gas.quotient(), BigInt::from(103_000));
        assert!(quote.quote_adjusted_for_gas >= quote.quote);
        let ticks = route.ticks().unwrap();
        assert_eq!(ticks.initialized_ticks_crossed_list, vec![3]);
        assert_eq!(ticks.quoter_gas_estimate, Some(BigInt::from(90_000)));
    }

    #[tokio::test]
    async fn test_empty_routes_short_circuit() {
        let provider = Arc::new(FnQuoteProvider::new(|_: &V3Route, amount: &CurrencyAmount, _| {
            AmountQuote::new(amount.clone(), None)
        }));
        let quoter = V3Quoter::new(Arc::new(InMemoryV3PoolProvider::default()), provider.clone());
        let amounts = vec![CurrencyAmount::from_raw_amount(make_token_x().into(), 10)];
        let config = RoutingConfig::default();
        let dai = known::dai_mainnet();
        let result = quoter
            .get_quotes(
                &[],
                make_request(&amounts, &[100], &dai, TradeType::ExactInput, &config),
                None,
                Some(&TickGas),
            )
            .await
            .unwrap();
        assert!(result.routes_with_valid_quotes.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
