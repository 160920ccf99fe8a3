//! V2 quoter
//!
//! V2 builds its own gas model per batch, so a gas price is mandatory.

use std::sync::Arc;
use std::time::Instant;

use num_bigint::BigInt;

use amm_v2::V2Route;
use chain_providers::{QuoteProvider, TokenValidatorProvider, V2PoolProvider, V2SubgraphPool};
use router_core::metrics::names;
use router_core::{
    ChainId, Currency, MetricsSink, NoopMetrics, Protocol, ProviderConfig, Result, RoutingConfig, RoutingError, Token,
    TradeType,
};

use super::{
    apply_token_validator, put_quotes_fetched, validate_amounts, GetQuotesResult, GetRoutesResult, QuoteRequest,
};
use crate::candidate_pools::{put_elapsed, CandidatePoolsBySelection, V2CandidatePools};
use crate::entities::{QuoteParams, RouteWithValidQuote};
use crate::gas_models::{native_overhead, V2GasModel};
use crate::routes::compute_all_v2_routes;

pub struct V2Quoter {
    chain: ChainId,
    pool_provider: Arc<dyn V2PoolProvider>,
    quote_provider: Arc<dyn QuoteProvider<V2Route>>,
    token_validator: Option<Arc<dyn TokenValidatorProvider>>,
    metrics: Arc<dyn MetricsSink>,
}

impl V2Quoter {
    pub fn new(
        chain: ChainId,
        pool_provider: Arc<dyn V2PoolProvider>,
        quote_provider: Arc<dyn QuoteProvider<V2Route>>,
    ) -> Self {
        Self {
            chain,
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

    /// Every route through the candidate pools, minus untransferable hops
    pub async fn get_routes(
        &self,
        token_in: &Token,
        token_out: &Token,
        candidates: &V2CandidatePools,
        routing_config: &RoutingConfig,
    ) -> Result<GetRoutesResult<V2Route, V2SubgraphPool>> {
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

        let routes = compute_all_v2_routes(token_in, token_out, &pools, routing_config.max_swaps_per_path);
        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("V2", names::GET_ROUTES_LOAD),
            before,
        );

        Ok(GetRoutesResult {
            routes,
            candidate_pools: candidates.candidate_pools.clone(),
        })
    }

    /// Price each route at each amount.
    ///
    /// Fails before any provider call when the gas price is missing or the
    /// amounts are unusable.
    pub async fn get_quotes(
        &self,
        routes: &[V2Route],
        request: QuoteRequest<'_>,
        candidate_pools: Option<CandidatePoolsBySelection<V2SubgraphPool>>,
        gas_price_wei: Option<&BigInt>,
    ) -> Result<GetQuotesResult<V2SubgraphPool>> {
        let before_get_quotes = Instant::now();
        tracing::info!("Starting to get V2 quotes");

        let gas_price_wei = gas_price_wei.ok_or(RoutingError::MissingGasPrice { protocol: "V2" })?;
        validate_amounts(request.amounts, request.percents)?;
        let amount_currency = request.amounts[0].currency.clone();

        if routes.is_empty() {
            return Ok(GetQuotesResult::empty(candidate_pools));
        }

        let provider_config = request.routing_config.provider_config();
        let before_quotes = Instant::now();
        tracing::info!(
            "Getting quotes for V2 for {} routes with {} amounts per route.",
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

        let gas_model = V2GasModel::build(
            self.chain,
            gas_price_wei.clone(),
            self.pool_provider.as_ref(),
            request.quote_token,
            &ProviderConfig {
                additional_gas_overhead: Some(native_overhead(
                    &amount_currency,
                    &Currency::Token(request.quote_token.clone()),
                )),
                ..provider_config
            },
        )
        .await?;

        put_elapsed(self.metrics.as_ref(), &names::prefixed("V2", names::QUOTES_LOAD), before_quotes);
        put_quotes_fetched(self.metrics.as_ref(), Protocol::V2, &routes_with_quotes);

        let mut routes_with_valid_quotes = Vec::new();
        for (route, quotes) in routes_with_quotes {
            for (amount_quote, percent) in quotes.into_iter().zip(request.percents) {
                let Some(raw_quote) = amount_quote.quote else {
                    tracing::debug!(
                        route = %route,
                        amount = %amount_quote.amount,
                        "Dropping a null V2 quote for route."
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
                routes_with_valid_quotes.push(RouteWithValidQuote::v2(route.clone(), params, &gas_model)?);
            }
        }

        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("V2", names::GET_QUOTES_LOAD),
            before_get_quotes,
        );
        Ok(GetQuotesResult {
            routes_with_valid_quotes,
            candidate_pools,
        })
    }

    /// Reload the pairs `routes` touch, recompute routes over them and quote
    pub async fn refresh_routes_then_get_quotes(
        &self,
        token_in: &Token,
        token_out: &Token,
        routes: &[V2Route],
        request: QuoteRequest<'_>,
        gas_price_wei: Option<&BigInt>,
    ) -> Result<GetQuotesResult<V2SubgraphPool>> {
        let token_pairs: Vec<(Token, Token)> = routes
            .iter()
            .flat_map(|route| route.pairs.iter().map(|pair| (pair.token0.clone(), pair.token1.clone())))
            .collect();

        let pool_accessor = self
            .pool_provider
            .get_pools(&token_pairs, &request.routing_config.provider_config())
            .await?;
        let routes = compute_all_v2_routes(
            token_in,
            token_out,
            pool_accessor.get_all_pools(),
            request.routing_config.max_swaps_per_path,
        );
        self.get_quotes(&routes, request, None, gas_price_wei).await
    }
}
