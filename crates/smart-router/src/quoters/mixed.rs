//! Mixed-route quoter
//!
//! Routes span both families. Gas is priced by a prebuilt mixed gas model.

use std::sync::Arc;
use std::time::Instant;

use amm_v3::FeeAmount;
use chain_providers::{QuoteProvider, TokenValidatorProvider, V2PoolProvider, V3PoolProvider};
use router_core::metrics::names;
use router_core::{MetricsSink, NoopMetrics, Protocol, Result, RoutingConfig, RoutingError, Token, TradeType};

use super::{
    apply_token_validator, put_quotes_fetched, tick_details, validate_amounts, GetQuotesResult, GetRoutesResult,
    QuoteRequest,
};
use crate::candidate_pools::{put_elapsed, CandidatePoolsBySelection, MixedCandidatePools, MixedSubgraphPool};
use crate::entities::{QuoteParams, RouteWithValidQuote};
use crate::gas_models::GasModel;
use crate::routes::{compute_all_mixed_routes, MixedPool, MixedRoute};

pub struct MixedQuoter {
    v2_pool_provider: Arc<dyn V2PoolProvider>,
    v3_pool_provider: Arc<dyn V3PoolProvider>,
    quote_provider: Arc<dyn QuoteProvider<MixedRoute>>,
    token_validator: Option<Arc<dyn TokenValidatorProvider>>,
    metrics: Arc<dyn MetricsSink>,
}

impl MixedQuoter {
    pub fn new(
        v2_pool_provider: Arc<dyn V2PoolProvider>,
        v3_pool_provider: Arc<dyn V3PoolProvider>,
        quote_provider: Arc<dyn QuoteProvider<MixedRoute>>,
    ) -> Self {
        Self {
            v2_pool_provider,
            v3_pool_provider,
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
        candidates: &MixedCandidatePools,
        routing_config: &RoutingConfig,
    ) -> Result<GetRoutesResult<MixedRoute, MixedSubgraphPool>> {
        let before = Instant::now();
        let pools: Vec<MixedPool> = candidates
            .v2_pool_accessor
            .get_all_pools()
            .iter()
            .cloned()
            .map(MixedPool::V2)
            .chain(candidates.v3_pool_accessor.get_all_pools().iter().cloned().map(MixedPool::V3))
            .collect();
        let pools = apply_token_validator(
            pools,
            |pool| [pool.token0(), pool.token1()],
            token_in,
            token_out,
            self.token_validator.as_deref(),
            &routing_config.provider_config(),
        )
        .await?;

        let routes = compute_all_mixed_routes(token_in, token_out, &pools, routing_config.max_swaps_per_path);
        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("Mixed", names::GET_ROUTES_LOAD),
            before,
        );

        Ok(GetRoutesResult {
            routes,
            candidate_pools: candidates.candidate_pools.clone(),
        })
    }

    pub async fn get_quotes(
        &self,
        routes: &[MixedRoute],
        request: QuoteRequest<'_>,
        candidate_pools: Option<CandidatePoolsBySelection<MixedSubgraphPool>>,
        gas_model: Option<&dyn GasModel<MixedRoute>>,
    ) -> Result<GetQuotesResult<MixedSubgraphPool>> {
        let before_get_quotes = Instant::now();
        tracing::info!("Starting to get mixed quotes");

        let gas_model = gas_model.ok_or(RoutingError::MissingGasModel { protocol: "mixed" })?;
        validate_amounts(request.amounts, request.percents)?;
        if request.trade_type != TradeType::ExactInput {
            return Err(RoutingError::UnsupportedTradeType(
                "mixed routes only support exact input".to_string(),
            )
            .into());
        }

        if routes.is_empty() {
            return Ok(GetQuotesResult::empty(candidate_pools));
        }

        let before_quotes = Instant::now();
        tracing::info!(
            "Getting quotes for mixed for {} routes with {} amounts per route.",
            routes.len(),
            request.amounts.len()
        );
        let routes_with_quotes = self
            .quote_provider
            .get_quotes_many_exact_in(request.amounts, routes, &request.routing_config.provider_config())
            .await?;
        put_elapsed(self.metrics.as_ref(), &names::prefixed("Mixed", names::QUOTES_LOAD), before_quotes);
        put_quotes_fetched(self.metrics.as_ref(), Protocol::Mixed, &routes_with_quotes);

        let mut routes_with_valid_quotes = Vec::new();
        for (route, quotes) in routes_with_quotes {
            for (amount_quote, percent) in quotes.into_iter().zip(request.percents) {
                let ticks = tick_details(&amount_quote);
                let Some(raw_quote) = amount_quote.quote else {
                    tracing::debug!(
                        route = %route,
                        amount = %amount_quote.amount,
                        "Dropping a null mixed quote for route."
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
                routes_with_valid_quotes.push(RouteWithValidQuote::mixed(route.clone(), params, ticks, gas_model)?);
            }
        }

        put_elapsed(
            self.metrics.as_ref(),
            &names::prefixed("Mixed", names::GET_QUOTES_LOAD),
            before_get_quotes,
        );
        Ok(GetQuotesResult {
            routes_with_valid_quotes,
            candidate_pools,
        })
    }

    /// Reload both families' pools for the routes, recompute and quote
    pub async fn refresh_routes_then_get_quotes(
        &self,
        token_in: &Token,
        token_out: &Token,
        routes: &[MixedRoute],
        request: QuoteRequest<'_>,
        gas_model: Option<&dyn GasModel<MixedRoute>>,
    ) -> Result<GetQuotesResult<MixedSubgraphPool>> {
        let mut v2_pairs: Vec<(Token, Token)> = Vec::new();
        let mut v3_triples: Vec<(Token, Token, FeeAmount)> = Vec::new();
        for pool in routes.iter().flat_map(|route| route.pools.iter()) {
            match pool {
                MixedPool::V2(pair) => v2_pairs.push((pair.token0.clone(), pair.token1.clone())),
                MixedPool::V3(pool) => v3_triples.push((pool.token0.clone(), pool.token1.clone(), pool.fee)),
            }
        }

        let provider_config = request.routing_config.provider_config();
        let (v2_accessor, v3_accessor) = futures::future::try_join(
            self.v2_pool_provider.get_pools(&v2_pairs, &provider_config),
            self.v3_pool_provider.get_pools(&v3_triples, &provider_config),
        )
        .await?;

        let pools: Vec<MixedPool> = v2_accessor
            .get_all_pools()
            .iter()
            .cloned()
            .map(MixedPool::V2)
            .chain(v3_accessor.get_all_pools().iter().cloned().map(MixedPool::V3))
            .collect();
        let routes = compute_all_mixed_routes(token_in, token_out, &pools, request.routing_config.max_swaps_per_path);
        self.get_quotes(&routes, request, None, gas_model).await
    }
}
