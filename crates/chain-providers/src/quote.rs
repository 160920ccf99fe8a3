//! Quote provider port
//!
//! A quote provider prices every (route, amount) pair of a batch. Failed
//! quotes come back as `None` so one bad pair never sinks the batch.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use num_bigint::BigInt;

use amm_v2::V2Route;
use router_core::{CurrencyAmount, ProviderConfig, Result, TradeType};

/// Quote for one amount along one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountQuote {
    pub amount: CurrencyAmount,
    /// Raw output (exact in) or input (exact out); `None` if quoting failed
    pub quote: Option<BigInt>,
    /// Pool prices after the swap, one per hop (V3 pools only)
    pub sqrt_price_x96_after_list: Vec<BigInt>,
    /// Initialized ticks crossed, one per hop (V3 pools only)
    pub initialized_ticks_crossed_list: Vec<u32>,
    /// Quoter contract's own gas estimate
    pub gas_estimate: Option<BigInt>,
}

impl AmountQuote {
    pub fn new(amount: CurrencyAmount, quote: Option<BigInt>) -> Self {
        Self {
            amount,
            quote,
            sqrt_price_x96_after_list: Vec::new(),
            initialized_ticks_crossed_list: Vec::new(),
            gas_estimate: None,
        }
    }

    pub fn with_ticks(mut self, sqrt_price_x96_after_list: Vec<BigInt>, initialized_ticks_crossed_list: Vec<u32>) -> Self {
        self.sqrt_price_x96_after_list = sqrt_price_x96_after_list;
        self.initialized_ticks_crossed_list = initialized_ticks_crossed_list;
        self
    }

    pub fn with_gas_estimate(mut self, gas_estimate: impl Into<BigInt>) -> Self {
        self.gas_estimate = Some(gas_estimate.into());
        self
    }
}

/// A route with one quote per requested amount, in amount order
pub type RouteWithQuotes<R> = (R, Vec<AmountQuote>);

#[async_trait::async_trait]
pub trait QuoteProvider<R: Send + Sync + 'static>: Send + Sync {
    async fn get_quotes_many_exact_in(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[R],
        config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<R>>>;

    async fn get_quotes_many_exact_out(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[R],
        config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<R>>>;
}

// ---------------------------------------------------------------------------
// Local V2 quoting from pair reserves
// ---------------------------------------------------------------------------

/// Prices V2 routes off the reserves carried by each pair
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalV2QuoteProvider;

impl LocalV2QuoteProvider {
    fn quote_all(
        amounts: &[CurrencyAmount],
        routes: &[V2Route],
        quote_fn: impl Fn(&V2Route, &BigInt) -> Option<BigInt>,
    ) -> Vec<RouteWithQuotes<V2Route>> {
        routes
            .iter()
            .map(|route| {
                let quotes = amounts
                    .iter()
                    .map(|amount| AmountQuote::new(amount.clone(), quote_fn(route, &amount.quotient())))
                    .collect();
                (route.clone(), quotes)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl QuoteProvider<V2Route> for LocalV2QuoteProvider {
    async fn get_quotes_many_exact_in(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[V2Route],
        _config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<V2Route>>> {
        Ok(Self::quote_all(amounts, routes, |route, amount| {
            route
                .quote_exact_in(amount)
                .map_err(|e| tracing::debug!(route = %route, error = %e, "Local exact-in quote failed"))
                .ok()
        }))
    }

    async fn get_quotes_many_exact_out(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[V2Route],
        _config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<V2Route>>> {
        Ok(Self::quote_all(amounts, routes, |route, amount| {
            route
                .quote_exact_out(amount)
                .map_err(|e| tracing::debug!(route = %route, error = %e, "Local exact-out quote failed"))
                .ok()
        }))
    }
}

// ---------------------------------------------------------------------------
// Scripted quoting
// ---------------------------------------------------------------------------

/// Quotes every pair through a closure and counts batch calls
pub struct FnQuoteProvider<R, F> {
    quote_fn: F,
    calls: AtomicUsize,
    _route: PhantomData<fn() -> R>,
}

impl<R, F> FnQuoteProvider<R, F>
where
    F: Fn(&R, &CurrencyAmount, TradeType) -> AmountQuote + Send + Sync,
{
    pub fn new(quote_fn: F) -> Self {
        Self {
            quote_fn,
            calls: AtomicUsize::new(0),
            _route: PhantomData,
        }
    }

    /// Number of batch calls served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn quote_all(&self, amounts: &[CurrencyAmount], routes: &[R], trade_type: TradeType) -> Vec<RouteWithQuotes<R>>
    where
        R: Clone,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        routes
            .iter()
            .map(|route| {
                let quotes = amounts
                    .iter()
                    .map(|amount| (self.quote_fn)(route, amount, trade_type))
                    .collect();
                (route.clone(), quotes)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl<R, F> QuoteProvider<R> for FnQuoteProvider<R, F>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(&R, &CurrencyAmount, TradeType) -> AmountQuote + Send + Sync,
{
    async fn get_quotes_many_exact_in(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[R],
        _config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<R>>> {
        Ok(self.quote_all(amounts, routes, TradeType::ExactInput))
    }

    async fn get_quotes_many_exact_out(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[R],
        _config: &ProviderConfig,
    ) -> Result<Vec<RouteWithQuotes<R>>> {
        Ok(self.quote_all(amounts, routes, TradeType::ExactOutput))
    }
}
