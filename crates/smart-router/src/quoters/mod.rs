//! Protocol quoters
//!
//! One quoter per family. Each turns candidate pools into routes, prices
//! every (route, split) pair through its quote provider and wraps the
//! non-null results as [`RouteWithValidQuote`]s.

pub mod mixed;
pub mod v2;
pub mod v3;

use std::collections::HashSet;

use chain_providers::{AmountQuote, TokenValidationResult, TokenValidatorProvider};
use router_core::metrics::names;
use router_core::{
    CurrencyAmount, MetricUnit, MetricsSink, Protocol, ProviderConfig, Result, RoutingConfig, RoutingError, Token,
    TradeType,
};

use crate::candidate_pools::CandidatePoolsBySelection;
use crate::entities::{RouteWithValidQuote, TickDetails};

pub use mixed::MixedQuoter;
pub use v2::V2Quoter;
pub use v3::V3Quoter;

/// What to quote: one amount per split, in a single currency
#[derive(Debug, Clone, Copy)]
pub struct QuoteRequest<'a> {
    pub amounts: &'a [CurrencyAmount],
    /// Share of the full trade each amount stands for
    pub percents: &'a [u32],
    pub quote_token: &'a Token,
    pub trade_type: TradeType,
    pub routing_config: &'a RoutingConfig,
}

/// Routes computed from a candidate set
#[derive(Debug, Clone)]
pub struct GetRoutesResult<R, P> {
    pub routes: Vec<R>,
    pub candidate_pools: CandidatePoolsBySelection<P>,
}

/// Priced routes, with the candidates they came from when known
#[derive(Debug, Clone)]
pub struct GetQuotesResult<P> {
    pub routes_with_valid_quotes: Vec<RouteWithValidQuote>,
    pub candidate_pools: Option<CandidatePoolsBySelection<P>>,
}

impl<P> GetQuotesResult<P> {
    pub(crate) fn empty(candidate_pools: Option<CandidatePoolsBySelection<P>>) -> Self {
        Self {
            routes_with_valid_quotes: Vec::new(),
            candidate_pools,
        }
    }
}

/// Reject empty or mixed-currency amount lists, and percents that don't line up
pub(crate) fn validate_amounts(amounts: &[CurrencyAmount], percents: &[u32]) -> Result<()> {
    let Some(first) = amounts.first() else {
        return Err(RoutingError::InvalidAmounts.into());
    };
    if amounts.iter().any(|amount| amount.currency != first.currency) || percents.len() != amounts.len() {
        return Err(RoutingError::InvalidAmounts.into());
    }
    Ok(())
}

/// Drop pools that route through a token known to fail simple transfers.
///
/// The trade's own tokens are never grounds for dropping, and tokens with no
/// validation result are assumed fine.
pub(crate) async fn apply_token_validator<P>(
    pools: Vec<P>,
    tokens_of: impl Fn(&P) -> [&Token; 2],
    token_in: &Token,
    token_out: &Token,
    validator: Option<&dyn TokenValidatorProvider>,
    config: &ProviderConfig,
) -> Result<Vec<P>> {
    let Some(validator) = validator else {
        return Ok(pools);
    };

    let mut seen = HashSet::new();
    let tokens: Vec<Token> = pools
        .iter()
        .flat_map(|pool| tokens_of(pool))
        .filter(|token| seen.insert(token.address.clone()))
        .cloned()
        .collect();
    let validations = validator.validate_tokens(&tokens, config).await?;

    let is_untransferable = |token: &Token| {
        if token == token_in || token == token_out {
            return false;
        }
        validations.get_validation_by_token(token) == Some(TokenValidationResult::Stf)
    };

    Ok(pools
        .into_iter()
        .filter(|pool| {
            let drop = tokens_of(pool).into_iter().any(|token| is_untransferable(token));
            if drop {
                let [a, b] = tokens_of(pool);
                tracing::info!(
                    "Dropping pool {}/{} because a token fails simple transfers",
                    a.display_symbol(),
                    b.display_symbol()
                );
            }
            !drop
        })
        .collect())
}

pub(crate) fn tick_details(amount_quote: &AmountQuote) -> TickDetails {
    TickDetails {
        sqrt_price_x96_after_list: amount_quote.sqrt_price_x96_after_list.clone(),
        initialized_ticks_crossed_list: amount_quote.initialized_ticks_crossed_list.clone(),
        quoter_gas_estimate: amount_quote.gas_estimate.clone(),
    }
}

pub(crate) fn put_quotes_fetched<R>(
    metrics: &dyn MetricsSink,
    protocol: Protocol,
    routes_with_quotes: &[(R, Vec<AmountQuote>)],
) {
    let fetched: usize = routes_with_quotes.iter().map(|(_, quotes)| quotes.len()).sum();
    metrics.put_metric(
        &names::prefixed(protocol_prefix(protocol), names::QUOTES_FETCHED),
        fetched as u64,
        MetricUnit::Count,
    );
}

pub(crate) fn protocol_prefix(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::V2 => "V2",
        Protocol::V3 => "V3",
        Protocol::Mixed => "Mixed",
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;
    use chain_providers::InMemoryTokenValidator;
    use router_core::tokens::known;
    use router_core::{ChainId, Currency};

    #[test]
    fn test_validate_amounts() {
        let usdc = CurrencyAmount::from_raw_amount(known::usdc_mainnet().into(), 10);
        let dai = CurrencyAmount::from_raw_amount(known::dai_mainnet().into(), 10);
        let native = CurrencyAmount::from_raw_amount(Currency::Native(ChainId::Mainnet), 10);

        assert!(validate_amounts(&[usdc.clone(), usdc.clone()], &[50, 100]).is_ok());
        assert!(validate_amounts(&[], &[]).is_err());
        assert!(validate_amounts(&[usdc.clone(), dai], &[50, 100]).is_err());
        assert!(validate_amounts(&[usdc.clone(), native], &[50, 100]).is_err());
        assert!(validate_amounts(&[usdc], &[50, 100]).is_err());
    }

    #[tokio::test]
    async fn test_token_validator_drops_only_intermediate_stf() {
        let (x, weth, dai, usdc) = (make_token_x(), weth(), known::dai_mainnet(), known::usdc_mainnet());
        let pools = vec![
            make_v2_pool(x.clone(), weth.clone()),
            make_v2_pool(weth.clone(), dai.clone()),
            make_v2_pool(x.clone(), usdc.clone()),
        ];
        let validator = InMemoryTokenValidator::new(vec![
            (x.address.clone(), TokenValidationResult::Stf),
            (weth.address.clone(), TokenValidationResult::Stf),
            (usdc.address.clone(), TokenValidationResult::Fot),
        ]);

        let kept = apply_token_validator(
            pools,
            |p| [&p.token0, &p.token1],
            &x,
            &dai,
            Some(&validator),
            &ProviderConfig::default(),
        )
        .await
        .unwrap();

        // Only the X/USDC pair avoids the untransferable WETH hop
        assert_eq!(kept.len(), 1);
        assert!(kept[0].involves_token(&usdc));
    }

    #[tokio::test]
    async fn test_no_validator_keeps_everything() {
        let pools = vec![make_v2_pool(make_token_x(), weth())];
        let kept = apply_token_validator(
            pools,
            |p| [&p.token0, &p.token1],
            &make_token_x(),
            &weth(),
            None,
            &ProviderConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(kept.len(), 1);
    }
}
