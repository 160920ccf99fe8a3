//! Quoted routes
//!
//! A [`RouteWithValidQuote`] is one (route, split) pair that a quote provider
//! priced successfully. Gas is priced when the value is built, so every
//! candidate carries a gas-adjusted quote that can be compared across
//! protocols.

use std::fmt;

use num_bigint::BigInt;

use amm_v2::V2Route;
use amm_v3::V3Route;
use router_core::{Address, CurrencyAmount, Protocol, Result, Token, TradeType};

use crate::gas_models::{GasCostEstimate, GasModel};
use crate::routes::MixedRoute;

/// Inputs shared by every quoted route
#[derive(Debug, Clone)]
pub struct QuoteParams {
    /// The split of the trade this quote is for
    pub amount: CurrencyAmount,
    /// Raw provider quote in quote-token units
    pub raw_quote: BigInt,
    pub percent: u32,
    pub quote_token: Token,
    pub trade_type: TradeType,
}

/// Per-hop data reported by concentrated-liquidity quoters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickDetails {
    pub sqrt_price_x96_after_list: Vec<BigInt>,
    pub initialized_ticks_crossed_list: Vec<u32>,
    pub quoter_gas_estimate: Option<BigInt>,
}

/// Quote fields common to every protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuote {
    pub amount: CurrencyAmount,
    pub raw_quote: BigInt,
    pub quote: CurrencyAmount,
    pub percent: u32,
    pub quote_token: Token,
    pub trade_type: TradeType,
    pub gas_estimate: BigInt,
    pub gas_cost_in_token: CurrencyAmount,
    pub gas_cost_in_usd: CurrencyAmount,
    pub quote_adjusted_for_gas: CurrencyAmount,
    pub token_path: Vec<Token>,
    pub pool_addresses: Vec<Address>,
}

impl ValidQuote {
    fn new(params: QuoteParams, gas: GasCostEstimate, token_path: Vec<Token>, pool_addresses: Vec<Address>) -> Result<Self> {
        let quote = CurrencyAmount::from_raw_amount(params.quote_token.clone().into(), params.raw_quote.clone());
        let quote_adjusted_for_gas = adjust_quote_for_gas(&quote, &gas.gas_cost_in_token, params.trade_type)?;

        Ok(Self {
            amount: params.amount,
            raw_quote: params.raw_quote,
            quote,
            percent: params.percent,
            quote_token: params.quote_token,
            trade_type: params.trade_type,
            gas_estimate: gas.gas_estimate,
            gas_cost_in_token: gas.gas_cost_in_token,
            gas_cost_in_usd: gas.gas_cost_in_usd,
            quote_adjusted_for_gas,
            token_path,
            pool_addresses,
        })
    }
}

/// Exact in gets less output, exact out needs more input.
///
/// The gas cost is retagged to the quote's currency; exact-in results
/// saturate at zero.
pub fn adjust_quote_for_gas(
    quote: &CurrencyAmount,
    gas_cost_in_token: &CurrencyAmount,
    trade_type: TradeType,
) -> Result<CurrencyAmount> {
    let gas_cost = gas_cost_in_token.with_currency(quote.currency.clone());
    match trade_type {
        TradeType::ExactInput => {
            if gas_cost > *quote {
                Ok(CurrencyAmount::zero(quote.currency.clone()))
            } else {
                Ok(quote.subtract(&gas_cost)?)
            }
        }
        TradeType::ExactOutput => Ok(quote.add(&gas_cost)?),
    }
}

/// A priced route of one protocol family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteWithValidQuote {
    V2 {
        route: V2Route,
        quote: ValidQuote,
    },
    V3 {
        route: V3Route,
        quote: ValidQuote,
        ticks: TickDetails,
    },
    Mixed {
        route: MixedRoute,
        quote: ValidQuote,
        ticks: TickDetails,
    },
}

impl RouteWithValidQuote {
    pub fn v2(route: V2Route, params: QuoteParams, gas_model: &dyn GasModel<V2Route>) -> Result<Self> {
        let gas = gas_model.estimate_gas_cost(&route, &[])?;
        let pool_addresses = route
            .pairs
            .iter()
            .map(|pair| Ok(amm_v2::compute_pair_address(&pair.token0, &pair.token1)?.pool_address))
            .collect::<Result<Vec<_>>>()?;
        let quote = ValidQuote::new(params, gas, route.path.clone(), pool_addresses)?;
        Ok(Self::V2 { route, quote })
    }

    pub fn v3(
        route: V3Route,
        params: QuoteParams,
        ticks: TickDetails,
        gas_model: &dyn GasModel<V3Route>,
    ) -> Result<Self> {
        let gas = gas_model.estimate_gas_cost(&route, &ticks.initialized_ticks_crossed_list)?;
        let pool_addresses = route
            .pools
            .iter()
            .map(|pool| Ok(amm_v3::compute_pool_address(&pool.token0, &pool.token1, pool.fee)?.pool_address))
            .collect::<Result<Vec<_>>>()?;
        let quote = ValidQuote::new(params, gas, route.path.clone(), pool_addresses)?;
        Ok(Self::V3 { route, quote, ticks })
    }

    pub fn mixed(
        route: MixedRoute,
        params: QuoteParams,
        ticks: TickDetails,
        gas_model: &dyn GasModel<MixedRoute>,
    ) -> Result<Self> {
        let gas = gas_model.estimate_gas_cost(&route, &ticks.initialized_ticks_crossed_list)?;
        let pool_addresses = route
            .pools
            .iter()
            .map(|pool| Ok(pool.address()?))
            .collect::<Result<Vec<_>>>()?;
        let quote = ValidQuote::new(params, gas, route.path.clone(), pool_addresses)?;
        Ok(Self::Mixed { route, quote, ticks })
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::V2 { .. } => Protocol::V2,
            Self::V3 { .. } => Protocol::V3,
            Self::Mixed { .. } => Protocol::Mixed,
        }
    }

    pub fn quote(&self) -> &ValidQuote {
        match self {
            Self::V2 { quote, .. } | Self::V3 { quote, .. } | Self::Mixed { quote, .. } => quote,
        }
    }

    /// Tick data for concentrated-liquidity hops, if any
    pub fn ticks(&self) -> Option<&TickDetails> {
        match self {
            Self::V2 { .. } => None,
            Self::V3 { ticks, .. } | Self::Mixed { ticks, .. } => Some(ticks),
        }
    }
}

impl fmt::Display for RouteWithValidQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = self.quote();
        match self {
            Self::V2 { route, .. } => write!(f, "{}% QuoteA {}", quote.percent, route)?,
            Self::V3 { route, .. } => write!(f, "{}% QuoteA {}", quote.percent, route)?,
            Self::Mixed { route, .. } => write!(f, "{}% QuoteA {}", quote.percent, route)?,
        }
        write!(f, " = {}", quote.quote_adjusted_for_gas)
    }
}
