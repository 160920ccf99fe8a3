//! Gas models
//!
//! A gas model is built once per quote batch. It fixes the gas price, the
//! pools used to price native gas in USD and in the quote token, and any
//! extra overhead, then prices each quoted route.

pub mod mixed;
pub mod v2;
pub mod v3;

use num_bigint::BigInt;
use num_traits::Zero;

use amm_v2::V2Pool;
use amm_v3::{gas as v3_gas, FeeAmount, V3Pool};
use chain_providers::{V2PoolProvider, V3PoolProvider};
use router_core::tokens::{usd_gas_tokens, wrapped_native};
use router_core::{
    ChainId, Currency, CurrencyAmount, Price, ProviderConfig, Result, RoutingError, Token,
};

pub use mixed::MixedRouteGasModel;
pub use v2::V2GasModel;
pub use v3::V3GasModel;

/// Gas priced for one quoted route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasCostEstimate {
    pub gas_estimate: BigInt,
    pub gas_cost_in_token: CurrencyAmount,
    pub gas_cost_in_usd: CurrencyAmount,
}

/// Prices the gas of a route.
///
/// `initialized_ticks_crossed` is the per-hop tick count reported by the
/// quoter; families without ticks ignore it.
pub trait GasModel<R>: Send + Sync {
    fn estimate_gas_cost(&self, route: &R, initialized_ticks_crossed: &[u32]) -> Result<GasCostEstimate>;
}

// ---------------------------------------------------------------------------
// Reference pools
// ---------------------------------------------------------------------------

/// A pool used only for its spot price
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingPool {
    V2(V2Pool),
    V3(V3Pool),
}

impl PricingPool {
    /// Price of `token` in the pool's other token
    pub fn price_of(&self, token: &Token) -> Result<Price> {
        match self {
            Self::V2(pool) => Ok(pool.price_of(token)?),
            Self::V3(pool) => Ok(pool.price_of(token)?),
        }
    }

    /// The token on the other side of `token`
    pub fn other_token(&self, token: &Token) -> Result<Token> {
        match self {
            Self::V2(pool) => Ok(pool.other_token(token)?.clone()),
            Self::V3(pool) => Ok(pool.other_token(token)?.clone()),
        }
    }
}

/// Fee tiers in lookup order
const FEE_TIERS: [FeeAmount; 4] = FeeAmount::ALL;

/// The wrapped-native/`token` V2 pair, if it exists with both reserves set
pub async fn get_v2_native_pool(
    token: &Token,
    provider: &dyn V2PoolProvider,
    config: &ProviderConfig,
) -> Result<Option<V2Pool>> {
    let weth = wrapped_native(token.chain);
    let accessor = provider.get_pools(&[(weth.clone(), token.clone())], config).await?;
    match accessor.get_pool(&weth, token) {
        Some(pool) if !pool.has_empty_reserve() => Ok(Some(pool.clone())),
        pool => {
            tracing::error!(
                token = %token,
                found = pool.is_some(),
                "Could not find a valid {} V2 pool with {} for computing gas costs",
                weth,
                token
            );
            Ok(None)
        }
    }
}

/// The deepest wrapped-native/`token` V3 pool over all fee tiers
pub async fn get_highest_liquidity_v3_native_pool(
    token: &Token,
    provider: &dyn V3PoolProvider,
    config: &ProviderConfig,
) -> Result<Option<V3Pool>> {
    let native = wrapped_native(token.chain);
    let pairs: Vec<_> = FEE_TIERS
        .iter()
        .map(|fee| (native.clone(), token.clone(), *fee))
        .collect();
    let accessor = provider.get_pools(&pairs, config).await?;

    let best = FEE_TIERS
        .iter()
        .filter_map(|fee| accessor.get_pool(&native, token, *fee))
        .fold(None::<&V3Pool>, |best, pool| match best {
            Some(b) if b.liquidity > pool.liquidity => Some(b),
            _ => Some(pool),
        })
        .cloned();

    if best.is_none() {
        tracing::error!("Could not find a {} pool with {} for computing gas costs", native, token);
    }
    Ok(best)
}

/// The deepest wrapped-native/USD V3 pool; fatal if none exists
pub async fn get_highest_liquidity_v3_usd_pool(
    chain: ChainId,
    provider: &dyn V3PoolProvider,
    config: &ProviderConfig,
) -> Result<V3Pool> {
    let native = wrapped_native(chain);
    let usd_tokens = usd_gas_tokens(chain);
    let pairs: Vec<_> = FEE_TIERS
        .iter()
        .flat_map(|fee| usd_tokens.iter().map(|usd| (native.clone(), usd.clone(), *fee)))
        .collect();
    let accessor = provider.get_pools(&pairs, config).await?;

    let best = FEE_TIERS
        .iter()
        .flat_map(|fee| usd_tokens.iter().filter_map(|usd| accessor.get_pool(&native, usd, *fee)))
        .fold(None::<&V3Pool>, |best, pool| match best {
            Some(b) if b.liquidity > pool.liquidity => Some(b),
            _ => Some(pool),
        })
        .cloned();

    best.ok_or_else(|| {
        let err = RoutingError::NoUsdPool {
            chain,
            native: native.display_symbol().to_string(),
        };
        tracing::error!("{}", err);
        err.into()
    })
}

/// The wrapped-native/USD V2 pair with the deepest native reserve; fatal if none
pub async fn get_highest_liquidity_v2_usd_pool(
    chain: ChainId,
    provider: &dyn V2PoolProvider,
    config: &ProviderConfig,
) -> Result<V2Pool> {
    let native = wrapped_native(chain);
    let usd_tokens = usd_gas_tokens(chain);
    let pairs: Vec<_> = usd_tokens.iter().map(|usd| (native.clone(), usd.clone())).collect();
    let accessor = provider.get_pools(&pairs, config).await?;

    let best = usd_tokens
        .iter()
        .filter_map(|usd| accessor.get_pool(&native, usd))
        .filter(|pool| !pool.has_empty_reserve())
        .filter_map(|pool| pool.reserve_of(&native).ok().map(|reserve| (reserve.clone(), pool)))
        .fold(None::<(BigInt, &V2Pool)>, |best, (reserve, pool)| match best {
            Some((r, b)) if r >= reserve => Some((r, b)),
            _ => Some((reserve, pool)),
        })
        .map(|(_, pool)| pool.clone());

    best.ok_or_else(|| {
        let err = RoutingError::NoUsdPool {
            chain,
            native: native.display_symbol().to_string(),
        };
        tracing::error!("{}", err);
        err.into()
    })
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Extra gas for wrapping native input or unwrapping native output
pub fn native_overhead(amount: &Currency, quote: &Currency) -> BigInt {
    if amount.is_native() {
        BigInt::from(v3_gas::NATIVE_WRAP_OVERHEAD)
    } else if quote.is_native() {
        BigInt::from(v3_gas::NATIVE_UNWRAP_OVERHEAD)
    } else {
        BigInt::zero()
    }
}

/// Wei cost as an amount of the chain's wrapped native token
pub fn gas_cost_in_native(chain: ChainId, gas_cost_wei: BigInt) -> CurrencyAmount {
    CurrencyAmount::from_raw_amount(Currency::Token(wrapped_native(chain)), gas_cost_wei)
}

/// Convert a native cost through a native/USD pool
pub fn gas_cost_in_usd(usd_pool: &PricingPool, cost_native: &CurrencyAmount) -> Result<CurrencyAmount> {
    let native = cost_native.currency.wrapped();
    Ok(usd_pool.price_of(&native)?.quote(cost_native)?)
}

/// Convert a native cost through a native/quote-token pool
pub fn gas_cost_in_quote_token(native_pool: &PricingPool, cost_native: &CurrencyAmount) -> Result<CurrencyAmount> {
    let native = cost_native.currency.wrapped();
    Ok(native_pool.price_of(&native)?.quote(cost_native)?)
}

/// Pools and prices shared by every route priced in one batch
#[derive(Debug, Clone)]
pub(crate) struct GasPricing {
    pub chain: ChainId,
    pub gas_price_wei: BigInt,
    pub quote_token: Token,
    pub usd_pool: PricingPool,
    /// `None` when the quote token is the wrapped native token or no
    /// conversion pool exists
    pub native_quote_pool: Option<PricingPool>,
    pub overhead: BigInt,
}

impl GasPricing {
    fn usd_token(&self) -> Result<Token> {
        self.usd_pool.other_token(&wrapped_native(self.chain))
    }

    /// Price `gas_use` units at the batch gas price
    pub fn estimate(&self, gas_use: BigInt) -> Result<GasCostEstimate> {
        let cost_native = gas_cost_in_native(self.chain, &self.gas_price_wei * &gas_use);
        let gas_cost_in_usd = gas_cost_in_usd(&self.usd_pool, &cost_native)?;

        let gas_cost_in_token = if self.quote_token == wrapped_native(self.chain) {
            cost_native
        } else {
            match &self.native_quote_pool {
                Some(pool) => gas_cost_in_quote_token(pool, &cost_native)?,
                None => CurrencyAmount::zero(self.quote_token.clone().into()),
            }
        };

        Ok(GasCostEstimate {
            gas_estimate: gas_use,
            gas_cost_in_token,
            gas_cost_in_usd,
        })
    }

    /// Zero costs in the quote token and USD token
    pub fn zero(&self, gas_use: BigInt) -> Result<GasCostEstimate> {
        Ok(GasCostEstimate {
            gas_estimate: gas_use,
            gas_cost_in_token: CurrencyAmount::zero(self.quote_token.clone().into()),
            gas_cost_in_usd: CurrencyAmount::zero(self.usd_token()?.into()),
        })
    }
}
