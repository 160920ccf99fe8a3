//! V3 pool state and errors

use std::fmt;

use num_bigint::BigInt;
use num_traits::{One, Signed};
use thiserror::Error;

use router_core::{AmountError, ChainId, Price, Token};

use crate::fee::FeeAmount;

/// V3 errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum V3Error {
    #[error("Unsupported fee tier: {0}")]
    UnsupportedFeeTier(String),

    #[error("Token {token} is not in pool {pool}")]
    TokenNotInPool { token: String, pool: String },

    #[error("Pool tokens must differ and share a chain")]
    InvalidPool,

    #[error("Square-root price must be positive in pool {pool}")]
    InvalidSqrtPrice { pool: String },

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Route is empty or disconnected")]
    InvalidRoute,

    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<V3Error> for router_core::Error {
    fn from(err: V3Error) -> Self {
        match err {
            V3Error::Amount(e) => router_core::Error::Amount(e),
            V3Error::UnsupportedFeeTier(fee) => router_core::RoutingError::UnsupportedFeeTier(fee).into(),
            other => router_core::RoutingError::InvalidPool {
                message: other.to_string(),
            }
            .into(),
        }
    }
}

/// Concentrated-liquidity pool snapshot with tokens sorted by address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Pool {
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeAmount,
    /// sqrt(token1 / token0) as a Q64.96 fixed-point number
    pub sqrt_price_x96: BigInt,
    /// In-range liquidity
    pub liquidity: BigInt,
    pub tick_current: i32,
}

impl V3Pool {
    pub fn new(
        token_a: Token,
        token_b: Token,
        fee: FeeAmount,
        sqrt_price_x96: impl Into<BigInt>,
        liquidity: impl Into<BigInt>,
        tick_current: i32,
    ) -> Result<Self, V3Error> {
        if token_a == token_b || token_a.chain != token_b.chain {
            return Err(V3Error::InvalidPool);
        }
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let sqrt_price_x96 = sqrt_price_x96.into();
        if !sqrt_price_x96.is_positive() {
            return Err(V3Error::InvalidSqrtPrice {
                pool: format!("{}/{}/{}", token0, token1, fee),
            });
        }
        Ok(Self {
            token0,
            token1,
            fee,
            sqrt_price_x96,
            liquidity: liquidity.into(),
            tick_current,
        })
    }

    pub fn chain(&self) -> ChainId {
        self.token0.chain
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        &self.token0 == token || &self.token1 == token
    }

    pub fn other_token(&self, token: &Token) -> Result<&Token, V3Error> {
        if &self.token0 == token {
            Ok(&self.token1)
        } else if &self.token1 == token {
            Ok(&self.token0)
        } else {
            Err(V3Error::TokenNotInPool {
                token: token.to_string(),
                pool: self.to_string(),
            })
        }
    }

    /// Price of token0 in token1: sqrtPriceX96^2 / 2^192
    pub fn token0_price(&self) -> Result<Price, V3Error> {
        let q192 = BigInt::one() << 192;
        Ok(Price::new(
            self.token0.clone().into(),
            self.token1.clone().into(),
            q192,
            &self.sqrt_price_x96 * &self.sqrt_price_x96,
        )?)
    }

    /// Price of token1 in token0
    pub fn token1_price(&self) -> Result<Price, V3Error> {
        Ok(self.token0_price()?.invert()?)
    }

    pub fn price_of(&self, token: &Token) -> Result<Price, V3Error> {
        if &self.token0 == token {
            self.token0_price()
        } else if &self.token1 == token {
            self.token1_price()
        } else {
            Err(V3Error::TokenNotInPool {
                token: token.to_string(),
                pool: self.to_string(),
            })
        }
    }
}

impl fmt::Display for V3Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.token0, self.token1, self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;
    use router_core::CurrencyAmount;

    fn q96() -> BigInt {
        BigInt::one() << 96
    }

    #[test]
    fn test_tokens_are_sorted() {
        let pool = V3Pool::new(
            known::weth_mainnet(),
            known::usdc_mainnet(),
            FeeAmount::Low,
            q96(),
            1_000u64,
            0,
        )
        .unwrap();
        assert_eq!(pool.token0, known::usdc_mainnet());
        assert_eq!(pool.to_string(), "USDC/WETH/500");
    }

    #[test]
    fn test_unit_price_at_q96() {
        let pool = V3Pool::new(
            known::dai_mainnet(),
            known::usdc_mainnet(),
            FeeAmount::Lowest,
            q96(),
            1u64,
            0,
        )
        .unwrap();
        let amount = CurrencyAmount::from_raw_amount(pool.token0.clone().into(), 12_345);
        let quoted = pool.token0_price().unwrap().quote(&amount).unwrap();
        assert_eq!(quoted.quotient(), BigInt::from(12_345));
        assert_eq!(quoted.currency, pool.token1.clone().into());
    }

    #[test]
    fn test_price_of_token1_inverts() {
        // sqrt price of 2 * Q96 means token0 is worth 4 token1
        let pool = V3Pool::new(
            known::usdc_mainnet(),
            known::weth_mainnet(),
            FeeAmount::Medium,
            q96() * 2,
            1u64,
            0,
        )
        .unwrap();
        let one_weth = CurrencyAmount::from_raw_amount(known::weth_mainnet().into(), 400);
        let in_usdc = pool.price_of(&known::weth_mainnet()).unwrap().quote(&one_weth).unwrap();
        assert_eq!(in_usdc.quotient(), BigInt::from(100));
    }

    #[test]
    fn test_invalid_pools_rejected() {
        let weth = known::weth_mainnet();
        assert_eq!(
            V3Pool::new(weth.clone(), weth.clone(), FeeAmount::Low, q96(), 1u64, 0),
            Err(V3Error::InvalidPool)
        );
        assert!(matches!(
            V3Pool::new(weth, known::usdc_mainnet(), FeeAmount::Low, 0u64, 1u64, 0),
            Err(V3Error::InvalidSqrtPrice { .. })
        ));
    }
}
