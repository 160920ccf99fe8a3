//! V2 pool state and errors

use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;
use thiserror::Error;

use router_core::{AmountError, ChainId, Currency, CurrencyAmount, Price, Token};

use crate::calculator::{calculate_input, calculate_output};

/// V2 errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum V2Error {
    #[error("Insufficient reserves in pair {pair}")]
    InsufficientReserves { pair: String },

    #[error("Insufficient input amount for pair {pair}")]
    InsufficientInputAmount { pair: String },

    #[error("Token {token} is not in pair {pair}")]
    TokenNotInPair { token: String, pair: String },

    #[error("Pair tokens must differ and share a chain")]
    InvalidPair,

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Route is empty or disconnected")]
    InvalidRoute,

    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<V2Error> for router_core::Error {
    fn from(err: V2Error) -> Self {
        match err {
            V2Error::Amount(e) => router_core::Error::Amount(e),
            other => router_core::RoutingError::InvalidPool {
                message: other.to_string(),
            }
            .into(),
        }
    }
}

/// Constant-product pair with tokens sorted by address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Pool {
    pub token0: Token,
    pub token1: Token,
    pub reserve0: BigInt,
    pub reserve1: BigInt,
}

impl V2Pool {
    /// Build a pair in either token order
    pub fn new(
        token_a: Token,
        reserve_a: impl Into<BigInt>,
        token_b: Token,
        reserve_b: impl Into<BigInt>,
    ) -> Result<Self, V2Error> {
        if token_a == token_b || token_a.chain != token_b.chain {
            return Err(V2Error::InvalidPair);
        }
        let (reserve_a, reserve_b) = (reserve_a.into(), reserve_b.into());
        if token_a.sorts_before(&token_b) {
            Ok(Self {
                token0: token_a,
                token1: token_b,
                reserve0: reserve_a,
                reserve1: reserve_b,
            })
        } else {
            Ok(Self {
                token0: token_b,
                token1: token_a,
                reserve0: reserve_b,
                reserve1: reserve_a,
            })
        }
    }

    pub fn chain(&self) -> ChainId {
        self.token0.chain
    }

    pub fn involves_token(&self, token: &Token) -> bool {
        &self.token0 == token || &self.token1 == token
    }

    /// The token on the other side of `token`
    pub fn other_token(&self, token: &Token) -> Result<&Token, V2Error> {
        if &self.token0 == token {
            Ok(&self.token1)
        } else if &self.token1 == token {
            Ok(&self.token0)
        } else {
            Err(self.not_in_pair(token))
        }
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&BigInt, V2Error> {
        if &self.token0 == token {
            Ok(&self.reserve0)
        } else if &self.token1 == token {
            Ok(&self.reserve1)
        } else {
            Err(self.not_in_pair(token))
        }
    }

    pub fn has_empty_reserve(&self) -> bool {
        self.reserve0.is_zero() || self.reserve1.is_zero()
    }

    /// Price of token0 in token1
    pub fn token0_price(&self) -> Result<Price, V2Error> {
        Ok(Price::new(
            self.token0.clone().into(),
            self.token1.clone().into(),
            self.reserve0.clone(),
            self.reserve1.clone(),
        )?)
    }

    /// Price of token1 in token0
    pub fn token1_price(&self) -> Result<Price, V2Error> {
        Ok(Price::new(
            self.token1.clone().into(),
            self.token0.clone().into(),
            self.reserve1.clone(),
            self.reserve0.clone(),
        )?)
    }

    pub fn price_of(&self, token: &Token) -> Result<Price, V2Error> {
        if &self.token0 == token {
            self.token0_price()
        } else if &self.token1 == token {
            self.token1_price()
        } else {
            Err(self.not_in_pair(token))
        }
    }

    /// Output for an exact input, in raw units of the other token
    pub fn get_output_amount(&self, token_in: &Token, amount_in: &BigInt) -> Result<BigInt, V2Error> {
        if self.has_empty_reserve() {
            return Err(V2Error::InsufficientReserves { pair: self.to_string() });
        }
        let reserve_in = self.reserve_of(token_in)?;
        let reserve_out = self.reserve_of(self.other_token(token_in)?)?;
        let output = calculate_output(reserve_in, reserve_out, amount_in);
        if output.is_zero() {
            return Err(V2Error::InsufficientInputAmount { pair: self.to_string() });
        }
        Ok(output)
    }

    /// Input required for an exact output of `token_out`
    pub fn get_input_amount(&self, token_out: &Token, amount_out: &BigInt) -> Result<BigInt, V2Error> {
        let reserve_out = self.reserve_of(token_out)?;
        let reserve_in = self.reserve_of(self.other_token(token_out)?)?;
        calculate_input(reserve_in, reserve_out, amount_out)
            .ok_or_else(|| V2Error::InsufficientReserves { pair: self.to_string() })
    }

    /// Reserves as currency amounts, for display
    pub fn reserves(&self) -> (CurrencyAmount, CurrencyAmount) {
        (
            CurrencyAmount::from_raw_amount(Currency::Token(self.token0.clone()), self.reserve0.clone()),
            CurrencyAmount::from_raw_amount(Currency::Token(self.token1.clone()), self.reserve1.clone()),
        )
    }

    fn not_in_pair(&self, token: &Token) -> V2Error {
        V2Error::TokenNotInPair {
            token: token.to_string(),
            pair: self.to_string(),
        }
    }
}

impl fmt::Display for V2Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;

    fn make_pool(reserve_usdc: u64, reserve_weth: u64) -> V2Pool {
        V2Pool::new(known::usdc_mainnet(), reserve_usdc, known::weth_mainnet(), reserve_weth).unwrap()
    }

    #[test]
    fn test_tokens_are_sorted() {
        let pool = make_pool(2_000, 1);
        // USDC (0xa0b8...) sorts before WETH (0xc02a...)
        assert_eq!(pool.token0, known::usdc_mainnet());
        assert_eq!(pool.reserve0, BigInt::from(2_000));
        let flipped =
            V2Pool::new(known::weth_mainnet(), 1u64, known::usdc_mainnet(), 2_000u64).unwrap();
        assert_eq!(pool, flipped);
    }

    #[test]
    fn test_identical_tokens_rejected() {
        let weth = known::weth_mainnet();
        assert_eq!(V2Pool::new(weth.clone(), 1u64, weth, 1u64), Err(V2Error::InvalidPair));
    }

    #[test]
    fn test_output_and_input() {
        let pool = make_pool(1_000_000, 1_000_000);
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        assert_eq!(pool.get_output_amount(&usdc, &BigInt::from(1000)).unwrap(), BigInt::from(996));
        let needed = pool.get_input_amount(&weth, &BigInt::from(996)).unwrap();
        assert!(needed <= BigInt::from(1000));
    }

    #[test]
    fn test_empty_reserves_fail() {
        let pool = make_pool(0, 1_000);
        let usdc = known::usdc_mainnet();
        assert!(matches!(
            pool.get_output_amount(&usdc, &BigInt::from(10)),
            Err(V2Error::InsufficientReserves { .. })
        ));
    }

    #[test]
    fn test_token_price() {
        let pool = make_pool(2_000_000_000, 1_000_000_000_000_000_000);
        let weth_price = pool.price_of(&known::weth_mainnet()).unwrap();
        let one_eth = CurrencyAmount::from_raw_amount(
            known::weth_mainnet().into(),
            BigInt::from(1_000_000_000_000_000_000u64),
        );
        assert_eq!(weth_price.quote(&one_eth).unwrap().quotient(), BigInt::from(2_000_000_000u64));
    }
}
