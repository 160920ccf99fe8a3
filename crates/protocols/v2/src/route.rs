//! V2 routes

use std::fmt;

use num_bigint::BigInt;

use router_core::{ChainId, Protocol, Token};

use crate::state::{V2Error, V2Pool};

/// An ordered path of pairs from `input` to `output`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Route {
    pub pairs: Vec<V2Pool>,
    /// Tokens visited, `pairs.len() + 1` long
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl V2Route {
    pub fn new(pairs: Vec<V2Pool>, input: Token, output: Token) -> Result<Self, V2Error> {
        if pairs.is_empty() {
            return Err(V2Error::InvalidRoute);
        }
        let mut path = Vec::with_capacity(pairs.len() + 1);
        path.push(input.clone());
        for pair in &pairs {
            let current = path.last().ok_or(V2Error::InvalidRoute)?;
            let next = pair.other_token(current).map_err(|_| V2Error::InvalidRoute)?.clone();
            path.push(next);
        }
        if path.last() != Some(&output) {
            return Err(V2Error::InvalidRoute);
        }
        Ok(Self {
            pairs,
            path,
            input,
            output,
        })
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::V2
    }

    pub fn chain(&self) -> ChainId {
        self.input.chain
    }

    pub fn hops(&self) -> usize {
        self.pairs.len()
    }

    /// Chain an exact input through every pair
    pub fn quote_exact_in(&self, amount_in: &BigInt) -> Result<BigInt, V2Error> {
        let mut amount = amount_in.clone();
        for (pair, token_in) in self.pairs.iter().zip(self.path.iter()) {
            amount = pair.get_output_amount(token_in, &amount)?;
        }
        Ok(amount)
    }

    /// Walk backwards from an exact output to the required input
    pub fn quote_exact_out(&self, amount_out: &BigInt) -> Result<BigInt, V2Error> {
        let mut amount = amount_out.clone();
        for (pair, token_out) in self.pairs.iter().zip(self.path.iter().skip(1)).rev() {
            amount = pair.get_input_amount(token_out, &amount)?;
        }
        Ok(amount)
    }
}

impl fmt::Display for V2Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.path.iter().map(|t| t.display_symbol()).collect();
        write!(f, "[V2] {}", symbols.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;

    fn make_pair(a: Token, b: Token, reserve: u64) -> V2Pool {
        V2Pool::new(a, reserve, b, reserve).unwrap()
    }

    #[test]
    fn test_route_path() {
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        let dai = known::dai_mainnet();
        let route = V2Route::new(
            vec![make_pair(usdc.clone(), weth.clone(), 1_000_000), make_pair(weth.clone(), dai.clone(), 1_000_000)],
            usdc.clone(),
            dai.clone(),
        )
        .unwrap();
        assert_eq!(route.path, vec![usdc, weth, dai]);
        assert_eq!(route.hops(), 2);
        assert_eq!(route.to_string(), "[V2] USDC -> WETH -> DAI");
    }

    #[test]
    fn test_disconnected_route_rejected() {
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        let dai = known::dai_mainnet();
        let result = V2Route::new(vec![make_pair(weth.clone(), dai.clone(), 10)], usdc, dai);
        assert_eq!(result, Err(V2Error::InvalidRoute));
    }

    #[test]
    fn test_multi_hop_quotes() {
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        let dai = known::dai_mainnet();
        let route = V2Route::new(
            vec![make_pair(usdc.clone(), weth.clone(), 1_000_000), make_pair(weth, dai.clone(), 1_000_000)],
            usdc,
            dai,
        )
        .unwrap();
        let out = route.quote_exact_in(&BigInt::from(1000)).unwrap();
        assert!(out < BigInt::from(996));
        let needed = route.quote_exact_out(&out).unwrap();
        assert!(needed <= BigInt::from(1000));
    }
}
