//! V3 routes

use std::fmt;

use router_core::{ChainId, Protocol, Token};

use crate::state::{V3Error, V3Pool};

/// An ordered path of pools from `input` to `output`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Route {
    pub pools: Vec<V3Pool>,
    pub path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl V3Route {
    pub fn new(pools: Vec<V3Pool>, input: Token, output: Token) -> Result<Self, V3Error> {
        if pools.is_empty() {
            return Err(V3Error::InvalidRoute);
        }
        let mut path = Vec::with_capacity(pools.len() + 1);
        path.push(input.clone());
        for pool in &pools {
            let current = path.last().ok_or(V3Error::InvalidRoute)?;
            let next = pool.other_token(current).map_err(|_| V3Error::InvalidRoute)?.clone();
            path.push(next);
        }
        if path.last() != Some(&output) {
            return Err(V3Error::InvalidRoute);
        }
        Ok(Self {
            pools,
            path,
            input,
            output,
        })
    }

    pub fn protocol(&self) -> Protocol {
        Protocol::V3
    }

    pub fn chain(&self) -> ChainId {
        self.input.chain
    }

    pub fn hops(&self) -> usize {
        self.pools.len()
    }
}

impl fmt::Display for V3Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[V3] {}", self.input)?;
        for (pool, token) in self.pools.iter().zip(self.path.iter().skip(1)) {
            write!(f, " -- {}% --> {}", pool.fee.fee() as f64 / 10_000.0, token)?;
        }
        Ok(())
    }
}
