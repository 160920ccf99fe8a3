//! Gas price oracle port

use num_bigint::BigInt;

use router_core::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub gas_price_wei: BigInt,
}

#[async_trait::async_trait]
pub trait GasPriceProvider: Send + Sync {
    async fn get_gas_price(&self) -> Result<GasPrice>;
}

/// Always reports the same price
#[derive(Debug, Clone)]
pub struct StaticGasPriceProvider {
    gas_price_wei: BigInt,
}

impl StaticGasPriceProvider {
    pub fn new(gas_price_wei: impl Into<BigInt>) -> Self {
        Self {
            gas_price_wei: gas_price_wei.into(),
        }
    }
}

#[async_trait::async_trait]
impl GasPriceProvider for StaticGasPriceProvider {
    async fn get_gas_price(&self) -> Result<GasPrice> {
        Ok(GasPrice {
            gas_price_wei: self.gas_price_wei.clone(),
        })
    }
}
