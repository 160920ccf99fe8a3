//! Rollup data-posting fee parameters

use num_bigint::BigInt;

use router_core::Result;

/// Arbitrum-style parameters: a flat fee per L1 calldata gas unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitrumGasData {
    pub per_l2_tx_fee: BigInt,
    pub per_l1_calldata_fee: BigInt,
    pub per_arb_gas_total: BigInt,
}

/// Optimism-style parameters read from the gas price oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimismGasData {
    pub l1_base_fee: BigInt,
    pub scalar: BigInt,
    pub decimals: u32,
    pub overhead: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L2GasData {
    Arbitrum(ArbitrumGasData),
    Optimism(OptimismGasData),
}

#[async_trait::async_trait]
pub trait L2GasDataProvider: Send + Sync {
    async fn get_gas_data(&self) -> Result<L2GasData>;
}

#[derive(Debug, Clone)]
pub struct StaticL2GasDataProvider {
    data: L2GasData,
}

impl StaticL2GasDataProvider {
    pub fn new(data: L2GasData) -> Self {
        Self { data }
    }
}

#[async_trait::async_trait]
impl L2GasDataProvider for StaticL2GasDataProvider {
    async fn get_gas_data(&self) -> Result<L2GasData> {
        Ok(self.data.clone())
    }
}
