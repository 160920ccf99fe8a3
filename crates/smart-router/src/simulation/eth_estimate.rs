//! Simulation through the node's `eth_estimateGas`

use std::sync::Arc;

use chain_providers::{ChainProvider, L2GasData, V2PoolProvider, V3PoolProvider};
use router_core::metrics::names;
use router_core::tokens::beacon_chain_deposit_address;
use router_core::{
    Address, ChainId, MetricUnit, MetricsSink, NoopMetrics, ProviderConfig, Result, SimulationConfig,
};

use super::{adjust_gas_estimate, apply_gas_used, SimulationStatus, Simulator, SwapRoute, SwapType};

pub struct EthEstimateGasSimulator {
    chain: ChainId,
    chain_provider: Arc<dyn ChainProvider>,
    v2_pool_provider: Arc<dyn V2PoolProvider>,
    v3_pool_provider: Arc<dyn V3PoolProvider>,
    config: SimulationConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl EthEstimateGasSimulator {
    pub fn new(
        chain: ChainId,
        chain_provider: Arc<dyn ChainProvider>,
        v2_pool_provider: Arc<dyn V2PoolProvider>,
        v3_pool_provider: Arc<dyn V3PoolProvider>,
    ) -> Self {
        Self {
            chain,
            chain_provider,
            v2_pool_provider,
            v3_pool_provider,
            config: SimulationConfig::default(),
            metrics: Arc::new(NoopMetrics),
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Native mainnet input through the universal router estimates from the
    /// beacon deposit contract, whose balance covers any amount.
    fn estimate_from(&self, from: &Address, swap_type: SwapType, route: &SwapRoute) -> Address {
        if swap_type == SwapType::UniversalRouter
            && self.chain == ChainId::Mainnet
            && route.trade.input_amount.currency.is_native()
        {
            beacon_chain_deposit_address()
        } else {
            from.clone()
        }
    }
}

#[async_trait::async_trait]
impl Simulator for EthEstimateGasSimulator {
    fn chain(&self) -> ChainId {
        self.chain
    }

    fn chain_provider(&self) -> &dyn ChainProvider {
        self.chain_provider.as_ref()
    }

    async fn simulate_transaction(
        &self,
        from: &Address,
        swap_type: SwapType,
        route: SwapRoute,
        l2_gas_data: Option<&L2GasData>,
        provider_config: &ProviderConfig,
    ) -> Result<SwapRoute> {
        let Some(method_parameters) = &route.method_parameters else {
            tracing::error!("Route has no method parameters to estimate");
            self.metrics.put_metric(names::SIMULATION_FAILED, 1, MetricUnit::Count);
            return Ok(route.with_status(SimulationStatus::Failed));
        };

        let tx = method_parameters.to_transaction(
            self.estimate_from(from, swap_type, &route),
            &route.trade.input_amount.currency,
        );
        tracing::info!(from = %tx.from, to = %tx.to, swap_type = ?swap_type, "Estimating gas");

        let estimate = match self.chain_provider.estimate_gas(&tx).await {
            Ok(gas) => gas,
            Err(e) => {
                tracing::error!(error = %e, from = %tx.from, "Error estimating gas");
                self.metrics.put_metric(names::SIMULATION_FAILED, 1, MetricUnit::Count);
                return Ok(route.with_status(SimulationStatus::Failed));
            }
        };

        let estimated_gas_used = adjust_gas_estimate(&estimate, self.config.multiplier_for(self.chain));
        tracing::debug!(estimate = %estimate, adjusted = %estimated_gas_used, "Adjusted gas estimate");

        apply_gas_used(
            self.chain,
            route,
            estimated_gas_used,
            self.v2_pool_provider.as_ref(),
            self.v3_pool_provider.as_ref(),
            l2_gas_data,
            provider_config,
        )
        .await
    }
}
