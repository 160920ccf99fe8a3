//! Simulation through a full transaction-simulation service
//!
//! Same gating and accounting as the estimate path; the gas figure comes
//! from executing the transaction against forked state instead.

use std::sync::Arc;

use chain_providers::{ChainProvider, L2GasData, TransactionSimulationProvider, V2PoolProvider, V3PoolProvider};
use router_core::metrics::names;
use router_core::{
    Address, ChainId, MetricUnit, MetricsSink, NoopMetrics, ProviderConfig, Result, SimulationConfig,
};

use super::{adjust_gas_estimate, apply_gas_used, SimulationStatus, Simulator, SwapRoute, SwapType};

pub struct FullSimulationSimulator {
    chain: ChainId,
    chain_provider: Arc<dyn ChainProvider>,
    simulation_provider: Arc<dyn TransactionSimulationProvider>,
    v2_pool_provider: Arc<dyn V2PoolProvider>,
    v3_pool_provider: Arc<dyn V3PoolProvider>,
    config: SimulationConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl FullSimulationSimulator {
    pub fn new(
        chain: ChainId,
        chain_provider: Arc<dyn ChainProvider>,
        simulation_provider: Arc<dyn TransactionSimulationProvider>,
        v2_pool_provider: Arc<dyn V2PoolProvider>,
        v3_pool_provider: Arc<dyn V3PoolProvider>,
    ) -> Self {
        Self {
            chain,
            chain_provider,
            simulation_provider,
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

    fn failed(&self, route: SwapRoute) -> SwapRoute {
        self.metrics.put_metric(names::SIMULATION_FAILED, 1, MetricUnit::Count);
        route.with_status(SimulationStatus::Failed)
    }
}

#[async_trait::async_trait]
impl Simulator for FullSimulationSimulator {
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
            tracing::error!("Route has no method parameters to simulate");
            return Ok(self.failed(route));
        };
        let tx = method_parameters.to_transaction(from.clone(), &route.trade.input_amount.currency);
        let block_number = provider_config.block_number.or(Some(route.block_number));
        tracing::info!(from = %tx.from, swap_type = ?swap_type, block_number, "Simulating transaction");

        let result = match self
            .simulation_provider
            .simulate_transaction(self.chain, &tx, block_number)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Failed to simulate via the simulation service");
                return Ok(self.failed(route));
            }
        };
        if !result.success {
            tracing::error!(gas_used = %result.gas_used, "Simulated transaction reverted");
            return Ok(self.failed(route));
        }

        let estimated_gas_used = adjust_gas_estimate(&result.gas_used, self.config.multiplier_for(self.chain));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_models::test_fixtures::{make_dai_v2_pool, make_usd_v3_pool};
    use crate::simulation::test_fixtures::*;
    use chain_providers::{
        InMemoryChainProvider, InMemorySimulationProvider, InMemoryV2PoolProvider, InMemoryV3PoolProvider,
        SimulationResult,
    };
    use num_bigint::BigInt;
    use router_core::tokens::known;
    use router_core::{Currency, TradeType};

    fn make_simulator(result: Option<SimulationResult>) -> (FullSimulationSimulator, SwapRoute) {
        let sender = make_sender();
        let native = Currency::Native(ChainId::Mainnet);
        let chain_provider = InMemoryChainProvider::new().with_balance(&sender, &native, BigInt::from(10u64).pow(18));
        let simulator = FullSimulationSimulator::new(
            ChainId::Mainnet,
            Arc::new(chain_provider),
            Arc::new(InMemorySimulationProvider::new(result)),
            Arc::new(InMemoryV2PoolProvider::new(vec![make_dai_v2_pool()])),
            Arc::new(InMemoryV3PoolProvider::new(vec![make_usd_v3_pool(1_000)])),
        );
        let route = make_swap_route_with_input(native, known::dai_mainnet().into(), TradeType::ExactInput);
        (simulator, route)
    }

    #[tokio::test]
    async fn test_successful_simulation_is_accounted() {
        let (simulator, route) = make_simulator(Some(SimulationResult {
            success: true,
            gas_used: BigInt::from(200_000),
        }));

        let simulated = simulator
            .simulate(&make_sender(), SwapType::SwapRouter02, route.clone(), None, &ProviderConfig::default())
            .await
            .unwrap();

        assert_eq!(simulated.simulation_status, SimulationStatus::Succeeded);
        assert_eq!(simulated.estimated_gas_used, BigInt::from(240_000));
        // 2.4e14 wei at 1000 DAI per WETH
        assert_eq!(
            simulated.estimated_gas_used_quote_token.quotient(),
            BigInt::from(240_000_000_000_000_000u64)
        );
        assert_eq!(simulated.quote, route.quote);
        assert_eq!(simulated.trade, route.trade);
        assert_eq!(simulated.route, route.route);
    }

    #[tokio::test]
    async fn test_revert_and_service_error_mark_failed() {
        for result in [
            Some(SimulationResult {
                success: false,
                gas_used: BigInt::from(21_000),
            }),
            None,
        ] {
            let (simulator, route) = make_simulator(result);
            let simulated = simulator
                .simulate(&make_sender(), SwapType::UniversalRouter, route.clone(), None, &ProviderConfig::default())
                .await
                .unwrap();
            assert_eq!(simulated.simulation_status, SimulationStatus::Failed);
            assert_eq!(simulated.estimated_gas_used, route.estimated_gas_used);
        }
    }
}
