//! Configuration types for routing and simulation

use std::collections::HashMap;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::types::{Address, BlockNumber, ChainId};

/// Per-heuristic pool counts for one protocol family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolPoolSelection {
    /// Top pools overall by liquidity
    pub top_n: usize,
    /// Pools directly connecting token in and token out
    pub top_n_direct_swaps: usize,
    /// Pools touching token in (and separately token out)
    pub top_n_token_in_out: usize,
    /// Pools extending each first-hop token
    pub top_n_second_hop: usize,
    /// Per-token override for `top_n_second_hop`, keyed by address
    #[serde(default)]
    pub top_n_second_hop_for_token_address: HashMap<Address, usize>,
    /// Tokens never used as a second-hop intermediate
    #[serde(default)]
    pub tokens_to_avoid_on_second_hops: Vec<Address>,
    /// Pools pairing each base token with token in (and token out)
    pub top_n_with_each_base_token: usize,
    /// Cap on base-token pools per side
    pub top_n_with_base_token: usize,
}

impl ProtocolPoolSelection {
    pub fn default_v2() -> Self {
        Self {
            top_n: 3,
            top_n_direct_swaps: 1,
            top_n_token_in_out: 5,
            top_n_second_hop: 2,
            top_n_second_hop_for_token_address: HashMap::new(),
            tokens_to_avoid_on_second_hops: Vec::new(),
            top_n_with_each_base_token: 2,
            top_n_with_base_token: 6,
        }
    }

    pub fn default_v3() -> Self {
        Self {
            top_n: 2,
            top_n_direct_swaps: 2,
            top_n_token_in_out: 3,
            top_n_second_hop: 1,
            top_n_second_hop_for_token_address: HashMap::new(),
            tokens_to_avoid_on_second_hops: Vec::new(),
            top_n_with_each_base_token: 3,
            top_n_with_base_token: 5,
        }
    }

    /// Second-hop count for an intermediate token, honouring overrides
    pub fn second_hop_limit(&self, token: &Address) -> usize {
        self.top_n_second_hop_for_token_address
            .get(token)
            .copied()
            .unwrap_or(self.top_n_second_hop)
    }

    pub fn avoids_second_hop(&self, token: &Address) -> bool {
        self.tokens_to_avoid_on_second_hops.contains(token)
    }
}

/// Routing configuration for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Pin provider reads to this block
    #[serde(default)]
    pub block_number: Option<BlockNumber>,

    #[serde(default = "ProtocolPoolSelection::default_v2")]
    pub v2_pool_selection: ProtocolPoolSelection,

    #[serde(default = "ProtocolPoolSelection::default_v3")]
    pub v3_pool_selection: ProtocolPoolSelection,

    /// Maximum pools per path
    #[serde(default = "default_max_swaps_per_path")]
    pub max_swaps_per_path: usize,

    #[serde(default = "default_min_splits")]
    pub min_splits: usize,

    #[serde(default = "default_max_splits")]
    pub max_splits: usize,

    /// Granularity of trade-size splits, in percent
    #[serde(default = "default_distribution_percent")]
    pub distribution_percent: u32,
}

fn default_max_swaps_per_path() -> usize {
    3
}

fn default_min_splits() -> usize {
    1
}

fn default_max_splits() -> usize {
    7
}

fn default_distribution_percent() -> u32 {
    5
}

impl RoutingConfig {
    /// Defaults for a chain. Selection counts are shared by all chains.
    pub fn for_chain(_chain: ChainId) -> Self {
        Self::default()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            block_number: self.block_number,
            additional_gas_overhead: None,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            block_number: None,
            v2_pool_selection: ProtocolPoolSelection::default_v2(),
            v3_pool_selection: ProtocolPoolSelection::default_v3(),
            max_swaps_per_path: default_max_swaps_per_path(),
            min_splits: default_min_splits(),
            max_splits: default_max_splits(),
            distribution_percent: default_distribution_percent(),
        }
    }
}

/// Options forwarded to provider calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    pub block_number: Option<BlockNumber>,
    /// Extra gas added by gas models (e.g. native wrap/unwrap)
    pub additional_gas_overhead: Option<BigInt>,
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Multiplier applied to provider gas estimates
    #[serde(default = "default_estimate_multiplier")]
    pub estimate_multiplier: f64,

    /// Per-chain multiplier overrides
    #[serde(default)]
    pub estimate_multiplier_overrides: HashMap<ChainId, f64>,
}

fn default_estimate_multiplier() -> f64 {
    1.2
}

impl SimulationConfig {
    pub fn multiplier_for(&self, chain: ChainId) -> f64 {
        self.estimate_multiplier_overrides
            .get(&chain)
            .copied()
            .unwrap_or(self.estimate_multiplier)
    }

    /// Every multiplier must be finite and positive
    pub fn validate(&self) -> Result<()> {
        let check = |chain: Option<ChainId>, multiplier: f64| {
            if multiplier.is_finite() && multiplier > 0.0 && multiplier <= MAX_ESTIMATE_MULTIPLIER {
                Ok(())
            } else {
                Err(Error::Config(match chain {
                    Some(chain) => format!("invalid estimate multiplier {multiplier} for {chain}"),
                    None => format!("invalid estimate multiplier {multiplier}"),
                }))
            }
        };
        check(None, self.estimate_multiplier)?;
        for (chain, multiplier) in &self.estimate_multiplier_overrides {
            check(Some(*chain), *multiplier)?;
        }
        Ok(())
    }
}

const MAX_ESTIMATE_MULTIPLIER: f64 = 100.0;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            estimate_multiplier: default_estimate_multiplier(),
            estimate_multiplier_overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RoutingConfig::default();
        assert_eq!(config.max_swaps_per_path, 3);
        assert_eq!(config.distribution_percent, 5);
        assert_eq!(config.v2_pool_selection.top_n_with_base_token, 6);
        assert_eq!(config.v3_pool_selection.top_n_direct_swaps, 2);
        assert_eq!(config.block_number, None);
    }

    #[test]
    fn test_config_serialization() {
        let config = RoutingConfig::for_chain(ChainId::Mainnet);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RoutingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_fills_defaults() {
        let parsed: RoutingConfig = serde_json::from_str(r#"{"blockNumber": 19000000}"#).unwrap();
        assert_eq!(parsed.block_number, Some(19_000_000));
        assert_eq!(parsed.v3_pool_selection, ProtocolPoolSelection::default_v3());
        assert_eq!(parsed.max_splits, 7);
    }

    #[test]
    fn test_second_hop_override() {
        let usdc = Address::new("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        let mut selection = ProtocolPoolSelection::default_v3();
        selection.top_n_second_hop_for_token_address.insert(usdc.clone(), 4);
        assert_eq!(selection.second_hop_limit(&usdc), 4);
        assert_eq!(selection.second_hop_limit(&Address::new("0x01")), 1);
    }

    #[test]
    fn test_simulation_multiplier_override() {
        let mut config = SimulationConfig::default();
        config.estimate_multiplier_overrides.insert(ChainId::Arbitrum, 1.5);
        assert_eq!(config.multiplier_for(ChainId::Arbitrum), 1.5);
        assert_eq!(config.multiplier_for(ChainId::Mainnet), 1.2);
    }

    #[test]
    fn test_simulation_multiplier_validation() {
        assert!(SimulationConfig::default().validate().is_ok());

        for bad in [f64::NAN, f64::INFINITY, 0.0, -1.2, 1e12] {
            let mut config = SimulationConfig::default();
            config.estimate_multiplier_overrides.insert(ChainId::Base, bad);
            let err = config.validate().unwrap_err();
            assert_eq!(err.error_code(), "config_error");
        }

        let config = SimulationConfig {
            estimate_multiplier: f64::NAN,
            estimate_multiplier_overrides: HashMap::new(),
        };
        assert!(config.validate().is_err());
    }
}
