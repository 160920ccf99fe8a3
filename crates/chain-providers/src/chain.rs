//! Node access: gas estimation, balances, allowances, and transaction
//! simulation

use std::collections::HashMap;
use std::sync::RwLock;

use num_bigint::BigInt;
use router_core::{Address, BlockNumber, ChainId, Currency, ProviderError, Result, Token};

/// Transaction to estimate or simulate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// `0x`-prefixed hex calldata
    pub data: String,
    pub to: Address,
    pub from: Address,
    pub value: BigInt,
}

#[async_trait::async_trait]
pub trait ChainProvider: Send + Sync {
    /// Node gas estimate for `tx`
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<BigInt>;

    /// Raw balance of `currency` held by `owner`
    async fn balance_of(&self, currency: &Currency, owner: &Address) -> Result<BigInt>;

    async fn allowance(&self, token: &Token, owner: &Address, spender: &Address) -> Result<BigInt>;
}

/// Outcome of a full transaction simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    pub success: bool,
    pub gas_used: BigInt,
}

/// Full pre-execution of a transaction against a forked state
#[async_trait::async_trait]
pub trait TransactionSimulationProvider: Send + Sync {
    async fn simulate_transaction(
        &self,
        chain: ChainId,
        tx: &TransactionRequest,
        block_number: Option<BlockNumber>,
    ) -> Result<SimulationResult>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// Scripted node: fixed estimate, balances, and allowances
#[derive(Debug, Default)]
pub struct InMemoryChainProvider {
    gas_estimate: Option<BigInt>,
    balances: HashMap<(Address, Option<Address>), BigInt>,
    allowances: HashMap<(Address, Address, Address), BigInt>,
    estimate_requests: RwLock<Vec<TransactionRequest>>,
}

impl InMemoryChainProvider {
    /// Node whose gas estimates always fail
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_estimate(mut self, gas: impl Into<BigInt>) -> Self {
        self.gas_estimate = Some(gas.into());
        self
    }

    pub fn with_balance(mut self, owner: &Address, currency: &Currency, amount: impl Into<BigInt>) -> Self {
        self.balances.insert(Self::balance_key(owner, currency), amount.into());
        self
    }

    pub fn with_allowance(mut self, token: &Token, owner: &Address, spender: &Address, amount: impl Into<BigInt>) -> Self {
        self.allowances
            .insert((token.address.clone(), owner.clone(), spender.clone()), amount.into());
        self
    }

    /// Every transaction passed to `estimate_gas`
    pub fn estimate_requests(&self) -> Vec<TransactionRequest> {
        self.estimate_requests.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn balance_key(owner: &Address, currency: &Currency) -> (Address, Option<Address>) {
        match currency {
            Currency::Native(_) => (owner.clone(), None),
            Currency::Token(token) => (owner.clone(), Some(token.address.clone())),
        }
    }
}

#[async_trait::async_trait]
impl ChainProvider for InMemoryChainProvider {
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<BigInt> {
        if let Ok(mut requests) = self.estimate_requests.write() {
            requests.push(tx.clone());
        }
        self.gas_estimate.clone().ok_or_else(|| {
            ProviderError::InvalidResponse {
                message: "execution reverted".into(),
            }
            .into()
        })
    }

    async fn balance_of(&self, currency: &Currency, owner: &Address) -> Result<BigInt> {
        Ok(self
            .balances
            .get(&Self::balance_key(owner, currency))
            .cloned()
            .unwrap_or_default())
    }

    async fn allowance(&self, token: &Token, owner: &Address, spender: &Address) -> Result<BigInt> {
        Ok(self
            .allowances
            .get(&(token.address.clone(), owner.clone(), spender.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Returns a fixed simulation outcome, or an error when none is set
#[derive(Debug, Clone, Default)]
pub struct InMemorySimulationProvider {
    result: Option<SimulationResult>,
}

impl InMemorySimulationProvider {
    pub fn new(result: Option<SimulationResult>) -> Self {
        Self { result }
    }
}

#[async_trait::async_trait]
impl TransactionSimulationProvider for InMemorySimulationProvider {
    async fn simulate_transaction(
        &self,
        _chain: ChainId,
        _tx: &TransactionRequest,
        _block_number: Option<BlockNumber>,
    ) -> Result<SimulationResult> {
        self.result.clone().ok_or_else(|| {
            ProviderError::Unavailable {
                name: "simulation api".into(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;

    fn make_tx() -> TransactionRequest {
        TransactionRequest {
            data: "0x".into(),
            to: Address::new("0x00000000000000000000000000000000000000aa"),
            from: Address::new("0x00000000000000000000000000000000000000bb"),
            value: BigInt::default(),
        }
    }

    #[tokio::test]
    async fn test_estimate_records_requests() {
        let provider = InMemoryChainProvider::new().with_gas_estimate(100_000u64);
        assert_eq!(provider.estimate_gas(&make_tx()).await.unwrap(), BigInt::from(100_000));
        assert_eq!(provider.estimate_requests(), vec![make_tx()]);
    }

    #[tokio::test]
    async fn test_estimate_without_script_fails() {
        let provider = InMemoryChainProvider::new();
        assert!(provider.estimate_gas(&make_tx()).await.is_err());
    }

    #[tokio::test]
    async fn test_balances_split_native_and_tokens() {
        let owner = Address::new("0x00000000000000000000000000000000000000bb");
        let native = Currency::Native(ChainId::Mainnet);
        let usdc: Currency = known::usdc_mainnet().into();
        let provider = InMemoryChainProvider::new().with_balance(&owner, &native, 5u64);
        assert_eq!(provider.balance_of(&native, &owner).await.unwrap(), BigInt::from(5));
        assert_eq!(provider.balance_of(&usdc, &owner).await.unwrap(), BigInt::from(0));
    }
}
