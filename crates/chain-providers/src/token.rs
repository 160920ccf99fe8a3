//! Token metadata, blocklist, and transfer-validation ports

use std::collections::{HashMap, HashSet};

use router_core::{Address, BlockNumber, ProviderConfig, Result, Token};

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Resolved token metadata
#[derive(Debug, Clone, Default)]
pub struct TokenAccessor {
    tokens: HashMap<Address, Token>,
}

impl TokenAccessor {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| (t.address.clone(), t)).collect(),
        }
    }

    pub fn get_token_by_address(&self, address: &Address) -> Option<&Token> {
        self.tokens.get(address)
    }

    pub fn get_all_tokens(&self) -> Vec<&Token> {
        self.tokens.values().collect()
    }
}

#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_tokens(&self, addresses: &[Address], block_number: Option<BlockNumber>) -> Result<TokenAccessor>;
}

/// Resolves addresses against a fixed token list
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenProvider {
    tokens: HashMap<Address, Token>,
}

impl InMemoryTokenProvider {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| (t.address.clone(), t)).collect(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for InMemoryTokenProvider {
    async fn get_tokens(&self, addresses: &[Address], _block_number: Option<BlockNumber>) -> Result<TokenAccessor> {
        Ok(TokenAccessor::new(
            addresses.iter().filter_map(|a| self.tokens.get(a)).cloned(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Blocklist
// ---------------------------------------------------------------------------

/// Token list used as a blocklist during candidate selection
#[async_trait::async_trait]
pub trait TokenListProvider: Send + Sync {
    async fn has_token_by_address(&self, address: &Address) -> Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryBlocklist {
    addresses: HashSet<Address>,
}

impl InMemoryBlocklist {
    pub fn new(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl TokenListProvider for InMemoryBlocklist {
    async fn has_token_by_address(&self, address: &Address) -> Result<bool> {
        Ok(self.addresses.contains(address))
    }
}

// ---------------------------------------------------------------------------
// Transfer validation
// ---------------------------------------------------------------------------

/// Outcome of probing a token's transfer behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenValidationResult {
    Unknown,
    /// Fee on transfer
    Fot,
    /// Simple transfer fails
    Stf,
}

#[derive(Debug, Clone, Default)]
pub struct TokenValidationAccessor {
    results: HashMap<Address, TokenValidationResult>,
}

impl TokenValidationAccessor {
    pub fn new(results: HashMap<Address, TokenValidationResult>) -> Self {
        Self { results }
    }

    pub fn get_validation_by_token(&self, token: &Token) -> Option<TokenValidationResult> {
        self.results.get(&token.address).copied()
    }
}

#[async_trait::async_trait]
pub trait TokenValidatorProvider: Send + Sync {
    async fn validate_tokens(&self, tokens: &[Token], config: &ProviderConfig) -> Result<TokenValidationAccessor>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenValidator {
    results: HashMap<Address, TokenValidationResult>,
}

impl InMemoryTokenValidator {
    pub fn new(results: impl IntoIterator<Item = (Address, TokenValidationResult)>) -> Self {
        Self {
            results: results.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl TokenValidatorProvider for InMemoryTokenValidator {
    async fn validate_tokens(&self, tokens: &[Token], _config: &ProviderConfig) -> Result<TokenValidationAccessor> {
        let results = tokens
            .iter()
            .filter_map(|t| self.results.get(&t.address).map(|r| (t.address.clone(), *r)))
            .collect();
        Ok(TokenValidationAccessor::new(results))
    }
}
