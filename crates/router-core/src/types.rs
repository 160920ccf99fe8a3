//! Core type definitions for the router

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::tokens;

/// EVM address, stored as lower-case `0x`-prefixed hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Build an address from any casing; the stored form is lower case.
    pub fn new(addr: impl AsRef<str>) -> Self {
        let raw = addr.as_ref().trim();
        let body = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        Self(format!("0x{}", body.to_ascii_lowercase()))
    }

    /// Parse and validate a 20-byte hex address
    pub fn parse(addr: &str) -> Option<Self> {
        let address = Self::new(addr);
        address.to_bytes().map(|_| address)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20 bytes, `None` if the hex body is malformed
    pub fn to_bytes(&self) -> Option<[u8; 20]> {
        let body = self.0.strip_prefix("0x").unwrap_or(&self.0);
        let bytes = hex::decode(body).ok()?;
        bytes.try_into().ok()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Self::new(addr)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// L1 data-posting fee model used by a rollup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1FeeModel {
    /// Flat fee per calldata gas unit plus a per-transaction fee
    Arbitrum,
    /// L1 base fee times a scalar, scaled down by a decimal factor
    Optimism,
}

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Mainnet,
    Optimism,
    Arbitrum,
    Polygon,
    Base,
    Bnb,
    Avalanche,
    Celo,
    Gnosis,
}

impl ChainId {
    pub const ALL: [ChainId; 9] = [
        ChainId::Mainnet,
        ChainId::Optimism,
        ChainId::Arbitrum,
        ChainId::Polygon,
        ChainId::Base,
        ChainId::Bnb,
        ChainId::Avalanche,
        ChainId::Celo,
        ChainId::Gnosis,
    ];

    pub fn id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Optimism => 10,
            Self::Arbitrum => 42161,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Bnb => 56,
            Self::Avalanche => 43114,
            Self::Celo => 42220,
            Self::Gnosis => 100,
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.id() == id)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Optimism => "optimism",
            Self::Arbitrum => "arbitrum",
            Self::Polygon => "polygon",
            Self::Base => "base",
            Self::Bnb => "bnb",
            Self::Avalanche => "avalanche",
            Self::Celo => "celo",
            Self::Gnosis => "gnosis",
        }
    }

    /// Symbol of the chain's native gas currency
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Self::Polygon => "MATIC",
            Self::Bnb => "BNB",
            Self::Avalanche => "AVAX",
            Self::Celo => "CELO",
            Self::Gnosis => "XDAI",
            _ => "ETH",
        }
    }

    pub fn l1_fee_model(&self) -> Option<L1FeeModel> {
        match self {
            Self::Arbitrum => Some(L1FeeModel::Arbitrum),
            Self::Optimism | Self::Base => Some(L1FeeModel::Optimism),
            _ => None,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ERC-20 token. Equality and hashing use (chain, address) only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain: ChainId,
    pub address: Address,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl Token {
    pub fn new(chain: ChainId, address: impl AsRef<str>, decimals: u8, symbol: &str) -> Self {
        Self {
            chain,
            address: Address::new(address),
            decimals,
            symbol: Some(symbol.to_string()),
            name: None,
        }
    }

    /// Canonical ordering used for pool token0/token1
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }

    /// Symbol for display, falling back to the address
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(self.address.as_str())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_symbol())
    }
}

/// Either the chain's native currency or a token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Native(ChainId),
    Token(Token),
}

impl Currency {
    pub fn chain(&self) -> ChainId {
        match self {
            Self::Native(chain) => *chain,
            Self::Token(token) => token.chain,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Self::Native(_) => 18,
            Self::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Native(chain) => chain.native_symbol(),
            Self::Token(token) => token.display_symbol(),
        }
    }

    /// The token representation: wrapped native for the native currency
    pub fn wrapped(&self) -> Token {
        match self {
            Self::Native(chain) => tokens::wrapped_native(*chain),
            Self::Token(token) => token.clone(),
        }
    }
}

impl From<Token> for Currency {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactInput => "exactIn",
            Self::ExactOutput => "exactOut",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pool family a route runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    V2,
    V3,
    Mixed,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V2 => "V2",
            Self::V3 => "V3",
            Self::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Block number
pub type BlockNumber = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_lowercased() {
        let addr = Address::new("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        assert_eq!(addr.as_str(), "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert_eq!(addr, Address::new("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"));
    }

    #[test]
    fn test_address_parse_rejects_bad_length() {
        assert!(Address::parse("0x1234").is_none());
        assert!(Address::parse("0xzz2aaa39b223fe8d0a0e5c4f27ead9083c756cc2").is_none());
        assert!(Address::parse("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").is_some());
    }

    #[test]
    fn test_token_equality_ignores_metadata() {
        let a = Token::new(ChainId::Mainnet, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC");
        let mut b = a.clone();
        b.symbol = Some("USDC.e".into());
        assert_eq!(a, b);

        let other_chain = Token::new(ChainId::Base, a.address.as_str(), 6, "USDC");
        assert_ne!(a, other_chain);
    }

    #[test]
    fn test_native_wraps_to_weth() {
        let native = Currency::Native(ChainId::Mainnet);
        assert!(native.is_native());
        assert_eq!(native.wrapped().display_symbol(), "WETH");
        assert_eq!(native.symbol(), "ETH");
    }

    #[test]
    fn test_chain_ids_round_trip() {
        for chain in ChainId::ALL {
            assert_eq!(ChainId::from_id(chain.id()), Some(chain));
        }
        assert_eq!(ChainId::from_id(999_999), None);
    }

    #[test]
    fn test_l1_fee_models() {
        assert_eq!(ChainId::Arbitrum.l1_fee_model(), Some(L1FeeModel::Arbitrum));
        assert_eq!(ChainId::Base.l1_fee_model(), Some(L1FeeModel::Optimism));
        assert_eq!(ChainId::Mainnet.l1_fee_model(), None);
    }
}
