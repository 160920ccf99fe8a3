//! Per-chain static token tables
//!
//! Wrapped native currencies, routing hub ("base") tokens and the USD
//! stablecoins used to price gas. Tables are plain data keyed by chain so
//! they can be swapped without touching the selection code.

use crate::types::{Address, ChainId, Token};

/// Deposit contract used as a funded sender for mainnet gas estimates
pub const BEACON_CHAIN_DEPOSIT_ADDRESS: &str = "0x00000000219ab540356cBB839Cbe05303d7705Fa";

/// Known token constants
pub mod known {
    use super::*;

    pub fn weth_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, "WETH")
    }
    pub fn usdc_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC")
    }
    pub fn usdt_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6, "USDT")
    }
    pub fn wbtc_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8, "WBTC")
    }
    pub fn dai_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18, "DAI")
    }
    pub fn fei_mainnet() -> Token {
        Token::new(ChainId::Mainnet, "0x956F47F50A910163D8BF957Cf5846D573E7f87CA", 18, "FEI")
    }

    pub fn weth_optimism() -> Token {
        Token::new(ChainId::Optimism, "0x4200000000000000000000000000000000000006", 18, "WETH")
    }
    pub fn dai_optimism() -> Token {
        Token::new(ChainId::Optimism, "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", 18, "DAI")
    }
    pub fn usdc_optimism() -> Token {
        Token::new(ChainId::Optimism, "0x7F5c764cBc14f9669B88837ca1490cCa17c31607", 6, "USDC")
    }
    pub fn usdt_optimism() -> Token {
        Token::new(ChainId::Optimism, "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58", 6, "USDT")
    }
    pub fn wbtc_optimism() -> Token {
        Token::new(ChainId::Optimism, "0x68f180fcCe6836688e9084f035309E29Bf0A2095", 8, "WBTC")
    }

    pub fn weth_arbitrum() -> Token {
        Token::new(ChainId::Arbitrum, "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", 18, "WETH")
    }
    pub fn dai_arbitrum() -> Token {
        Token::new(ChainId::Arbitrum, "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", 18, "DAI")
    }
    pub fn usdc_arbitrum() -> Token {
        Token::new(ChainId::Arbitrum, "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8", 6, "USDC")
    }
    pub fn wbtc_arbitrum() -> Token {
        Token::new(ChainId::Arbitrum, "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f", 8, "WBTC")
    }
    pub fn usdt_arbitrum() -> Token {
        Token::new(ChainId::Arbitrum, "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", 6, "USDT")
    }

    pub fn wmatic_polygon() -> Token {
        Token::new(ChainId::Polygon, "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", 18, "WMATIC")
    }
    pub fn usdc_polygon() -> Token {
        Token::new(ChainId::Polygon, "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", 6, "USDC")
    }

    pub fn weth_base() -> Token {
        Token::new(ChainId::Base, "0x4200000000000000000000000000000000000006", 18, "WETH")
    }
    pub fn usdc_base() -> Token {
        Token::new(ChainId::Base, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", 6, "USDC")
    }

    pub fn wbnb_bnb() -> Token {
        Token::new(ChainId::Bnb, "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c", 18, "WBNB")
    }
    pub fn dai_bnb() -> Token {
        Token::new(ChainId::Bnb, "0x1AF3F329e8BE154074D8769D1FFa4eE058B1DBc3", 18, "DAI")
    }
    pub fn usdc_bnb() -> Token {
        Token::new(ChainId::Bnb, "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d", 18, "USDC")
    }
    pub fn usdt_bnb() -> Token {
        Token::new(ChainId::Bnb, "0x55d398326f99059fF775485246999027B3197955", 18, "USDT")
    }

    pub fn wavax_avalanche() -> Token {
        Token::new(ChainId::Avalanche, "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", 18, "WAVAX")
    }
    pub fn dai_avalanche() -> Token {
        Token::new(ChainId::Avalanche, "0xd586E7F844cEa2F87f50152665BCbc2C279D8d70", 18, "DAI.e")
    }
    pub fn usdc_avalanche() -> Token {
        Token::new(ChainId::Avalanche, "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", 6, "USDC")
    }

    pub fn celo() -> Token {
        Token::new(ChainId::Celo, "0x471EcE3750Da237f93B8E339c536989b8978a438", 18, "CELO")
    }
    pub fn cusd_celo() -> Token {
        Token::new(ChainId::Celo, "0x765DE816845861e75A25fCA122bb6898B8B1282a", 18, "CUSD")
    }
    pub fn ceur_celo() -> Token {
        Token::new(ChainId::Celo, "0xD8763CBa276a3738E6DE85b4b3bF5FDed6D6cA73", 18, "CEUR")
    }

    pub fn wxdai_gnosis() -> Token {
        Token::new(ChainId::Gnosis, "0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d", 18, "WXDAI")
    }
    pub fn wbtc_gnosis() -> Token {
        Token::new(ChainId::Gnosis, "0x8e5bBbb09Ed1ebdE8674Cda39A0c169401db4252", 8, "WBTC")
    }
    pub fn usdc_gnosis() -> Token {
        Token::new(ChainId::Gnosis, "0xDDAfbb505ad214D7b80b1f830fcCc89B60fb7A83", 6, "USDC")
    }
}

/// Wrapped form of each chain's native currency
pub fn wrapped_native(chain: ChainId) -> Token {
    match chain {
        ChainId::Mainnet => known::weth_mainnet(),
        ChainId::Optimism => known::weth_optimism(),
        ChainId::Arbitrum => known::weth_arbitrum(),
        ChainId::Polygon => known::wmatic_polygon(),
        ChainId::Base => known::weth_base(),
        ChainId::Bnb => known::wbnb_bnb(),
        ChainId::Avalanche => known::wavax_avalanche(),
        ChainId::Celo => known::celo(),
        ChainId::Gnosis => known::wxdai_gnosis(),
    }
}

/// Hub tokens considered when selecting candidate pools
pub fn base_tokens(chain: ChainId) -> Vec<Token> {
    use known::*;
    match chain {
        ChainId::Mainnet => vec![
            usdc_mainnet(),
            usdt_mainnet(),
            wbtc_mainnet(),
            dai_mainnet(),
            weth_mainnet(),
            fei_mainnet(),
        ],
        ChainId::Optimism => vec![dai_optimism(), usdc_optimism(), usdt_optimism(), wbtc_optimism()],
        ChainId::Arbitrum => vec![dai_arbitrum(), usdc_arbitrum(), wbtc_arbitrum(), usdt_arbitrum()],
        ChainId::Polygon => vec![usdc_polygon(), wmatic_polygon()],
        ChainId::Base => vec![usdc_base()],
        ChainId::Bnb => vec![dai_bnb(), usdc_bnb(), usdt_bnb()],
        ChainId::Avalanche => vec![dai_avalanche(), usdc_avalanche()],
        ChainId::Celo => vec![cusd_celo(), ceur_celo(), celo()],
        ChainId::Gnosis => vec![wbtc_gnosis(), wxdai_gnosis(), usdc_gnosis()],
    }
}

/// USD stablecoins used to anchor gas costs in dollars
pub fn usd_gas_tokens(chain: ChainId) -> Vec<Token> {
    use known::*;
    match chain {
        ChainId::Mainnet => vec![dai_mainnet(), usdc_mainnet(), usdt_mainnet()],
        ChainId::Optimism => vec![dai_optimism(), usdc_optimism(), usdt_optimism()],
        ChainId::Arbitrum => vec![dai_arbitrum(), usdc_arbitrum(), usdt_arbitrum()],
        ChainId::Polygon => vec![usdc_polygon()],
        ChainId::Base => vec![usdc_base()],
        ChainId::Bnb => vec![usdt_bnb(), usdc_bnb(), dai_bnb()],
        ChainId::Avalanche => vec![dai_avalanche(), usdc_avalanche()],
        ChainId::Celo => vec![cusd_celo()],
        ChainId::Gnosis => vec![usdc_gnosis()],
    }
}

/// Whether a symbol names the chain's native currency or its wrapped form.
///
/// Only ETH-style and MATIC-style chains are recognised; elsewhere this is
/// always false.
pub fn is_native_symbol(chain: ChainId, symbol: Option<&str>) -> bool {
    let Some(symbol) = symbol else {
        return false;
    };
    let wrapped = wrapped_native(chain);
    match wrapped.symbol.as_deref() {
        Some("WETH") => matches!(symbol, "WETH" | "WETH9" | "ETH"),
        Some("WMATIC") => matches!(symbol, "WMATIC" | "MATIC"),
        _ => false,
    }
}

pub fn beacon_chain_deposit_address() -> Address {
    Address::new(BEACON_CHAIN_DEPOSIT_ADDRESS)
}
