//! Deterministic pool addresses
//!
//! pool = keccak256(0xff ++ factory ++ keccak256(abi.encode(token0, token1, fee)) ++ init_code_hash)[12..]

use tiny_keccak::{Hasher, Keccak};

use router_core::{Address, Token};

use crate::constants::factory::{FACTORY_ADDRESS, POOL_INIT_CODE_HASH};
use crate::fee::FeeAmount;
use crate::state::V3Error;

/// Sorted tokens and fee plus the pool address derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAddress {
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeAmount,
    pub pool_address: Address,
}

fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

fn address_bytes(address: &Address) -> Result<[u8; 20], V3Error> {
    address.to_bytes().ok_or_else(|| V3Error::InvalidAddress {
        address: address.to_string(),
    })
}

/// Left-pad to a 32-byte ABI word
fn abi_word(bytes: &[u8]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    word
}

/// Pool address under the default factory
pub fn compute_pool_address(token_a: &Token, token_b: &Token, fee: FeeAmount) -> Result<PoolAddress, V3Error> {
    compute_pool_address_with_factory(&Address::new(FACTORY_ADDRESS), POOL_INIT_CODE_HASH, token_a, token_b, fee)
}

pub fn compute_pool_address_with_factory(
    factory: &Address,
    init_code_hash: &str,
    token_a: &Token,
    token_b: &Token,
    fee: FeeAmount,
) -> Result<PoolAddress, V3Error> {
    if token_a == token_b {
        return Err(V3Error::InvalidPool);
    }
    let (token0, token1) = if token_a.sorts_before(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };

    let salt = keccak256(&[
        &abi_word(&address_bytes(&token0.address)?),
        &abi_word(&address_bytes(&token1.address)?),
        &abi_word(&fee.fee().to_be_bytes()),
    ]);
    let init_code_hash = hex::decode(init_code_hash).map_err(|_| V3Error::InvalidAddress {
        address: init_code_hash.to_string(),
    })?;
    let digest = keccak256(&[&[0xff], &address_bytes(factory)?, &salt, &init_code_hash]);

    Ok(PoolAddress {
        token0: token0.clone(),
        token1: token1.clone(),
        fee,
        pool_address: Address::from_bytes(&digest[12..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;

    #[test]
    fn test_pool_address_is_order_independent() {
        let a = compute_pool_address(&known::usdc_mainnet(), &known::weth_mainnet(), FeeAmount::Low).unwrap();
        let b = compute_pool_address(&known::weth_mainnet(), &known::usdc_mainnet(), FeeAmount::Low).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.token0, known::usdc_mainnet());
        assert!(a.pool_address.to_bytes().is_some());
    }

    #[test]
    fn test_each_fee_tier_has_its_own_address() {
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        let mut addresses: Vec<Address> = FeeAmount::ALL
            .iter()
            .map(|fee| compute_pool_address(&usdc, &weth, *fee).unwrap().pool_address)
            .collect();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 4);
    }

    #[test]
    fn test_factory_changes_address() {
        let usdc = known::usdc_mainnet();
        let weth = known::weth_mainnet();
        let default = compute_pool_address(&usdc, &weth, FeeAmount::Medium).unwrap();
        let other = compute_pool_address_with_factory(
            &Address::new("0x0000000000000000000000000000000000000001"),
            POOL_INIT_CODE_HASH,
            &usdc,
            &weth,
            FeeAmount::Medium,
        )
        .unwrap();
        assert_ne!(default.pool_address, other.pool_address);
    }

    #[test]
    fn test_same_token_rejected() {
        let weth = known::weth_mainnet();
        assert_eq!(compute_pool_address(&weth, &weth, FeeAmount::Low), Err(V3Error::InvalidPool));
    }
}
