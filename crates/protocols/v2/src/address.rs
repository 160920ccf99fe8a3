//! Deterministic pair addresses
//!
//! pair = keccak256(0xff ++ factory ++ keccak256(token0 ++ token1) ++ init_code_hash)[12..]

use tiny_keccak::{Hasher, Keccak};

use router_core::{Address, Token};

use crate::constants::factory::{FACTORY_ADDRESS, INIT_CODE_HASH};
use crate::state::V2Error;

/// Sorted tokens plus the pair address derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairAddress {
    pub token0: Token,
    pub token1: Token,
    pub pool_address: Address,
}

pub(crate) fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

fn address_bytes(address: &Address) -> Result<[u8; 20], V2Error> {
    address.to_bytes().ok_or_else(|| V2Error::InvalidAddress {
        address: address.to_string(),
    })
}

/// CREATE2 address for `salt` under `factory`
pub fn create2_address(factory: &Address, salt: &[u8; 32], init_code_hash: &str) -> Result<Address, V2Error> {
    let factory = address_bytes(factory)?;
    let init_code_hash = hex::decode(init_code_hash).map_err(|_| V2Error::InvalidAddress {
        address: init_code_hash.to_string(),
    })?;
    let digest = keccak256(&[&[0xff], &factory, salt, &init_code_hash]);
    Ok(Address::from_bytes(&digest[12..]))
}

/// Pair address under the default factory
pub fn compute_pair_address(token_a: &Token, token_b: &Token) -> Result<PairAddress, V2Error> {
    compute_pair_address_with_factory(&Address::new(FACTORY_ADDRESS), token_a, token_b)
}

pub fn compute_pair_address_with_factory(
    factory: &Address,
    token_a: &Token,
    token_b: &Token,
) -> Result<PairAddress, V2Error> {
    if token_a == token_b {
        return Err(V2Error::InvalidPair);
    }
    let (token0, token1) = if token_a.sorts_before(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    let salt = keccak256(&[&address_bytes(&token0.address)?, &address_bytes(&token1.address)?]);
    let pool_address = create2_address(factory, &salt, INIT_CODE_HASH)?;
    Ok(PairAddress {
        token0: token0.clone(),
        token1: token1.clone(),
        pool_address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::tokens::known;

    #[test]
    fn test_usdc_weth_pair_address() {
        let pair = compute_pair_address(&known::weth_mainnet(), &known::usdc_mainnet()).unwrap();
        assert_eq!(pair.token0, known::usdc_mainnet());
        assert_eq!(
            pair.pool_address,
            Address::new("0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc")
        );
    }

    #[test]
    fn test_pair_address_is_order_independent() {
        let a = compute_pair_address(&known::dai_mainnet(), &known::usdc_mainnet()).unwrap();
        let b = compute_pair_address(&known::usdc_mainnet(), &known::dai_mainnet()).unwrap();
        assert_eq!(a, b);
        let again = compute_pair_address(&known::dai_mainnet(), &known::usdc_mainnet()).unwrap();
        assert_eq!(a.pool_address, again.pool_address);
    }

    #[test]
    fn test_same_token_rejected() {
        let weth = known::weth_mainnet();
        assert_eq!(compute_pair_address(&weth, &weth), Err(V2Error::InvalidPair));
    }
}
