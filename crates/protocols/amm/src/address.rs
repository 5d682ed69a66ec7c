//! Deterministic pool address derivation
//!
//! Address = last 20 bytes of `blake2b-256(kind ‖ token0 ‖ token1 ‖ discriminator)`
//! with tokens sorted, so the same constituents always map to one address and
//! a candidate pool can be named before any on-chain data is fetched. Each
//! token enters the preimage as its length-prefixed lowercase hex string.

use blake2::digest::{consts::U32, Digest};
use blake2::Blake2b;
use router_core::{Address, Token};

use crate::constants::pool_kind;
use crate::state::FeeAmount;

/// Blake2b-256 hash
fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

fn push_token(preimage: &mut Vec<u8>, address: &Address) {
    let canonical = address.as_str().to_ascii_lowercase();
    preimage.extend_from_slice(&(canonical.len() as u16).to_be_bytes());
    preimage.extend_from_slice(canonical.as_bytes());
}

fn derive(kind: u8, token_a: &Token, token_b: &Token, discriminator: &[u8]) -> Address {
    let (t0, t1) = if token_a.sorts_before(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    let mut preimage = Vec::with_capacity(1 + 2 * 44 + discriminator.len());
    preimage.push(kind);
    push_token(&mut preimage, &t0.address);
    push_token(&mut preimage, &t1.address);
    preimage.extend_from_slice(discriminator);

    let hash = blake2b_256(&preimage);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address::from_bytes(addr)
}

/// Address of the constant-product pair for two tokens.
pub fn compute_pair_address(token_a: &Token, token_b: &Token, stable: bool) -> Address {
    derive(pool_kind::PAIR, token_a, token_b, &[stable as u8])
}

/// Address of the concentrated-liquidity pool for two tokens and a fee tier.
pub fn compute_pool_address(token_a: &Token, token_b: &Token, fee: FeeAmount) -> Address {
    derive(
        pool_kind::CONCENTRATED,
        token_a,
        token_b,
        &fee.pips().to_be_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::chains::tokens;
    use router_core::ChainId;

    #[test]
    fn test_address_order_independent() {
        let a = tokens::usdc_mainnet();
        let b = tokens::weth_mainnet();
        assert_eq!(
            compute_pool_address(&a, &b, FeeAmount::Low),
            compute_pool_address(&b, &a, FeeAmount::Low)
        );
        assert_eq!(
            compute_pair_address(&a, &b, false),
            compute_pair_address(&b, &a, false)
        );
    }

    #[test]
    fn test_address_distinguishes_fee_and_kind() {
        let a = tokens::usdc_mainnet();
        let b = tokens::weth_mainnet();
        let low = compute_pool_address(&a, &b, FeeAmount::Low);
        let medium = compute_pool_address(&a, &b, FeeAmount::Medium);
        let pair = compute_pair_address(&a, &b, false);
        let stable = compute_pair_address(&a, &b, true);
        assert_ne!(low, medium);
        assert_ne!(low, pair);
        assert_ne!(pair, stable);
    }

    #[test]
    fn test_address_is_20_bytes() {
        let addr = compute_pair_address(&tokens::dai_mainnet(), &tokens::usdt_mainnet(), true);
        assert_eq!(addr.as_str().len(), 42);
        assert!(addr.to_bytes().is_some());
    }

    #[test]
    fn test_short_addresses_stay_distinct() {
        let a = Token::new(ChainId::Mainnet, "0x0a", 18, Some("A"), None);
        let b = Token::new(ChainId::Mainnet, "0x0b", 18, Some("B"), None);
        let c = Token::new(ChainId::Mainnet, "0x0c", 18, Some("C"), None);
        assert_ne!(
            compute_pair_address(&a, &b, false),
            compute_pair_address(&a, &c, false)
        );
        assert_ne!(
            compute_pool_address(&a, &c, FeeAmount::Medium),
            compute_pool_address(&c, &b, FeeAmount::Medium)
        );
    }
}
