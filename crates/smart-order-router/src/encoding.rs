//! Packed route paths and ABI word encoding for quoter and router calldata

use amm::Pool;
use num_bigint::{BigInt, Sign};
use router_core::{Address, RoutingError, Token};

use crate::entities::Route;

/// Fee field written for pair hops in a mixed packed path
pub const V2_FEE_PATH_PLACEHOLDER: u32 = 8_388_608;

/// 32-byte big-endian word of a non-negative integer.
pub fn uint_word(value: &BigInt) -> Result<[u8; 32], RoutingError> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus || bytes.len() > 32 {
        return Err(RoutingError::InvalidAmount {
            message: format!("{} does not fit a uint256", value),
        });
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

pub fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn address_bytes(address: &Address) -> Result<[u8; 20], RoutingError> {
    address.to_bytes().ok_or_else(|| RoutingError::InvalidRoute {
        message: format!("{} is not a 20-byte address", address),
    })
}

pub fn address_word(address: &Address) -> Result<[u8; 32], RoutingError> {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&address_bytes(address)?);
    Ok(word)
}

/// Length-prefixed, zero-padded dynamic `bytes`.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = u64_word(data.len() as u64).to_vec();
    out.extend_from_slice(data);
    let pad = (32 - data.len() % 32) % 32;
    out.extend(std::iter::repeat(0u8).take(pad));
    out
}

/// Dynamic `bytes[]`: length, per-element offsets, then the elements.
pub fn encode_bytes_array(items: &[Vec<u8>]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = items.iter().map(|i| encode_bytes(i)).collect();
    let mut out = u64_word(items.len() as u64).to_vec();
    let mut offset = 32 * items.len() as u64;
    for item in &encoded {
        out.extend_from_slice(&u64_word(offset));
        offset += item.len() as u64;
    }
    for item in encoded {
        out.extend(item);
    }
    out
}

/// `token (fee token)*` packed path, reversed for exact output.
pub fn encode_route_path(route: &Route, exact_output: bool) -> Result<Vec<u8>, RoutingError> {
    encode_pool_path(&route.pools(), route.path(), exact_output)
}

/// Packed path over `pools`, where `tokens` has one more entry than `pools`.
pub fn encode_pool_path(pools: &[Pool], tokens: &[Token], exact_output: bool) -> Result<Vec<u8>, RoutingError> {
    let path: Vec<&Token> = tokens.iter().collect();
    let mut hops: Vec<(&Token, u32, &Token)> = pools
        .iter()
        .zip(path.windows(2))
        .map(|(pool, w)| {
            let fee = match pool {
                Pool::V3(p) => p.fee.pips(),
                Pool::V2(_) => V2_FEE_PATH_PLACEHOLDER,
            };
            (w[0], fee, w[1])
        })
        .collect();
    if exact_output {
        hops.reverse();
        for hop in hops.iter_mut() {
            *hop = (hop.2, hop.1, hop.0);
        }
    }

    let mut out = Vec::with_capacity(20 + hops.len() * 23);
    if let Some((first, _, _)) = hops.first() {
        out.extend_from_slice(&address_bytes(&first.address)?);
    }
    for (_, fee, to) in hops {
        out.extend_from_slice(&fee.to_be_bytes()[1..]);
        out.extend_from_slice(&address_bytes(&to.address)?);
    }
    Ok(out)
}

/// Four-byte selector followed by pre-encoded head/tail words.
pub fn with_selector(selector: [u8; 4], body: Vec<u8>) -> Vec<u8> {
    let mut out = selector.to_vec();
    out.extend(body);
    out
}
