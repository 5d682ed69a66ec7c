//! Core type definitions for the router

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::chains::ChainId;

/// Contract address (20 bytes, `0x`-prefixed hex, stored lowercase)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        let addr: String = addr.into();
        let lower = addr.to_ascii_lowercase();
        if lower.starts_with("0x") {
            Self(lower)
        } else {
            Self(format!("0x{}", lower))
        }
    }

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into raw bytes, `None` if the hex is malformed.
    pub fn to_bytes(&self) -> Option<[u8; 20]> {
        let raw = hex::decode(self.0.trim_start_matches("0x")).ok()?;
        raw.try_into().ok()
    }

    pub fn zero() -> Self {
        Self::from_bytes([0u8; 20])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address::new(s)
    }
}

/// Block height the routing computation is pinned to
pub type BlockNumber = u64;

/// ERC20 token identity. Equality and hashing use chain and address only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Token {
    pub fn new(
        chain_id: ChainId,
        address: impl Into<Address>,
        decimals: u8,
        symbol: Option<&str>,
        name: Option<&str>,
    ) -> Self {
        Self {
            chain_id,
            address: address.into(),
            decimals,
            symbol: symbol.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// Symbol for logging, falling back to the address.
    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(self.address.as_str())
    }

    /// Token ordering used by pools: the lower address is token0.
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_symbol())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Address::new(s)
    }
}

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    /// Amount is the input; the quote is the output received.
    ExactInput,
    /// Amount is the output; the quote is the input required.
    ExactOutput,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::ExactInput => "exact_input",
            TradeType::ExactOutput => "exact_output",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pool protocol family a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    V2,
    V3,
    Mixed,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::V2 => "V2",
            Protocol::V3 => "V3",
            Protocol::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Well-known constants
pub mod constants {
    /// Number of decimals of the native gas currency on every supported chain
    pub const NATIVE_DECIMALS: u8 = 18;

    /// Basis points in 100%
    pub const BIPS_BASE: u64 = 10_000;

    /// Tolerance used by route-to-ratio when the caller gives none (0.5%)
    pub const DEFAULT_RATIO_TOLERANCE_BIPS: u64 = 50;

    /// Iteration budget used by route-to-ratio when the caller gives none
    pub const DEFAULT_RATIO_MAX_ITERATIONS: usize = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalised() {
        let a = Address::new("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let b = Address::new("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    }

    #[test]
    fn test_address_bytes() {
        let a = Address::new("0x0000000000000000000000000000000000000001");
        let bytes = a.to_bytes().unwrap();
        assert_eq!(bytes[19], 1);
        assert_eq!(Address::from_bytes(bytes), a);
        assert!(Address::new("0x1234").to_bytes().is_none());
    }

    #[test]
    fn test_token_equality_ignores_metadata() {
        let a = Token::new(ChainId::Mainnet, "0xaa", 18, Some("AAA"), None);
        let b = Token::new(ChainId::Mainnet, "0xAA", 6, None, Some("other"));
        let c = Token::new(ChainId::Optimism, "0xaa", 18, Some("AAA"), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_token_sorting() {
        let a = Token::new(ChainId::Mainnet, "0x01", 18, None, None);
        let b = Token::new(ChainId::Mainnet, "0x02", 18, None, None);
        assert!(a.sorts_before(&b));
        assert!(!b.sorts_before(&a));
    }

    #[test]
    fn test_protocol_serde() {
        let json = serde_json::to_string(&Protocol::Mixed).unwrap();
        assert_eq!(json, "\"MIXED\"");
        let p: Protocol = serde_json::from_str("\"V3\"").unwrap();
        assert_eq!(p, Protocol::V3);
    }
}
