//! Chain registry: ids, wrapped native tokens, base tokens and fee models

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::RoutingError;
use crate::types::{Token, TradeType};

/// Supported EVM chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum ChainId {
    Mainnet,
    Optimism,
    Arbitrum,
    Polygon,
    Celo,
    Base,
}

impl ChainId {
    pub const ALL: [ChainId; 6] = [
        ChainId::Mainnet,
        ChainId::Optimism,
        ChainId::Arbitrum,
        ChainId::Polygon,
        ChainId::Celo,
        ChainId::Base,
    ];

    pub fn id(&self) -> u64 {
        match self {
            ChainId::Mainnet => 1,
            ChainId::Optimism => 10,
            ChainId::Arbitrum => 42161,
            ChainId::Polygon => 137,
            ChainId::Celo => 42220,
            ChainId::Base => 8453,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Mainnet => "mainnet",
            ChainId::Optimism => "optimism",
            ChainId::Arbitrum => "arbitrum",
            ChainId::Polygon => "polygon",
            ChainId::Celo => "celo",
            ChainId::Base => "base",
        }
    }

    /// Whether constant-product (V2) pools are deployed on this chain.
    pub fn supports_v2(&self) -> bool {
        matches!(self, ChainId::Mainnet | ChainId::Celo)
    }

    /// Mixed routes need a router that can chain both pool kinds, and only
    /// exist for exact-input trades.
    pub fn supports_mixed(&self, trade_type: TradeType) -> bool {
        matches!(self, ChainId::Mainnet | ChainId::Celo) && trade_type == TradeType::ExactInput
    }

    /// Data-availability fee model for rollups, `None` on L1s.
    pub fn l1_fee_model(&self) -> Option<L1FeeModel> {
        match self {
            ChainId::Optimism | ChainId::Base => Some(L1FeeModel::OpStack),
            ChainId::Arbitrum => Some(L1FeeModel::Arbitrum),
            _ => None,
        }
    }

    pub fn has_l1_fee(&self) -> bool {
        self.l1_fee_model().is_some()
    }
}

impl TryFrom<u64> for ChainId {
    type Error = RoutingError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        ChainId::ALL
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or(RoutingError::UnsupportedChain { chain_id: id })
    }
}

impl From<ChainId> for u64 {
    fn from(c: ChainId) -> u64 {
        c.id()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rollup prices posting its calldata to L1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum L1FeeModel {
    OpStack,
    Arbitrum,
}

/// Token address book per chain
pub mod tokens {
    use super::ChainId;
    use crate::types::Token;

    fn t(chain: ChainId, addr: &str, decimals: u8, symbol: &str, name: &str) -> Token {
        Token::new(chain, addr, decimals, Some(symbol), Some(name))
    }

    pub fn weth_mainnet() -> Token {
        t(ChainId::Mainnet, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, "WETH", "Wrapped Ether")
    }
    pub fn usdc_mainnet() -> Token {
        t(ChainId::Mainnet, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, "USDC", "USD//C")
    }
    pub fn usdt_mainnet() -> Token {
        t(ChainId::Mainnet, "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6, "USDT", "Tether USD")
    }
    pub fn wbtc_mainnet() -> Token {
        t(ChainId::Mainnet, "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8, "WBTC", "Wrapped BTC")
    }
    pub fn dai_mainnet() -> Token {
        t(ChainId::Mainnet, "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18, "DAI", "Dai Stablecoin")
    }
    pub fn fei_mainnet() -> Token {
        t(ChainId::Mainnet, "0x956F47F50A910163D8BF957Cf5846D573E7f87CA", 18, "FEI", "Fei USD")
    }

    pub fn weth_optimism() -> Token {
        t(ChainId::Optimism, "0x4200000000000000000000000000000000000006", 18, "WETH", "Wrapped Ether")
    }
    pub fn usdc_optimism() -> Token {
        t(ChainId::Optimism, "0x7F5c764cBc14f9669B88837ca1490cCa17c31607", 6, "USDC", "USD//C")
    }
    pub fn usdt_optimism() -> Token {
        t(ChainId::Optimism, "0x94b008aA00579c1307B0EF2c499aD98a8ce58e58", 6, "USDT", "Tether USD")
    }
    pub fn wbtc_optimism() -> Token {
        t(ChainId::Optimism, "0x68f180fcCe6836688e9084f035309E29Bf0A2095", 8, "WBTC", "Wrapped BTC")
    }
    pub fn dai_optimism() -> Token {
        t(ChainId::Optimism, "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", 18, "DAI", "Dai Stablecoin")
    }

    pub fn weth_arbitrum() -> Token {
        t(ChainId::Arbitrum, "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", 18, "WETH", "Wrapped Ether")
    }
    pub fn usdc_arbitrum() -> Token {
        t(ChainId::Arbitrum, "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8", 6, "USDC", "USD//C")
    }
    pub fn usdt_arbitrum() -> Token {
        t(ChainId::Arbitrum, "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", 6, "USDT", "Tether USD")
    }
    pub fn wbtc_arbitrum() -> Token {
        t(ChainId::Arbitrum, "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f", 8, "WBTC", "Wrapped BTC")
    }
    pub fn dai_arbitrum() -> Token {
        t(ChainId::Arbitrum, "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1", 18, "DAI", "Dai Stablecoin")
    }

    pub fn wmatic_polygon() -> Token {
        t(ChainId::Polygon, "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", 18, "WMATIC", "Wrapped MATIC")
    }
    pub fn usdc_polygon() -> Token {
        t(ChainId::Polygon, "0x2791bca1f2de4661ed88a30c99a7a9449aa84174", 6, "USDC", "USD//C")
    }
    pub fn dai_polygon() -> Token {
        t(ChainId::Polygon, "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063", 18, "DAI", "Dai Stablecoin")
    }

    pub fn celo() -> Token {
        t(ChainId::Celo, "0x471EcE3750Da237f93B8E339c536989b8978a438", 18, "CELO", "Celo native asset")
    }
    pub fn cusd_celo() -> Token {
        t(ChainId::Celo, "0x765DE816845861e75A25fCA122bb6898B8B1282a", 18, "CUSD", "Celo Dollar")
    }
    pub fn ceur_celo() -> Token {
        t(ChainId::Celo, "0xD8763CBa276a3738E6DE85b4b3bF5FDed6D6cA73", 18, "CEUR", "Celo Euro")
    }

    pub fn weth_base() -> Token {
        t(ChainId::Base, "0x4200000000000000000000000000000000000006", 18, "WETH", "Wrapped Ether")
    }
    pub fn usdc_base() -> Token {
        t(ChainId::Base, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", 6, "USDC", "USD Coin")
    }
}

/// Wrapped form of the chain's gas currency.
pub fn wrapped_native(chain: ChainId) -> Token {
    match chain {
        ChainId::Mainnet => tokens::weth_mainnet(),
        ChainId::Optimism => tokens::weth_optimism(),
        ChainId::Arbitrum => tokens::weth_arbitrum(),
        ChainId::Polygon => tokens::wmatic_polygon(),
        ChainId::Celo => tokens::celo(),
        ChainId::Base => tokens::weth_base(),
    }
}

/// Tokens used to build candidate hops through liquid intermediaries.
pub fn base_tokens(chain: ChainId) -> Vec<Token> {
    match chain {
        ChainId::Mainnet => vec![
            tokens::usdc_mainnet(),
            tokens::usdt_mainnet(),
            tokens::wbtc_mainnet(),
            tokens::dai_mainnet(),
            tokens::weth_mainnet(),
            tokens::fei_mainnet(),
        ],
        ChainId::Optimism => vec![
            tokens::dai_optimism(),
            tokens::usdc_optimism(),
            tokens::usdt_optimism(),
            tokens::wbtc_optimism(),
        ],
        ChainId::Arbitrum => vec![
            tokens::dai_arbitrum(),
            tokens::usdc_arbitrum(),
            tokens::wbtc_arbitrum(),
            tokens::usdt_arbitrum(),
        ],
        ChainId::Polygon => vec![tokens::usdc_polygon(), tokens::wmatic_polygon()],
        ChainId::Celo => vec![tokens::cusd_celo(), tokens::ceur_celo(), tokens::celo()],
        ChainId::Base => vec![tokens::usdc_base(), tokens::weth_base()],
    }
}

/// USD-pegged tokens usable to express gas costs in dollars, preferred first.
pub fn usd_gas_tokens(chain: ChainId) -> Vec<Token> {
    match chain {
        ChainId::Mainnet => vec![
            tokens::dai_mainnet(),
            tokens::usdc_mainnet(),
            tokens::usdt_mainnet(),
        ],
        ChainId::Optimism => vec![
            tokens::dai_optimism(),
            tokens::usdc_optimism(),
            tokens::usdt_optimism(),
        ],
        ChainId::Arbitrum => vec![
            tokens::dai_arbitrum(),
            tokens::usdc_arbitrum(),
            tokens::usdt_arbitrum(),
        ],
        ChainId::Polygon => vec![tokens::usdc_polygon(), tokens::dai_polygon()],
        ChainId::Celo => vec![tokens::cusd_celo()],
        ChainId::Base => vec![tokens::usdc_base()],
    }
}

/// Whether the chain's native asset trades as WETH/WMATIC and therefore
/// needs a dedicated native/quote pool to price gas.
pub fn prices_gas_via_wrapped_native(chain: ChainId) -> bool {
    let native = wrapped_native(chain);
    matches!(native.symbol.as_deref(), Some("WETH") | Some("WMATIC"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_roundtrip_u64() {
        for chain in ChainId::ALL {
            assert_eq!(ChainId::try_from(chain.id()).unwrap(), chain);
        }
        assert!(ChainId::try_from(999u64).is_err());
    }

    #[test]
    fn test_chain_serde_as_number() {
        let json = serde_json::to_string(&ChainId::Arbitrum).unwrap();
        assert_eq!(json, "42161");
        let c: ChainId = serde_json::from_str("10").unwrap();
        assert_eq!(c, ChainId::Optimism);
    }

    #[test]
    fn test_l1_fee_chains() {
        assert_eq!(ChainId::Optimism.l1_fee_model(), Some(L1FeeModel::OpStack));
        assert_eq!(ChainId::Base.l1_fee_model(), Some(L1FeeModel::OpStack));
        assert_eq!(ChainId::Arbitrum.l1_fee_model(), Some(L1FeeModel::Arbitrum));
        assert!(!ChainId::Mainnet.has_l1_fee());
    }

    #[test]
    fn test_mixed_support_exact_input_only() {
        assert!(ChainId::Mainnet.supports_mixed(TradeType::ExactInput));
        assert!(!ChainId::Mainnet.supports_mixed(TradeType::ExactOutput));
        assert!(!ChainId::Optimism.supports_mixed(TradeType::ExactInput));
    }

    #[test]
    fn test_registry_tokens_on_own_chain() {
        for chain in ChainId::ALL {
            assert_eq!(wrapped_native(chain).chain_id, chain);
            assert!(base_tokens(chain).iter().all(|t| t.chain_id == chain));
            assert!(!usd_gas_tokens(chain).is_empty());
        }
    }

    #[test]
    fn test_gas_pricing_native() {
        assert!(prices_gas_via_wrapped_native(ChainId::Mainnet));
        assert!(prices_gas_via_wrapped_native(ChainId::Polygon));
        assert!(!prices_gas_via_wrapped_native(ChainId::Celo));
    }
}
