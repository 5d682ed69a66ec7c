//! Token metadata, blocklists and transfer validation

use std::collections::HashMap;

use async_trait::async_trait;
use router_core::{Address, BlockNumber, Result, Token};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct TokenAccessor {
    tokens: HashMap<Address, Token>,
}

impl TokenAccessor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| (t.address.clone(), t)).collect(),
        }
    }

    pub fn get_token_by_address(&self, address: &Address) -> Option<&Token> {
        self.tokens.get(address)
    }

    pub fn get_all_tokens(&self) -> Vec<Token> {
        self.tokens.values().cloned().collect()
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Unknown addresses are absent from the accessor rather than an error.
    async fn get_tokens(&self, addresses: &[Address], block_number: Option<BlockNumber>) -> Result<TokenAccessor>;
}

/// A curated token list, used here for blocklists
#[async_trait]
pub trait TokenListProvider: Send + Sync {
    async fn get_token_by_address(&self, address: &Address) -> Result<Option<Token>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenValidationResult {
    Unknown,
    /// Fee on transfer
    Fot,
    /// Transfer restricted
    Stf,
}

#[derive(Debug, Clone, Default)]
pub struct TokenValidationResults {
    results: HashMap<Address, TokenValidationResult>,
}

impl TokenValidationResults {
    pub fn new(results: HashMap<Address, TokenValidationResult>) -> Self {
        Self { results }
    }

    pub fn get(&self, address: &Address) -> TokenValidationResult {
        self.results
            .get(address)
            .copied()
            .unwrap_or(TokenValidationResult::Unknown)
    }

    /// Fee-on-transfer or transfer-restricted.
    pub fn is_restricted(&self, address: &Address) -> bool {
        self.get(address) != TokenValidationResult::Unknown
    }
}

#[async_trait]
pub trait TokenValidatorProvider: Send + Sync {
    async fn validate_tokens(&self, tokens: &[Token]) -> Result<TokenValidationResults>;
}
