//! Quote acquisition
//!
//! For each route and each amount slice a quoter returns the counterpart
//! amount, or `None` when the pools cannot fill the slice. No-quote rows
//! never fail a batch.

pub mod local;
pub mod on_chain;
pub mod v2;

use async_trait::async_trait;
use num_bigint::BigInt;
use router_core::{BlockNumber, CurrencyAmount, Protocol, Result, Token, TradeType};
use tracing::debug;

use crate::entities::{Route, RouteQuoteParams, RouteWithValidQuote};
use crate::gas_models::GasModel;

pub use local::LocalQuoteSource;
pub use on_chain::{BatchResponse, CallResult, OnChainQuoteProvider, QuoteBatchSource, QuoteCall, QuoteCallSuccess};
pub use v2::V2QuoteProvider;

/// Quote for one amount slice of one route
#[derive(Debug, Clone, PartialEq)]
pub struct AmountQuote {
    pub amount: CurrencyAmount,
    pub quote: Option<BigInt>,
    pub sqrt_price_x96_after_list: Option<Vec<BigInt>>,
    pub initialized_ticks_crossed_list: Option<Vec<u32>>,
    pub gas_estimate: Option<u64>,
}

impl AmountQuote {
    pub fn none(amount: CurrencyAmount) -> Self {
        Self {
            amount,
            quote: None,
            sqrt_price_x96_after_list: None,
            initialized_ticks_crossed_list: None,
            gas_estimate: None,
        }
    }
}

/// A route with one quote per requested amount, in request order
#[derive(Debug, Clone)]
pub struct RouteWithQuotes {
    pub route: Route,
    pub quotes: Vec<AmountQuote>,
}

#[derive(Debug, Clone)]
pub struct QuoteBatch {
    pub routes_with_quotes: Vec<RouteWithQuotes>,
    pub block_number: BlockNumber,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quotes_many(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[Route],
        trade_type: TradeType,
        block_number: Option<BlockNumber>,
    ) -> Result<QuoteBatch>;
}

/// Bind quotes to their percentages and price gas, dropping rows with a
/// missing quote or (for concentrated-liquidity hops) missing swap data.
pub fn to_routes_with_valid_quotes(
    batch: QuoteBatch,
    percents: &[u32],
    trade_type: TradeType,
    quote_token: &Token,
    gas_model: &dyn GasModel,
) -> Vec<RouteWithValidQuote> {
    let mut valid = Vec::new();
    for RouteWithQuotes { route, quotes } in batch.routes_with_quotes {
        for (quote, percent) in quotes.into_iter().zip(percents) {
            let needs_swap_data = route.protocol() != Protocol::V2;
            let (raw_quote, sqrt_list, ticks_list) = match (
                quote.quote,
                quote.sqrt_price_x96_after_list,
                quote.initialized_ticks_crossed_list,
            ) {
                (Some(q), Some(s), Some(t)) => (q, s, t),
                (Some(q), s, t) if !needs_swap_data => (q, s.unwrap_or_default(), t.unwrap_or_default()),
                _ => {
                    debug!(route = %route, percent, "Dropping a null quote for route");
                    continue;
                }
            };
            if needs_swap_data && quote.gas_estimate.is_none() {
                debug!(route = %route, percent, "Dropping a quote without gas estimate");
                continue;
            }

            valid.push(RouteWithValidQuote::new(
                RouteQuoteParams {
                    route: route.clone(),
                    amount: quote.amount,
                    raw_quote,
                    percent: *percent,
                    trade_type,
                    quote_token: quote_token.clone(),
                    sqrt_price_x96_after_list: sqrt_list,
                    initialized_ticks_crossed_list: ticks_list,
                    quoter_gas_estimate: quote.gas_estimate.unwrap_or_default(),
                },
                gas_model,
            ));
        }
    }
    valid
}
