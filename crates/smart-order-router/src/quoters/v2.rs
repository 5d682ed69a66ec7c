//! Constant-product quotes computed directly from pair reserves

use amm::{AmmError, Pair};
use async_trait::async_trait;
use router_core::{BlockNumber, CurrencyAmount, Result, RoutingError, TradeType};
use tracing::debug;

use crate::entities::Route;
use crate::quoters::{AmountQuote, QuoteBatch, QuoteProvider, RouteWithQuotes};

/// Quotes V2 routes from the hydrated reserves carried by the route itself
#[derive(Debug, Clone, Default)]
pub struct V2QuoteProvider;

impl V2QuoteProvider {
    pub fn new() -> Self {
        Self
    }

    fn fold_exact_in(pairs: &[Pair], amount: &CurrencyAmount) -> std::result::Result<CurrencyAmount, AmmError> {
        let mut current = amount.clone();
        for pair in pairs {
            current = pair.get_output_amount(&current)?.0;
        }
        Ok(current)
    }

    fn fold_exact_out(pairs: &[Pair], amount: &CurrencyAmount) -> std::result::Result<CurrencyAmount, AmmError> {
        let mut current = amount.clone();
        for pair in pairs.iter().rev() {
            current = pair.get_input_amount(&current)?.0;
        }
        Ok(current)
    }
}

#[async_trait]
impl QuoteProvider for V2QuoteProvider {
    async fn get_quotes_many(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[Route],
        trade_type: TradeType,
        block_number: Option<BlockNumber>,
    ) -> Result<QuoteBatch> {
        let mut routes_with_quotes = Vec::with_capacity(routes.len());
        for route in routes {
            let Route::V2(v2) = route else {
                return Err(RoutingError::InvalidRoute {
                    message: format!("V2 quoter received a {} route", route.protocol()),
                }
                .into());
            };
            let mut quotes = Vec::with_capacity(amounts.len());
            for amount in amounts {
                let outcome = match trade_type {
                    TradeType::ExactInput => Self::fold_exact_in(&v2.pairs, amount),
                    TradeType::ExactOutput => Self::fold_exact_out(&v2.pairs, amount),
                };
                match outcome {
                    Ok(quote) => quotes.push(AmountQuote {
                        amount: amount.clone(),
                        quote: Some(quote.raw),
                        sqrt_price_x96_after_list: None,
                        initialized_ticks_crossed_list: None,
                        gas_estimate: None,
                    }),
                    Err(e) if e.is_no_quote() => {
                        debug!(route = %route, amount = %amount, "No V2 quote: {}", e);
                        quotes.push(AmountQuote::none(amount.clone()));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            routes_with_quotes.push(RouteWithQuotes {
                route: route.clone(),
                quotes,
            });
        }
        Ok(QuoteBatch {
            routes_with_quotes,
            block_number: block_number.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::V2Route;
    use num_bigint::BigInt;
    use router_core::{ChainId, Token};

    fn make_route() -> (Route, Token, Token) {
        let a = Token::new(ChainId::Mainnet, "0x0a", 18, Some("A"), None);
        let b = Token::new(ChainId::Mainnet, "0x0b", 18, Some("B"), None);
        let pair = Pair::new(a.clone(), b.clone(), 1_000_000u64, 1_000_000u64, false);
        (
            Route::V2(V2Route::new(vec![pair], a.clone(), b.clone()).unwrap()),
            a,
            b,
        )
    }

    #[tokio::test]
    async fn test_exact_in_quotes_and_no_quote_rows() {
        let (route, a, _) = make_route();
        let amounts = vec![
            CurrencyAmount::from_raw(a.clone(), 1_000),
            CurrencyAmount::from_raw(a, 0),
        ];
        let batch = V2QuoteProvider::new()
            .get_quotes_many(&amounts, &[route], TradeType::ExactInput, Some(7))
            .await
            .unwrap();
        assert_eq!(batch.block_number, 7);
        let quotes = &batch.routes_with_quotes[0].quotes;
        // 1000 * 997 * 1e6 / (1e6 * 1000 + 997_000) = 996
        assert_eq!(quotes[0].quote, Some(BigInt::from(996)));
        assert_eq!(quotes[1].quote, None);
    }

    #[tokio::test]
    async fn test_exact_out_draining_reserve_is_no_quote() {
        let (route, _, b) = make_route();
        let amounts = vec![
            CurrencyAmount::from_raw(b.clone(), 996),
            CurrencyAmount::from_raw(b, 1_000_000),
        ];
        let batch = V2QuoteProvider::new()
            .get_quotes_many(&amounts, &[route], TradeType::ExactOutput, None)
            .await
            .unwrap();
        let quotes = &batch.routes_with_quotes[0].quotes;
        assert!(quotes[0].quote.as_ref().unwrap() <= &BigInt::from(1_000));
        assert_eq!(quotes[1].quote, None);
    }
}
