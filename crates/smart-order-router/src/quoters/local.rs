//! In-process quoter calls simulated against hydrated pool state

use amm::{AmmError, Pool};
use async_trait::async_trait;
use num_bigint::BigInt;
use router_core::{BlockNumber, CurrencyAmount, ProviderError, TradeType};
use tracing::trace;

use crate::quoters::on_chain::{BatchResponse, CallResult, QuoteBatchSource, QuoteCall, QuoteCallSuccess};

/// Approximate gas the quoter burns per concentrated-liquidity hop
const QUOTER_V3_HOP_GAS: u64 = 60_000;
const QUOTER_V2_HOP_GAS: u64 = 40_000;
const QUOTER_TICK_GAS: u64 = 31_000;

/// Answers quoter multicalls by simulating every hop locally.
///
/// Concentrated-liquidity hops report the post-swap sqrt price and the
/// number of initialized ticks crossed; pair hops report zero for both.
#[derive(Debug, Clone)]
pub struct LocalQuoteSource {
    block_number: BlockNumber,
}

struct HopOutcome {
    amount: CurrencyAmount,
    sqrt_price_x96_after: BigInt,
    ticks_crossed: u32,
    gas: u64,
}

impl LocalQuoteSource {
    pub fn new(block_number: BlockNumber) -> Self {
        Self { block_number }
    }

    fn hop(pool: &Pool, amount: &CurrencyAmount, exact_input: bool) -> Result<HopOutcome, AmmError> {
        match pool {
            Pool::V3(p) => {
                let swap = if exact_input {
                    p.get_output_amount(amount, None)?
                } else {
                    p.get_input_amount(amount, None)?
                };
                Ok(HopOutcome {
                    gas: QUOTER_V3_HOP_GAS + QUOTER_TICK_GAS * u64::from(swap.initialized_ticks_crossed),
                    amount: swap.amount,
                    sqrt_price_x96_after: swap.sqrt_price_x96_after,
                    ticks_crossed: swap.initialized_ticks_crossed,
                })
            }
            Pool::V2(p) => {
                let (next, _) = if exact_input {
                    p.get_output_amount(amount)?
                } else {
                    p.get_input_amount(amount)?
                };
                Ok(HopOutcome {
                    amount: next,
                    sqrt_price_x96_after: BigInt::from(0u8),
                    ticks_crossed: 0,
                    gas: QUOTER_V2_HOP_GAS,
                })
            }
        }
    }

    fn quote(call: &QuoteCall, trade_type: TradeType, gas_limit_per_call: u64) -> CallResult {
        let pools = call.route.pools();
        let exact_input = trade_type == TradeType::ExactInput;
        let ordered: Vec<&Pool> = if exact_input {
            pools.iter().collect()
        } else {
            pools.iter().rev().collect()
        };

        let mut current = call.amount.clone();
        let mut sqrt_list = Vec::with_capacity(ordered.len());
        let mut ticks_list = Vec::with_capacity(ordered.len());
        let mut gas_estimate = 0u64;
        for pool in ordered {
            match Self::hop(pool, &current, exact_input) {
                Ok(outcome) => {
                    current = outcome.amount;
                    sqrt_list.push(outcome.sqrt_price_x96_after);
                    ticks_list.push(outcome.ticks_crossed);
                    gas_estimate += outcome.gas;
                }
                Err(e) => {
                    trace!(route = %call.route, amount = %call.amount, "Quote call reverted: {}", e);
                    return CallResult::Failure { reason: e.to_string() };
                }
            }
        }
        if gas_estimate > gas_limit_per_call {
            return CallResult::Failure {
                reason: format!("out of gas: {} > {}", gas_estimate, gas_limit_per_call),
            };
        }
        CallResult::Success(QuoteCallSuccess {
            amount: current.raw,
            sqrt_price_x96_after_list: sqrt_list,
            initialized_ticks_crossed_list: ticks_list,
            gas_estimate,
        })
    }
}

#[async_trait]
impl QuoteBatchSource for LocalQuoteSource {
    async fn call_batch(
        &self,
        calls: &[QuoteCall],
        trade_type: TradeType,
        gas_limit_per_call: u64,
        block_number: Option<BlockNumber>,
    ) -> Result<BatchResponse, ProviderError> {
        let results: Vec<CallResult> = calls
            .iter()
            .map(|call| Self::quote(call, trade_type, gas_limit_per_call))
            .collect();
        let gas: Vec<u64> = results
            .iter()
            .filter_map(|r| match r {
                CallResult::Success(s) => Some(s.gas_estimate),
                CallResult::Failure { .. } => None,
            })
            .collect();
        let approx_gas_used_per_success_call = if gas.is_empty() {
            0
        } else {
            gas.iter().sum::<u64>() / gas.len() as u64
        };
        Ok(BatchResponse {
            block_number: block_number.unwrap_or(self.block_number),
            approx_gas_used_per_success_call,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MixedRoute, Route};
    use amm::{FeeAmount, Pair, V3Pool};
    use router_core::{ChainId, Token};

    fn make_token(addr: &str, symbol: &str) -> Token {
        Token::new(ChainId::Mainnet, addr, 18, Some(symbol), None)
    }

    fn make_call(route: Route, amount: CurrencyAmount) -> QuoteCall {
        QuoteCall {
            route_index: 0,
            amount_index: 0,
            route,
            amount,
            encoded_path: Vec::new(),
        }
    }

    fn make_mixed() -> (Route, Token, Token) {
        let a = make_token("0x000000000000000000000000000000000000000a", "A");
        let b = make_token("0x000000000000000000000000000000000000000b", "B");
        let c = make_token("0x000000000000000000000000000000000000000c", "C");
        let v3 = V3Pool::new(
            a.clone(),
            c.clone(),
            FeeAmount::Medium,
            BigInt::from(1u8) << 96,
            10u128.pow(24),
            0,
            vec![],
        )
        .unwrap();
        let pair = Pair::new(c, b.clone(), 10u64.pow(12), 10u64.pow(12), false);
        let route = MixedRoute::new(vec![Pool::V3(v3), Pool::V2(pair)], a.clone(), b.clone()).unwrap();
        (Route::Mixed(route), a, b)
    }

    #[tokio::test]
    async fn test_mixed_route_reports_per_hop_data() {
        let (route, a, _) = make_mixed();
        let source = LocalQuoteSource::new(42);
        let call = make_call(route, CurrencyAmount::from_raw(a, 1_000_000u64));

        let response = source
            .call_batch(&[call], TradeType::ExactInput, 1_000_000, None)
            .await
            .unwrap();

        assert_eq!(response.block_number, 42);
        let CallResult::Success(success) = &response.results[0] else {
            panic!("expected a quote");
        };
        assert_eq!(success.sqrt_price_x96_after_list.len(), 2);
        assert_eq!(success.sqrt_price_x96_after_list[1], BigInt::from(0u8));
        assert_eq!(success.initialized_ticks_crossed_list, vec![0, 0]);
        assert_eq!(success.gas_estimate, QUOTER_V3_HOP_GAS + QUOTER_V2_HOP_GAS);
        assert!(success.amount > BigInt::from(0u8) && success.amount < BigInt::from(1_000_000u64));
        assert_eq!(response.approx_gas_used_per_success_call, success.gas_estimate);
    }

    #[tokio::test]
    async fn test_gas_limit_and_reverts_fail_calls() {
        let (route, a, _) = make_mixed();
        let source = LocalQuoteSource::new(1);
        let calls = vec![
            make_call(route.clone(), CurrencyAmount::from_raw(a.clone(), 1_000u64)),
            make_call(route, CurrencyAmount::from_raw(a, 0u64)),
        ];

        let response = source
            .call_batch(&calls, TradeType::ExactInput, 50_000, Some(9))
            .await
            .unwrap();

        assert_eq!(response.block_number, 9);
        assert!(matches!(&response.results[0], CallResult::Failure { reason } if reason.starts_with("out of gas")));
        assert!(!response.results[1].is_success());
        assert_eq!(response.approx_gas_used_per_success_call, 0);
    }
}
