//! Batched quoting against a quoter contract
//!
//! Calls are grouped into near-equal chunks and the chunks are sent
//! concurrently. A chunk is accepted only when its success rate clears the
//! configured floor and every accepted chunk reports the same block. Failed
//! chunks are retried with exponential backoff; gas and success-rate
//! failures each get one retry with the chain's override parameters.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures::future::join_all;
use num_bigint::BigInt;
use router_core::{
    BlockNumber, ChainId, CurrencyAmount, Protocol, ProviderError, QuoteProviderConfig, Result, RoutingError,
    TradeType,
};
use tracing::{debug, info, warn};

use crate::encoding::encode_route_path;
use crate::entities::Route;
use crate::quoters::{AmountQuote, QuoteBatch, QuoteProvider, RouteWithQuotes};

/// One quoter call: a route and one amount slice
#[derive(Debug, Clone)]
pub struct QuoteCall {
    pub route_index: usize,
    pub amount_index: usize,
    pub route: Route,
    pub amount: CurrencyAmount,
    /// Packed path, reversed for exact output
    pub encoded_path: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteCallSuccess {
    pub amount: BigInt,
    pub sqrt_price_x96_after_list: Vec<BigInt>,
    pub initialized_ticks_crossed_list: Vec<u32>,
    pub gas_estimate: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success(QuoteCallSuccess),
    Failure { reason: String },
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }
}

/// Response of one multicall: one result per call, in call order
#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub block_number: BlockNumber,
    pub approx_gas_used_per_success_call: u64,
    pub results: Vec<CallResult>,
}

/// Transport that executes a chunk of quoter calls in a single multicall
#[async_trait]
pub trait QuoteBatchSource: Send + Sync {
    async fn call_batch(
        &self,
        calls: &[QuoteCall],
        trade_type: TradeType,
        gas_limit_per_call: u64,
        block_number: Option<BlockNumber>,
    ) -> std::result::Result<BatchResponse, ProviderError>;
}

#[derive(Debug)]
enum ChunkStatus {
    Pending,
    Success(BatchResponse),
    Failed(ProviderError),
}

#[derive(Debug)]
struct Chunk {
    calls: Vec<QuoteCall>,
    status: ChunkStatus,
}

/// Quote provider backed by a [`QuoteBatchSource`]
pub struct OnChainQuoteProvider<S> {
    chain: ChainId,
    source: S,
    config: QuoteProviderConfig,
}

impl<S: QuoteBatchSource> OnChainQuoteProvider<S> {
    pub fn new(chain: ChainId, source: S, config: QuoteProviderConfig) -> Self {
        Self { chain, source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Split into `ceil(n / chunk)` chunks of near-equal size.
    fn chunk(calls: &[QuoteCall], multicall_chunk: usize) -> Vec<Chunk> {
        if calls.is_empty() {
            return Vec::new();
        }
        let multicall_chunk = multicall_chunk.max(1);
        let num_chunks = calls.len().div_ceil(multicall_chunk);
        let normalized = calls.len().div_ceil(num_chunks);
        calls
            .chunks(normalized)
            .map(|c| Chunk {
                calls: c.to_vec(),
                status: ChunkStatus::Pending,
            })
            .collect()
    }

    fn check_success_rate(&self, response: &BatchResponse, override_applied: bool) -> Option<ProviderError> {
        if response.results.is_empty() {
            return None;
        }
        let successes = response.results.iter().filter(|r| r.is_success()).count();
        let rate = successes as f64 / response.results.len() as f64;
        let minimum = self.config.batch.quote_min_success_rate;
        if rate >= minimum {
            return None;
        }
        if override_applied {
            info!(rate, minimum, "Quote success rate still low after override, accepting chunk");
            return None;
        }
        Some(ProviderError::SuccessRate { rate, minimum })
    }

    fn check_block_numbers(chunks: &[Chunk]) -> Option<ProviderError> {
        let mut blocks: Vec<BlockNumber> = chunks
            .iter()
            .filter_map(|c| match &c.status {
                ChunkStatus::Success(r) => Some(r.block_number),
                _ => None,
            })
            .collect();
        blocks.sort_unstable();
        blocks.dedup();
        (blocks.len() > 1).then_some(ProviderError::BlockConflict { blocks })
    }

    fn all_none(routes: &[Route], amounts: &[CurrencyAmount]) -> QuoteBatch {
        QuoteBatch {
            routes_with_quotes: routes
                .iter()
                .map(|route| RouteWithQuotes {
                    route: route.clone(),
                    quotes: amounts.iter().cloned().map(AmountQuote::none).collect(),
                })
                .collect(),
            block_number: 0,
        }
    }

    fn assemble(routes: &[Route], amounts: &[CurrencyAmount], chunks: Vec<Chunk>) -> QuoteBatch {
        let mut grid: Vec<Vec<AmountQuote>> = routes
            .iter()
            .map(|_| amounts.iter().cloned().map(AmountQuote::none).collect())
            .collect();
        let mut block_number = 0;
        for chunk in chunks {
            let ChunkStatus::Success(response) = chunk.status else {
                continue;
            };
            block_number = response.block_number;
            for (call, result) in chunk.calls.into_iter().zip(response.results) {
                if let CallResult::Success(success) = result {
                    grid[call.route_index][call.amount_index] = AmountQuote {
                        amount: call.amount,
                        quote: Some(success.amount),
                        sqrt_price_x96_after_list: Some(success.sqrt_price_x96_after_list),
                        initialized_ticks_crossed_list: Some(success.initialized_ticks_crossed_list),
                        gas_estimate: Some(success.gas_estimate),
                    };
                }
            }
        }
        QuoteBatch {
            routes_with_quotes: routes
                .iter()
                .cloned()
                .zip(grid)
                .map(|(route, quotes)| RouteWithQuotes { route, quotes })
                .collect(),
            block_number,
        }
    }
}

#[async_trait]
impl<S: QuoteBatchSource> QuoteProvider for OnChainQuoteProvider<S> {
    async fn get_quotes_many(
        &self,
        amounts: &[CurrencyAmount],
        routes: &[Route],
        trade_type: TradeType,
        block_number: Option<BlockNumber>,
    ) -> Result<QuoteBatch> {
        if trade_type == TradeType::ExactOutput && routes.iter().any(|r| r.protocol() != Protocol::V3) {
            return Err(RoutingError::InvalidRoute {
                message: "Cannot call quoteExactOutput with V2 or Mixed routes".into(),
            }
            .into());
        }

        let exact_output = trade_type == TradeType::ExactOutput;
        let mut calls = Vec::with_capacity(routes.len() * amounts.len());
        for (route_index, route) in routes.iter().enumerate() {
            let encoded_path = encode_route_path(route, exact_output)?;
            for (amount_index, amount) in amounts.iter().enumerate() {
                calls.push(QuoteCall {
                    route_index,
                    amount_index,
                    route: route.clone(),
                    amount: amount.clone(),
                    encoded_path: encoded_path.clone(),
                });
            }
        }
        if calls.is_empty() {
            return Ok(QuoteBatch {
                routes_with_quotes: Vec::new(),
                block_number: block_number.unwrap_or_default(),
            });
        }

        let mut multicall_chunk = self.config.batch.multicall_chunk;
        let mut gas_limit = self.config.batch.gas_limit_per_call;
        let mut gas_override_applied = false;
        let mut success_rate_override_applied = false;
        let mut chunks = Self::chunk(&calls, multicall_chunk);

        let max_interval = Duration::from_millis(self.config.retry.max_timeout_ms);
        let mut backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(self.config.retry.min_timeout_ms),
            current_interval: Duration::from_millis(self.config.retry.min_timeout_ms),
            max_interval,
            max_elapsed_time: None,
            ..Default::default()
        };
        let total_attempts = self.config.retry.retries + 1;

        info!(
            routes = routes.len(),
            amounts = amounts.len(),
            calls = calls.len(),
            chunks = chunks.len(),
            gas_limit,
            "About to get quotes in chunks"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;

            let pending = chunks
                .iter()
                .enumerate()
                .filter(|(_, c)| !matches!(c.status, ChunkStatus::Success(_)))
                .map(|(i, c)| {
                    let source = &self.source;
                    async move {
                        (
                            i,
                            source.call_batch(&c.calls, trade_type, gas_limit, block_number).await,
                        )
                    }
                });
            let outcomes = join_all(pending).await;
            for (i, outcome) in outcomes {
                chunks[i].status = match outcome {
                    Ok(response) => match self.check_success_rate(&response, success_rate_override_applied) {
                        Some(err) => ChunkStatus::Failed(err),
                        None => ChunkStatus::Success(response),
                    },
                    Err(err) => ChunkStatus::Failed(err),
                };
            }

            let block_conflict = Self::check_block_numbers(&chunks);
            let failed: Vec<&ProviderError> = chunks
                .iter()
                .filter_map(|c| match &c.status {
                    ChunkStatus::Failed(e) => Some(e),
                    _ => None,
                })
                .collect();

            if failed.is_empty() && block_conflict.is_none() {
                debug!(attempt, "All quote chunks succeeded");
                return Ok(Self::assemble(routes, amounts, chunks));
            }

            let all_out_of_gas = !failed.is_empty()
                && failed.len() == chunks.len()
                && failed.iter().all(|e| matches!(e, ProviderError::OutOfGas { .. }));
            let mut retry_all = block_conflict.is_some();
            if let Some(conflict) = &block_conflict {
                info!(attempt, "{}", conflict);
            }
            if !failed.is_empty() {
                let reasons: Vec<String> = failed.iter().map(|e| e.to_string()).collect();
                info!(
                    attempt,
                    failed = failed.len(),
                    total = chunks.len(),
                    "Quote chunks failed: {}",
                    reasons.join(", ")
                );
                let saw_gas = failed.iter().any(|e| matches!(e, ProviderError::OutOfGas { .. }));
                let saw_rate = failed.iter().any(|e| matches!(e, ProviderError::SuccessRate { .. }));
                let fatal = failed.iter().any(|e| !e.is_retryable());
                if fatal {
                    warn!(attempt, "Quote provider failure is not retryable");
                }
                if saw_gas && !gas_override_applied {
                    gas_override_applied = true;
                    gas_limit = self.config.gas_error_override.gas_limit_override;
                    multicall_chunk = self.config.gas_error_override.multicall_chunk;
                    retry_all = true;
                    info!(gas_limit, multicall_chunk, "Applying gas error override");
                } else if saw_rate && !success_rate_override_applied {
                    success_rate_override_applied = true;
                    gas_limit = self.config.success_rate_override.gas_limit_override;
                    multicall_chunk = self.config.success_rate_override.multicall_chunk;
                    retry_all = true;
                    info!(gas_limit, multicall_chunk, "Applying success rate override");
                }
                if fatal {
                    attempt = total_attempts;
                }
            }

            if attempt >= total_attempts {
                if self.chain == ChainId::Arbitrum && all_out_of_gas {
                    warn!("Every quote chunk ran out of gas on Arbitrum, returning empty quotes");
                    return Ok(Self::all_none(routes, amounts));
                }
                let error = block_conflict.unwrap_or_else(|| {
                    chunks
                        .into_iter()
                        .find_map(|c| match c.status {
                            ChunkStatus::Failed(e) => Some(e),
                            _ => None,
                        })
                        .unwrap_or(ProviderError::Upstream {
                            message: "quote chunks failed".into(),
                        })
                });
                warn!(attempt, "Failed to get quotes: {}", error);
                return Err(error.into());
            }

            if retry_all {
                chunks = Self::chunk(&calls, multicall_chunk);
            }
            let wait = backoff.next_backoff().unwrap_or(max_interval);
            tokio::time::sleep(wait).await;
        }
    }
}
