//! The routing entry point
//!
//! `AlphaRouter::route` resolves the request's config, block and gas price,
//! builds the gas models, fans out one pipeline per protocol (candidate
//! pools, route enumeration, quoting), and hands every valid quote to the
//! split-route search.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use amm::Pool;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use num_bigint::BigInt;
use router_core::{
    Address, BlockNumber, ChainId, CurrencyAmount, Fraction, Protocol, QuoteProviderConfig, Result, RoutingConfig,
    RoutingConfigOverrides, RoutingError, Token, TradeType,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::best_swap_route::{get_best_swap_route, BestSwapRoute};
use crate::candidate_pools::{
    apply_token_validator, get_mixed_route_candidate_pools, get_v2_candidate_pools, get_v3_candidate_pools,
    pool_tokens, v2_pair_tokens, v3_pool_tokens, CandidatePoolsBySelectionCriteria, CandidatePoolsParams,
    V2CandidatePools, V3CandidatePools,
};
use crate::compute_routes::{compute_all_mixed_routes, compute_all_v2_routes, compute_all_v3_routes};
use crate::entities::{routes_to_string, Route, RouteWithValidQuote};
use crate::gas_models::gas_costs::native_overhead;
use crate::gas_models::{
    GasModel, MixedRouteHeuristicGasModel, V2GasModelPools, V2HeuristicGasModel, V3GasModelPools,
    V3HeuristicGasModel,
};
use crate::method_parameters::{build_swap_method_parameters, MethodParameters, SwapOptions};
use crate::providers::{
    BalanceProvider, BlockNumberProvider, GasPriceProvider, L2GasDataProvider, SimulationStatus, Simulator,
    SnapshotProvider, TokenListProvider, TokenProvider, TokenValidatorProvider, V2PoolProvider, V2SubgraphProvider,
    V3PoolProvider, V3SubgraphProvider,
};
use crate::quoters::{
    to_routes_with_valid_quotes, LocalQuoteSource, OnChainQuoteProvider, QuoteProvider, V2QuoteProvider,
};

/// Block number lookups are retried this many times after the first
const BLOCK_NUMBER_RETRIES: u32 = 2;
const BLOCK_NUMBER_MIN_BACKOFF: Duration = Duration::from_millis(100);
const BLOCK_NUMBER_MAX_BACKOFF: Duration = Duration::from_millis(1_000);

/// The routed swap handed back to callers
#[derive(Debug, Clone)]
pub struct SwapRoute {
    pub trade_type: TradeType,
    /// The requested amount (input for exact input, output for exact output)
    pub amount: CurrencyAmount,
    pub quote: CurrencyAmount,
    pub quote_gas_adjusted: CurrencyAmount,
    pub estimated_gas_used: u64,
    pub estimated_gas_used_quote_token: CurrencyAmount,
    pub estimated_gas_used_usd: CurrencyAmount,
    pub gas_price_wei: BigInt,
    pub route: Vec<RouteWithValidQuote>,
    pub block_number: BlockNumber,
    pub method_parameters: Option<MethodParameters>,
    pub simulation_status: Option<SimulationStatus>,
}

impl SwapRoute {
    pub fn input_amount(&self) -> &CurrencyAmount {
        match self.trade_type {
            TradeType::ExactInput => &self.amount,
            TradeType::ExactOutput => &self.quote,
        }
    }

    pub fn output_amount(&self) -> &CurrencyAmount {
        match self.trade_type {
            TradeType::ExactInput => &self.quote,
            TradeType::ExactOutput => &self.amount,
        }
    }
}

/// Collaborators the router reads chain state through
#[derive(Clone)]
pub struct AlphaRouterParams {
    pub chain: ChainId,
    pub v3_subgraph_provider: Arc<dyn V3SubgraphProvider>,
    pub v2_subgraph_provider: Arc<dyn V2SubgraphProvider>,
    pub v3_pool_provider: Arc<dyn V3PoolProvider>,
    pub v2_pool_provider: Arc<dyn V2PoolProvider>,
    pub token_provider: Arc<dyn TokenProvider>,
    pub blocked_token_list_provider: Option<Arc<dyn TokenListProvider>>,
    pub token_validator_provider: Option<Arc<dyn TokenValidatorProvider>>,
    pub block_number_provider: Arc<dyn BlockNumberProvider>,
    pub gas_price_provider: Arc<dyn GasPriceProvider>,
    pub l2_gas_data_provider: Option<Arc<dyn L2GasDataProvider>>,
    pub balance_provider: Option<Arc<dyn BalanceProvider>>,
    pub simulator: Option<Arc<dyn Simulator>>,
    pub v3_quote_provider: Arc<dyn QuoteProvider>,
    pub v2_quote_provider: Arc<dyn QuoteProvider>,
    pub mixed_quote_provider: Arc<dyn QuoteProvider>,
}

impl AlphaRouterParams {
    /// Every collaborator served from one snapshot, with calls simulated locally.
    pub fn from_snapshot(snapshot: Arc<SnapshotProvider>) -> Self {
        let chain = snapshot.chain();
        let quoter: Arc<dyn QuoteProvider> = Arc::new(OnChainQuoteProvider::new(
            chain,
            LocalQuoteSource::new(snapshot.block_number()),
            QuoteProviderConfig::for_chain(chain),
        ));
        Self {
            chain,
            v3_subgraph_provider: snapshot.clone(),
            v2_subgraph_provider: snapshot.clone(),
            v3_pool_provider: snapshot.clone(),
            v2_pool_provider: snapshot.clone(),
            token_provider: snapshot.clone(),
            blocked_token_list_provider: Some(snapshot.clone()),
            token_validator_provider: Some(snapshot.clone()),
            block_number_provider: snapshot.clone(),
            gas_price_provider: snapshot.clone(),
            l2_gas_data_provider: chain.has_l1_fee().then(|| snapshot.clone() as Arc<dyn L2GasDataProvider>),
            balance_provider: Some(snapshot),
            simulator: None,
            v3_quote_provider: quoter.clone(),
            v2_quote_provider: Arc::new(V2QuoteProvider::new()),
            mixed_quote_provider: quoter,
        }
    }
}

/// Which pipelines a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProtocolPlan {
    v3_candidates: bool,
    v2_candidates: bool,
    quote_v3: bool,
    quote_v2: bool,
    quote_mixed: bool,
}

impl ProtocolPlan {
    fn new(chain: ChainId, protocols: &BTreeSet<Protocol>, trade_type: TradeType) -> Self {
        let none_specified = protocols.is_empty();
        let v3_specified = protocols.contains(&Protocol::V3);
        let v2_specified = protocols.contains(&Protocol::V2);
        let v2_supported = chain.supports_v2();
        let mixed = (protocols.contains(&Protocol::Mixed) || (none_specified && v2_supported))
            && chain.supports_mixed(trade_type);

        let quote_v3 = v3_specified || none_specified;
        let quote_v2 = v2_supported && (v2_specified || none_specified);
        Self {
            v3_candidates: quote_v3 || mixed,
            v2_candidates: quote_v2 || mixed,
            quote_v3,
            quote_v2,
            quote_mixed: mixed,
        }
    }
}

/// Per-request inputs shared by the protocol pipelines
struct QuoteContext<'a> {
    token_in: &'a Token,
    token_out: &'a Token,
    quote_token: &'a Token,
    trade_type: TradeType,
    percents: &'a [u32],
    amounts: &'a [CurrencyAmount],
    config: &'a RoutingConfig,
    block_number: BlockNumber,
    additional_gas_overhead: u64,
    gas_price_wei: &'a BigInt,
}

/// Output of one protocol pipeline
struct ProtocolQuotes {
    routes_with_valid_quotes: Vec<RouteWithValidQuote>,
    candidate_pools: Option<CandidatePoolsBySelectionCriteria>,
}

impl ProtocolQuotes {
    fn empty(candidate_pools: Option<CandidatePoolsBySelectionCriteria>) -> Self {
        Self {
            routes_with_valid_quotes: Vec::new(),
            candidate_pools,
        }
    }
}

/// Split-routing swap router
pub struct AlphaRouter {
    params: AlphaRouterParams,
}

impl AlphaRouter {
    pub fn new(params: AlphaRouterParams) -> Self {
        Self { params }
    }

    pub fn chain(&self) -> ChainId {
        self.params.chain
    }

    /// Route `amount` against `quote_currency`.
    ///
    /// For exact input `amount` is what the caller spends and the quote is
    /// what they receive; exact output is the reverse. `Ok(None)` means no
    /// route covers the whole amount.
    pub async fn route(
        &self,
        amount: &CurrencyAmount,
        quote_currency: &Token,
        trade_type: TradeType,
        swap_options: Option<SwapOptions>,
        overrides: RoutingConfigOverrides,
    ) -> Result<Option<SwapRoute>> {
        let chain = self.params.chain;
        let (token_in, token_out) = match trade_type {
            TradeType::ExactInput => (&amount.currency, quote_currency),
            TradeType::ExactOutput => (quote_currency, &amount.currency),
        };
        if amount.raw <= BigInt::from(0u8) {
            return Err(RoutingError::InvalidAmount {
                message: format!("amount must be positive, got {}", amount.raw),
            }
            .into());
        }
        if token_in == token_out {
            return Err(RoutingError::InvalidAmount {
                message: format!("cannot route {} to itself", token_in),
            }
            .into());
        }
        for token in [token_in, token_out] {
            if token.chain_id != chain {
                return Err(RoutingError::UnsupportedChain {
                    chain_id: token.chain_id.id(),
                }
                .into());
            }
        }

        info!(
            chain = %chain,
            token_in = %token_in.address,
            token_out = %token_out.address,
            trade_type = %trade_type,
            "Routing {}/{}",
            token_in,
            token_out
        );

        let mut config = RoutingConfig::for_chain(chain).merge(overrides);
        config.validate()?;
        let block_number = match config.block_number {
            Some(block) => block,
            None => self.get_block_number().await?,
        };
        config.block_number = Some(block_number);
        info!(
            "Finalized routing config is {}",
            serde_json::to_string(&config).unwrap_or_else(|_| format!("{:?}", config))
        );

        let gas_price_wei = self.params.gas_price_provider.get_gas_price().await?.gas_price_wei;
        let additional_gas_overhead = native_overhead(config.native_in, config.native_out);
        let protocols: BTreeSet<Protocol> = config.protocols.iter().copied().collect();
        let plan = ProtocolPlan::new(chain, &protocols, trade_type);
        debug!(?plan, "Protocol plan");

        let (percents, amounts) = get_amount_distribution(amount, config.distribution_percent);
        let ctx = QuoteContext {
            token_in,
            token_out,
            quote_token: quote_currency,
            trade_type,
            percents: &percents,
            amounts: &amounts,
            config: &config,
            block_number,
            additional_gas_overhead,
            gas_price_wei: &gas_price_wei,
        };

        let v3_gas_model = if plan.quote_v3 || plan.quote_mixed || chain.has_l1_fee() {
            Some(self.v3_gas_model(&ctx, &amount.currency).await?)
        } else {
            None
        };
        let mixed_gas_model = v3_gas_model
            .as_ref()
            .map(|m| MixedRouteHeuristicGasModel::new(chain, m.pricing().clone(), additional_gas_overhead));

        let Some(best) = self
            .get_swap_route_from_chain(amount, &ctx, plan, v3_gas_model.as_ref(), mixed_gas_model.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let method_parameters = match &swap_options {
            Some(options) => Some(build_swap_method_parameters(&best.routes, chain, options, config.native_in)?),
            None => None,
        };

        let mut swap_route = SwapRoute {
            trade_type,
            amount: amount.clone(),
            quote: best.quote,
            quote_gas_adjusted: best.quote_gas_adjusted,
            estimated_gas_used: best.estimated_gas_used,
            estimated_gas_used_quote_token: best.estimated_gas_used_quote_token,
            estimated_gas_used_usd: best.estimated_gas_used_usd,
            gas_price_wei,
            route: best.routes,
            block_number,
            method_parameters,
            simulation_status: None,
        };

        if let Some(simulate) = swap_options.as_ref().and_then(|o| o.simulate.as_ref()) {
            let simulator = self
                .params
                .simulator
                .as_ref()
                .ok_or(RoutingError::SimulatorNotInitialized)?;
            info!(from = %simulate.from_address, "Starting simulation");
            let status = simulator.simulate(&simulate.from_address, &swap_route).await?;
            info!(?status, "Simulation finished");
            swap_route.simulation_status = Some(status);
        }

        Ok(Some(swap_route))
    }

    /// Whether `from` holds what the trade spends: the amount for exact
    /// input, the quote for exact output. Lookup failures count as no.
    pub async fn user_has_sufficient_balance(
        &self,
        from: &Address,
        trade_type: TradeType,
        amount: &CurrencyAmount,
        quote: &CurrencyAmount,
    ) -> bool {
        let needed = match trade_type {
            TradeType::ExactInput => amount,
            TradeType::ExactOutput => quote,
        };
        let Some(provider) = &self.params.balance_provider else {
            warn!("No balance provider configured");
            return false;
        };
        match provider.get_balance(from, &needed.currency).await {
            Ok(balance) => balance >= needed.raw,
            Err(e) => {
                warn!(error = %e, "Error while checking user balance");
                false
            }
        }
    }

    async fn get_block_number(&self) -> Result<BlockNumber> {
        let provider = self.params.block_number_provider.as_ref();
        let policy = ExponentialBackoff {
            initial_interval: BLOCK_NUMBER_MIN_BACKOFF,
            max_interval: BLOCK_NUMBER_MAX_BACKOFF,
            max_elapsed_time: None,
            ..Default::default()
        };
        let mut attempt = 0u32;
        retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                if current > 1 {
                    info!("Get block number attempt {}", current);
                }
                match provider.get_block_number().await {
                    Ok(block) => Ok(block),
                    Err(e) if current > BLOCK_NUMBER_RETRIES => Err(backoff::Error::permanent(e)),
                    Err(e) => Err(backoff::Error::transient(e)),
                }
            }
        })
        .await
    }

    async fn v3_gas_model(&self, ctx: &QuoteContext<'_>, amount_token: &Token) -> Result<V3HeuristicGasModel> {
        let chain = self.params.chain;
        let pools = V3GasModelPools::fetch(
            chain,
            amount_token,
            ctx.quote_token,
            self.params.v3_pool_provider.as_ref(),
            Some(ctx.block_number),
        )
        .await?;
        let pricing = pools.pricing(chain, ctx.gas_price_wei.clone(), ctx.quote_token.clone())?;
        let l2_gas_data = match (&self.params.l2_gas_data_provider, chain.has_l1_fee()) {
            (Some(provider), true) => Some(provider.get_gas_data().await?),
            _ => None,
        };
        Ok(V3HeuristicGasModel::new(chain, pricing, l2_gas_data, ctx.additional_gas_overhead))
    }

    fn candidate_params<'a>(&'a self, ctx: &'a QuoteContext<'a>) -> CandidatePoolsParams<'a> {
        CandidatePoolsParams {
            token_in: ctx.token_in,
            token_out: ctx.token_out,
            trade_type: ctx.trade_type,
            chain: self.params.chain,
            config: ctx.config,
            block_number: Some(ctx.block_number),
            token_provider: self.params.token_provider.as_ref(),
            blocked_token_list_provider: self.params.blocked_token_list_provider.as_deref(),
        }
    }

    async fn get_swap_route_from_chain(
        &self,
        amount: &CurrencyAmount,
        ctx: &QuoteContext<'_>,
        plan: ProtocolPlan,
        v3_gas_model: Option<&V3HeuristicGasModel>,
        mixed_gas_model: Option<&MixedRouteHeuristicGasModel>,
    ) -> Result<Option<BestSwapRoute>> {
        let params = self.candidate_params(ctx);
        let (v3_tx, v3_rx) = oneshot::channel();
        let (v2_tx, v2_rx) = oneshot::channel();

        let (v3_quotes, v2_quotes, mixed_quotes) = futures::try_join!(
            self.v3_pipeline(ctx, &params, plan, v3_gas_model, v3_tx),
            self.v2_pipeline(ctx, &params, plan, v2_tx),
            self.mixed_pipeline(ctx, &params, plan, mixed_gas_model, v3_rx, v2_rx),
        )?;

        let mut all_routes = Vec::new();
        let mut all_candidate_pools = Vec::new();
        for quotes in [v3_quotes, v2_quotes, mixed_quotes].into_iter().flatten() {
            all_routes.extend(quotes.routes_with_valid_quotes);
            all_candidate_pools.extend(quotes.candidate_pools);
        }
        if all_routes.is_empty() {
            info!("Received no valid quotes");
            return Ok(None);
        }

        let best = get_best_swap_route(
            amount,
            ctx.percents,
            &all_routes,
            ctx.trade_type,
            self.params.chain,
            ctx.config,
            v3_gas_model.map(|m| m as &dyn GasModel),
        )?;
        if let Some(best) = &best {
            log_pool_selection_usage(self.params.chain, best, &all_candidate_pools);
        }
        Ok(best)
    }

    /// V3 candidates, then V3 quotes. The candidates are handed to the mixed
    /// pipeline as soon as they are known.
    async fn v3_pipeline(
        &self,
        ctx: &QuoteContext<'_>,
        params: &CandidatePoolsParams<'_>,
        plan: ProtocolPlan,
        gas_model: Option<&V3HeuristicGasModel>,
        mixed_tx: oneshot::Sender<Arc<V3CandidatePools>>,
    ) -> Result<Option<ProtocolQuotes>> {
        if !plan.v3_candidates {
            return Ok(None);
        }
        let candidates = Arc::new(
            get_v3_candidate_pools(
                params,
                self.params.v3_subgraph_provider.as_ref(),
                self.params.v3_pool_provider.as_ref(),
            )
            .await?,
        );
        if plan.quote_mixed && mixed_tx.send(candidates.clone()).is_err() {
            debug!("Mixed pipeline no longer waiting for V3 candidates");
        }
        match gas_model {
            Some(gas_model) if plan.quote_v3 => self.quote_v3(ctx, &candidates, gas_model).await.map(Some),
            _ => Ok(None),
        }
    }

    async fn v2_pipeline(
        &self,
        ctx: &QuoteContext<'_>,
        params: &CandidatePoolsParams<'_>,
        plan: ProtocolPlan,
        mixed_tx: oneshot::Sender<Arc<V2CandidatePools>>,
    ) -> Result<Option<ProtocolQuotes>> {
        if !plan.v2_candidates {
            return Ok(None);
        }
        let candidates = Arc::new(
            get_v2_candidate_pools(
                params,
                self.params.v2_subgraph_provider.as_ref(),
                self.params.v2_pool_provider.as_ref(),
            )
            .await?,
        );
        if plan.quote_mixed && mixed_tx.send(candidates.clone()).is_err() {
            debug!("Mixed pipeline no longer waiting for V2 candidates");
        }
        if !plan.quote_v2 {
            return Ok(None);
        }
        self.quote_v2(ctx, &candidates).await.map(Some)
    }

    /// Mixed quotes once both single-protocol candidate sets are in. A
    /// closed channel means the other pipeline failed and reports its own error.
    async fn mixed_pipeline(
        &self,
        ctx: &QuoteContext<'_>,
        params: &CandidatePoolsParams<'_>,
        plan: ProtocolPlan,
        gas_model: Option<&MixedRouteHeuristicGasModel>,
        v3_rx: oneshot::Receiver<Arc<V3CandidatePools>>,
        v2_rx: oneshot::Receiver<Arc<V2CandidatePools>>,
    ) -> Result<Option<ProtocolQuotes>> {
        let Some(gas_model) = gas_model.filter(|_| plan.quote_mixed) else {
            return Ok(None);
        };
        let (Ok(v3), Ok(v2)) = futures::join!(v3_rx, v2_rx) else {
            return Ok(None);
        };
        self.quote_mixed(ctx, params, &v3, &v2, gas_model).await.map(Some)
    }

    async fn quote_routes(
        &self,
        protocol: Protocol,
        ctx: &QuoteContext<'_>,
        routes: Vec<Route>,
        quote_provider: &dyn QuoteProvider,
        gas_model: &dyn GasModel,
    ) -> Result<Vec<RouteWithValidQuote>> {
        if routes.is_empty() {
            info!(protocol = %protocol, "No routes to quote");
            return Ok(Vec::new());
        }
        info!(
            protocol = %protocol,
            routes = routes.len(),
            amounts = ctx.amounts.len(),
            "Routing across {}",
            protocol
        );
        debug!(protocol = %protocol, "Routes: {}", routes_to_string(&routes));
        let batch = quote_provider
            .get_quotes_many(ctx.amounts, &routes, ctx.trade_type, Some(ctx.block_number))
            .await?;
        let valid = to_routes_with_valid_quotes(batch, ctx.percents, ctx.trade_type, ctx.quote_token, gas_model);
        info!(protocol = %protocol, valid = valid.len(), "Got valid quotes");
        Ok(valid)
    }

    async fn quote_v3(
        &self,
        ctx: &QuoteContext<'_>,
        candidates: &V3CandidatePools,
        gas_model: &V3HeuristicGasModel,
    ) -> Result<ProtocolQuotes> {
        let pools = apply_token_validator(
            candidates.pool_accessor.get_all_pools(),
            v3_pool_tokens,
            ctx.token_in,
            ctx.token_out,
            self.params.token_validator_provider.as_deref(),
        )
        .await?;
        let routes = compute_all_v3_routes(ctx.token_in, ctx.token_out, &pools, ctx.config.max_swaps_per_path);
        let valid = self
            .quote_routes(Protocol::V3, ctx, routes, self.params.v3_quote_provider.as_ref(), gas_model)
            .await?;
        Ok(ProtocolQuotes {
            routes_with_valid_quotes: valid,
            candidate_pools: Some(candidates.candidate_pools.clone()),
        })
    }

    async fn quote_v2(&self, ctx: &QuoteContext<'_>, candidates: &V2CandidatePools) -> Result<ProtocolQuotes> {
        let pairs = apply_token_validator(
            candidates.pool_accessor.get_all_pools(),
            v2_pair_tokens,
            ctx.token_in,
            ctx.token_out,
            self.params.token_validator_provider.as_deref(),
        )
        .await?;
        let routes = compute_all_v2_routes(ctx.token_in, ctx.token_out, &pairs, ctx.config.max_swaps_per_path);
        if routes.is_empty() {
            return Ok(ProtocolQuotes::empty(Some(candidates.candidate_pools.clone())));
        }

        // pairs price gas, so the model is only needed once there is something to quote
        let chain = self.params.chain;
        let gas_pools = V2GasModelPools::fetch(
            chain,
            ctx.quote_token,
            self.params.v2_pool_provider.as_ref(),
            Some(ctx.block_number),
        )
        .await?;
        let gas_model = V2HeuristicGasModel::new(
            gas_pools.pricing(chain, ctx.gas_price_wei.clone(), ctx.quote_token.clone())?,
            ctx.additional_gas_overhead,
        );
        let valid = self
            .quote_routes(Protocol::V2, ctx, routes, self.params.v2_quote_provider.as_ref(), &gas_model)
            .await?;
        Ok(ProtocolQuotes {
            routes_with_valid_quotes: valid,
            candidate_pools: Some(candidates.candidate_pools.clone()),
        })
    }

    async fn quote_mixed(
        &self,
        ctx: &QuoteContext<'_>,
        params: &CandidatePoolsParams<'_>,
        v3: &V3CandidatePools,
        v2: &V2CandidatePools,
        gas_model: &MixedRouteHeuristicGasModel,
    ) -> Result<ProtocolQuotes> {
        let candidates = get_mixed_route_candidate_pools(
            params,
            v3,
            v2,
            self.params.v3_pool_provider.as_ref(),
            self.params.v2_pool_provider.as_ref(),
        )
        .await?;
        let all: Vec<Pool> = candidates
            .v3_pool_accessor
            .get_all_pools()
            .into_iter()
            .map(Pool::V3)
            .chain(candidates.v2_pool_accessor.get_all_pools().into_iter().map(Pool::V2))
            .collect();
        let pools = apply_token_validator(
            all,
            pool_tokens,
            ctx.token_in,
            ctx.token_out,
            self.params.token_validator_provider.as_deref(),
        )
        .await?;
        let routes = compute_all_mixed_routes(ctx.token_in, ctx.token_out, &pools, ctx.config.max_swaps_per_path);
        let valid = self
            .quote_routes(Protocol::Mixed, ctx, routes, self.params.mixed_quote_provider.as_ref(), gas_model)
            .await?;
        Ok(ProtocolQuotes {
            routes_with_valid_quotes: valid,
            candidate_pools: Some(candidates.candidate_pools),
        })
    }
}

/// Percent slices `dp, 2dp, ..., 100` and the matching truncated amounts.
pub fn get_amount_distribution(amount: &CurrencyAmount, distribution_percent: u32) -> (Vec<u32>, Vec<CurrencyAmount>) {
    let steps = if distribution_percent == 0 { 0 } else { 100 / distribution_percent };
    (1..=steps)
        .map(|i| {
            let percent = i * distribution_percent;
            (percent, amount.multiply(&Fraction::new(percent, 100)))
        })
        .unzip()
}

fn route_shape(routes: &[RouteWithValidQuote]) -> &'static str {
    let has = |p: Protocol| routes.iter().any(|r| r.protocol() == p);
    let split = routes.len() > 1;
    match (has(Protocol::Mixed), has(Protocol::V3), has(Protocol::V2)) {
        (true, true, true) => "MixedAndV3AndV2SplitRoute",
        (true, true, false) => "MixedAndV3SplitRoute",
        (true, false, true) => "MixedAndV2SplitRoute",
        (false, true, true) => "V3AndV2SplitRoute",
        (true, false, false) if split => "MixedSplitRoute",
        (true, false, false) => "MixedRoute",
        (false, true, false) if split => "V3SplitRoute",
        (false, true, false) => "V3Route",
        (false, false, true) if split => "V2SplitRoute",
        _ => "V2Route",
    }
}

/// Log how deep into each selection category the chosen routes reached.
fn log_pool_selection_usage(chain: ChainId, best: &BestSwapRoute, candidates: &[CandidatePoolsBySelectionCriteria]) {
    let used: HashSet<&Address> = best.routes.iter().flat_map(|r| r.pool_addresses.iter()).collect();
    for criteria in candidates {
        for (category, pools) in criteria.selections.categories() {
            let top_n_used = pools.iter().rposition(|p| used.contains(&p.id)).map_or(0, |i| i + 1);
            debug!(protocol = %criteria.protocol, category, top_n_used, "Pool selection usage");
        }
    }
    info!(chain = %chain, shape = route_shape(&best.routes), splits = best.routes.len(), "Route shape");
}
