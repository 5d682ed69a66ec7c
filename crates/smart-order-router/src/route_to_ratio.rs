//! Rebalancing two balances toward a position's deposit ratio
//!
//! Each iteration sizes a swap from the current exchange rate, routes it, and
//! checks the post-swap balances against the position's optimal ratio at the
//! pool price the swap leaves behind. The realised rate feeds the next guess.

use amm::{calculate_ratio_amount_in, AmmError, Position, V3Pool};
use num_bigint::BigInt;
use router_core::{CurrencyAmount, Fraction, Protocol, Result, RouteToRatioConfig, RoutingConfigOverrides, TradeType};
use serde::Serialize;
use tracing::{debug, info};

use crate::alpha_router::{AlphaRouter, SwapRoute};
use crate::entities::Route;

/// Outcome of a route-to-ratio request
#[derive(Debug, Clone)]
pub enum SwapToRatioResponse {
    Success {
        swap: SwapRoute,
        /// Output-per-input ratio the balances were steered toward
        optimal_ratio: Fraction,
        /// The position's pool as the swap leaves it
        post_swap_target_pool: V3Pool,
    },
    NoRouteFound {
        error: String,
    },
    NoSwapNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapToRatioStatus {
    Success,
    NoRouteFound,
    NoSwapNeeded,
}

impl SwapToRatioResponse {
    pub fn status(&self) -> SwapToRatioStatus {
        match self {
            Self::Success { .. } => SwapToRatioStatus::Success,
            Self::NoRouteFound { .. } => SwapToRatioStatus::NoRouteFound,
            Self::NoSwapNeeded => SwapToRatioStatus::NoSwapNeeded,
        }
    }

    fn not_found(error: &str) -> Self {
        info!(error, "Route to ratio found no route");
        Self::NoRouteFound {
            error: error.to_string(),
        }
    }
}

/// Whether `achieved` is within `tolerance` of `optimal`, relatively.
fn ratio_within_tolerance(achieved: &Fraction, optimal: &Fraction, tolerance: &Fraction) -> bool {
    if achieved == optimal {
        return true;
    }
    match achieved.checked_div(optimal) {
        Some(relative) => relative.sub(&Fraction::one()).abs() < *tolerance,
        None => false,
    }
}

/// Post-swap sqrt price of the position's pool, if the swap went through it.
fn target_pool_price_update(swap: &SwapRoute, pool: &V3Pool) -> Option<BigInt> {
    let mut update = None;
    for rwq in &swap.route {
        let Route::V3(route) = &rwq.route else {
            continue;
        };
        for (i, hop) in route.pools.iter().enumerate() {
            if hop.token0 == pool.token0 && hop.token1 == pool.token1 && hop.fee == pool.fee {
                if let Some(after) = rwq.sqrt_price_x96_after_list.get(i) {
                    update = Some(after.clone());
                }
            }
        }
    }
    update
}

impl AlphaRouter {
    /// Find the swap that leaves `token0_balance` and `token1_balance` in the
    /// proportion `position` needs for a deposit.
    pub async fn route_to_ratio(
        &self,
        token0_balance: CurrencyAmount,
        token1_balance: CurrencyAmount,
        position: &Position,
        ratio_config: &RouteToRatioConfig,
        overrides: RoutingConfigOverrides,
    ) -> Result<SwapToRatioResponse> {
        let (token0_balance, token1_balance) = if token1_balance.currency.sorts_before(&token0_balance.currency) {
            (token1_balance, token0_balance)
        } else {
            (token0_balance, token1_balance)
        };
        let pool = &position.pool;

        let mut pre_swap_optimal_ratio = position.optimal_ratio(&pool.sqrt_price_x96, true)?;
        let zero_for_one = if pool.tick_current > position.tick_upper {
            true
        } else if pool.tick_current < position.tick_lower {
            false
        } else {
            let zero_for_one = &token0_balance.raw * pre_swap_optimal_ratio.denominator()
                > pre_swap_optimal_ratio.numerator() * &token1_balance.raw;
            if !zero_for_one {
                pre_swap_optimal_ratio = pre_swap_optimal_ratio.invert().unwrap_or_else(Fraction::zero);
            }
            zero_for_one
        };

        let (input_balance, output_balance) = if zero_for_one {
            (token0_balance, token1_balance)
        } else {
            (token1_balance, token0_balance)
        };
        let mut exchange_rate = if zero_for_one {
            pool.token0_price().rate
        } else {
            pool.price_of(&pool.token1)?.rate
        };
        let mut optimal_ratio = pre_swap_optimal_ratio.clone();
        let mut post_swap_target_pool = pool.clone();

        let overrides = RoutingConfigOverrides {
            protocols: Some(vec![Protocol::V3, Protocol::V2]),
            ..overrides
        };

        let mut iteration = 0;
        loop {
            iteration += 1;
            if iteration > ratio_config.max_iterations {
                return Ok(SwapToRatioResponse::not_found("max iterations exceeded"));
            }

            let amount_to_swap =
                match calculate_ratio_amount_in(&optimal_ratio, &exchange_rate, &input_balance, &output_balance) {
                    Ok(amount) => amount,
                    Err(AmmError::InsufficientInputAmount) => {
                        return Ok(SwapToRatioResponse::not_found("insufficient input balance to reach ratio"))
                    }
                    Err(e) => return Err(e.into()),
                };
            if amount_to_swap.is_zero() {
                info!("Balances already match the optimal ratio");
                return Ok(SwapToRatioResponse::NoSwapNeeded);
            }
            debug!(iteration, amount = %amount_to_swap, zero_for_one, "Routing rebalancing swap");

            let Some(swap) = self
                .route(
                    &amount_to_swap,
                    &output_balance.currency,
                    TradeType::ExactInput,
                    None,
                    overrides.clone(),
                )
                .await?
            else {
                return Ok(SwapToRatioResponse::not_found("no route found"));
            };

            let input_updated = input_balance.sub(swap.input_amount());
            let output_updated = output_balance.add(swap.output_amount());
            let new_ratio = input_updated.as_fraction().checked_div(&output_updated.as_fraction());

            let price_update = target_pool_price_update(&swap, pool);
            optimal_ratio = match &price_update {
                Some(sqrt_price) => position.optimal_ratio(sqrt_price, zero_for_one)?,
                None => pre_swap_optimal_ratio.clone(),
            };

            let achieved = new_ratio
                .as_ref()
                .is_some_and(|ratio| ratio_within_tolerance(ratio, &optimal_ratio, &ratio_config.ratio_error_tolerance));
            if achieved {
                if let Some(sqrt_price) = price_update {
                    post_swap_target_pool = V3Pool {
                        tick_current: amm::v3::get_tick_at_sqrt_ratio(&sqrt_price)?,
                        sqrt_price_x96: sqrt_price,
                        ..pool.clone()
                    };
                }
                info!(iteration, "Optimal ratio reached");
                return Ok(SwapToRatioResponse::Success {
                    swap,
                    optimal_ratio,
                    post_swap_target_pool,
                });
            }

            exchange_rate = Fraction::new(swap.output_amount().raw.clone(), swap.input_amount().raw.clone());
            if exchange_rate.is_zero() {
                return Ok(SwapToRatioResponse::not_found(
                    "insufficient liquidity to swap to optimal ratio",
                ));
            }
        }
    }
}
