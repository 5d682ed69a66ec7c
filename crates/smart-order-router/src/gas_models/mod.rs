//! Gas models
//!
//! A gas model turns a quoted route into a gas estimate and prices it in
//! the quote token and in a USD-pegged token. Models for chains that pay an
//! L1 data fee can also price that fee for a chosen route set.

pub mod gas_costs;
pub mod l1;
pub mod mixed;
pub mod v2;
pub mod v3;

use num_bigint::BigInt;
use router_core::{wrapped_native, ChainId, CurrencyAmount, Price, Result, Token};
use tracing::debug;

use crate::entities::RouteWithValidQuote;

pub use l1::{calculate_l1_security_fee, l2_to_l1_gas_used};
pub use mixed::MixedRouteHeuristicGasModel;
pub use v2::{V2GasModelPools, V2HeuristicGasModel};
pub use v3::{V3GasModelPools, V3HeuristicGasModel};

/// Gas estimate for one route-quote
#[derive(Debug, Clone, PartialEq)]
pub struct GasCost {
    pub gas_estimate: u64,
    pub gas_cost_in_token: CurrencyAmount,
    pub gas_cost_in_usd: CurrencyAmount,
}

/// L1 data-fee cost of posting the calldata for a route set
#[derive(Debug, Clone, PartialEq)]
pub struct L1GasCost {
    pub gas_used_l1: BigInt,
    pub gas_cost_l1_usd: CurrencyAmount,
    pub gas_cost_l1_quote_token: CurrencyAmount,
}

pub trait GasModel: Send + Sync {
    fn estimate_gas_cost(&self, route: &RouteWithValidQuote) -> GasCost;

    /// `None` when this model cannot price L1 data fees.
    fn calculate_l1_gas_fees(&self, _routes: &[RouteWithValidQuote]) -> Option<Result<L1GasCost>> {
        None
    }
}

/// Converts gas units into the native, quote and USD tokens.
///
/// `native_quote` prices native in the quote token directly;
/// `native_amount` prices native in the amount token and is combined with a
/// route's execution price when that yields the smaller cost.
#[derive(Debug, Clone)]
pub struct GasPricing {
    pub chain: ChainId,
    pub gas_price_wei: BigInt,
    pub native: Token,
    pub quote_token: Token,
    pub native_usd: Price,
    pub native_quote: Option<Price>,
    pub native_amount: Option<Price>,
}

impl GasPricing {
    pub fn new(
        chain: ChainId,
        gas_price_wei: BigInt,
        quote_token: Token,
        native_usd: Price,
        native_quote: Option<Price>,
        native_amount: Option<Price>,
    ) -> Self {
        Self {
            chain,
            gas_price_wei,
            native: wrapped_native(chain),
            quote_token,
            native_usd,
            native_quote,
            native_amount,
        }
    }

    pub fn usd_token(&self) -> &Token {
        &self.native_usd.quote
    }

    pub fn native_cost(&self, gas_units: &BigInt) -> CurrencyAmount {
        CurrencyAmount::from_raw(self.native.clone(), &self.gas_price_wei * gas_units)
    }

    /// Native-denominated cost expressed in the quote token, if a price exists.
    pub fn native_to_quote(&self, cost: &CurrencyAmount, route: Option<&RouteWithValidQuote>) -> Option<CurrencyAmount> {
        if self.quote_token == self.native {
            return Some(cost.clone());
        }
        let direct = self.native_quote.as_ref().map(|p| p.quote(cost));

        let synthetic = match (route, &self.native_amount) {
            (Some(route), Some(native_amount)) if !route.amount.is_zero() => {
                let execution = Price::new(
                    route.amount.currency.clone(),
                    route.quote.currency.clone(),
                    route.amount.raw.clone(),
                    route.quote.raw.clone(),
                );
                Some(execution.quote(&native_amount.quote(cost)))
            }
            _ => None,
        };

        match (direct, synthetic) {
            (Some(direct), Some(synthetic)) if synthetic.raw < direct.raw => {
                debug!(
                    direct = %direct.to_exact(),
                    synthetic = %synthetic.to_exact(),
                    "Synthetic gas cost through the amount token is cheaper"
                );
                Some(synthetic)
            }
            (Some(direct), _) => Some(direct),
            (None, synthetic) => synthetic,
        }
    }

    /// Price `gas_units` for `route`; zero costs when no conversion exists.
    pub fn cost(&self, gas_units: u64, route: &RouteWithValidQuote) -> GasCost {
        let native_cost = self.native_cost(&BigInt::from(gas_units));
        match self.native_to_quote(&native_cost, Some(route)) {
            Some(in_token) => GasCost {
                gas_estimate: gas_units,
                gas_cost_in_token: in_token,
                gas_cost_in_usd: self.native_usd.quote(&native_cost),
            },
            None => {
                debug!(
                    quote_token = %self.quote_token,
                    "No {} pool with the quote or amount token, route will not account for gas",
                    self.native
                );
                GasCost {
                    gas_estimate: gas_units,
                    gas_cost_in_token: CurrencyAmount::zero(self.quote_token.clone()),
                    gas_cost_in_usd: CurrencyAmount::zero(self.usd_token().clone()),
                }
            }
        }
    }
}
