//! Rollup L1 data fees
//!
//! The fee is derived from the calldata of the actual swap, so it can only
//! be computed for a complete route set, never per candidate.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use router_core::{pow10, Address, ChainId, CurrencyAmount, Percent, Result, RoutingError};

use crate::entities::RouteWithValidQuote;
use crate::gas_models::{GasPricing, L1GasCost};
use crate::method_parameters::{encode_swap_calldata, SwapOptions};
use crate::providers::L2GasData;

/// Gas charged per calldata byte, and the fixed signature allowance
const ZERO_BYTE_GAS: u64 = 4;
const NONZERO_BYTE_GAS: u64 = 16;
const SIGNATURE_BYTES: u64 = 68;

/// L1 gas units to post `calldata`, including the fixed `overhead`.
pub fn l2_to_l1_gas_used(calldata: &[u8], overhead: &BigInt) -> BigInt {
    let zeros = calldata.iter().filter(|b| **b == 0).count() as u64;
    let nonzeros = calldata.len() as u64 - zeros;
    let gas = zeros * ZERO_BYTE_GAS + nonzeros * NONZERO_BYTE_GAS + SIGNATURE_BYTES * NONZERO_BYTE_GAS;
    BigInt::from(gas) + overhead
}

fn fee_swap_options() -> SwapOptions {
    SwapOptions {
        recipient: Address::from("0x0000000000000000000000000000000000000001"),
        slippage_tolerance: Percent::from_bips(5),
        deadline: 100,
        simulate: None,
    }
}

/// `(l1 gas used, l1 fee in wei)` for executing `routes`.
pub fn calculate_l1_security_fee(routes: &[RouteWithValidQuote], gas_data: &L2GasData) -> Result<(BigInt, BigInt)> {
    let calldata = encode_swap_calldata(routes, &fee_swap_options())?;
    match gas_data {
        L2GasData::Optimism(data) => {
            let used = l2_to_l1_gas_used(&calldata, &data.overhead);
            let decimals = data.decimals.to_u32().ok_or_else(|| RoutingError::InvalidAmount {
                message: format!("L1 fee decimals {} out of range", data.decimals),
            })?;
            let fee = &used * &data.l1_base_fee * &data.scalar / pow10(decimals);
            Ok((used, fee))
        }
        L2GasData::Arbitrum(data) => {
            let used = l2_to_l1_gas_used(&calldata, &BigInt::from(0u8));
            let fee = &used * &data.per_l1_calldata_fee + &data.per_l2_tx_fee;
            Ok((used, fee))
        }
    }
}

/// Price the L1 fee of `routes` in USD and the quote token.
pub fn l1_gas_cost(
    chain: ChainId,
    pricing: &GasPricing,
    routes: &[RouteWithValidQuote],
    gas_data: Option<&L2GasData>,
) -> Result<L1GasCost> {
    let gas_data = gas_data.ok_or(RoutingError::L1GasModelMissing { chain_id: chain.id() })?;
    let (gas_used_l1, fee_wei) = calculate_l1_security_fee(routes, gas_data)?;
    let native_cost = CurrencyAmount::from_raw(pricing.native.clone(), fee_wei);
    let gas_cost_l1_quote_token = pricing
        .native_to_quote(&native_cost, None)
        .unwrap_or_else(|| CurrencyAmount::zero(pricing.quote_token.clone()));
    Ok(L1GasCost {
        gas_used_l1,
        gas_cost_l1_usd: pricing.native_usd.quote(&native_cost),
        gas_cost_l1_quote_token,
    })
}
