//! Swap router calldata for a chosen route set

use amm::Pool;
use num_bigint::BigInt;
use num_traits::Zero;
use router_core::{Address, ChainId, Fraction, Percent, RoutingError, Token, TradeType};
use serde::{Deserialize, Serialize};

use crate::encoding::{
    address_word, encode_bytes, encode_bytes_array, encode_pool_path, u64_word, uint_word, with_selector,
};
use crate::entities::{Route, RouteWithValidQuote};

const MULTICALL: [u8; 4] = [0x5a, 0xe4, 0x01, 0xdc];
const EXACT_INPUT: [u8; 4] = [0xb8, 0x58, 0x18, 0x3f];
const EXACT_OUTPUT: [u8; 4] = [0x09, 0xb8, 0x13, 0x46];
const SWAP_EXACT_TOKENS_FOR_TOKENS: [u8; 4] = [0x47, 0x2b, 0x43, 0xf3];
const SWAP_TOKENS_FOR_EXACT_TOKENS: [u8; 4] = [0x42, 0x71, 0x2a, 0x67];

/// Recipient placeholder meaning "the router itself" for chained sections
const ADDRESS_THIS: &str = "0x0000000000000000000000000000000000000002";

/// Swap router contract per chain
pub fn swap_router_address(chain: ChainId) -> Address {
    match chain {
        ChainId::Celo => Address::from("0x5615CDAb10dc425a742d643d949a7F474C01abc4"),
        ChainId::Base => Address::from("0x2626664c2603336E57B271c5C0b26F421741e481"),
        _ => Address::from("0x68b3465833fb72A70ecDF485E0e4C7bD8665Fc45"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOptions {
    pub from_address: Address,
}

/// Execution parameters supplied by the caller of `route`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOptions {
    pub recipient: Address,
    pub slippage_tolerance: Percent,
    /// Unix timestamp after which the swap reverts
    pub deadline: u64,
    #[serde(default)]
    pub simulate: Option<SimulationOptions>,
}

/// Transaction fields for executing a swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameters {
    /// `0x`-prefixed hex calldata
    pub calldata: String,
    /// `0x`-prefixed hex native value to attach
    pub value: String,
    pub to: Address,
}

fn with_slippage(amount: &BigInt, slippage: &Percent, trade_type: TradeType) -> BigInt {
    let factor = match trade_type {
        TradeType::ExactInput => Fraction::one().sub(slippage.as_fraction()),
        TradeType::ExactOutput => Fraction::one().add(slippage.as_fraction()),
    };
    Fraction::from_integer(amount.clone()).mul(&factor).quotient()
}

fn v3_call(
    pools: &[Pool],
    tokens: &[Token],
    exact_output: bool,
    recipient: &Address,
    amount: &BigInt,
    limit: &BigInt,
) -> Result<Vec<u8>, RoutingError> {
    let path = encode_pool_path(pools, tokens, exact_output)?;
    let mut body = u64_word(0x20).to_vec();
    body.extend_from_slice(&u64_word(0x80));
    body.extend_from_slice(&address_word(recipient)?);
    body.extend_from_slice(&uint_word(amount)?);
    body.extend_from_slice(&uint_word(limit)?);
    body.extend(encode_bytes(&path));
    let selector = if exact_output { EXACT_OUTPUT } else { EXACT_INPUT };
    Ok(with_selector(selector, body))
}

fn v2_call(
    tokens: &[Token],
    exact_output: bool,
    recipient: &Address,
    amount: &BigInt,
    limit: &BigInt,
) -> Result<Vec<u8>, RoutingError> {
    let mut body = uint_word(amount)?.to_vec();
    body.extend_from_slice(&uint_word(limit)?);
    body.extend_from_slice(&u64_word(0x80));
    body.extend_from_slice(&address_word(recipient)?);
    body.extend_from_slice(&u64_word(tokens.len() as u64));
    for token in tokens {
        body.extend_from_slice(&address_word(&token.address)?);
    }
    let selector = if exact_output {
        SWAP_TOKENS_FOR_EXACT_TOKENS
    } else {
        SWAP_EXACT_TOKENS_FOR_TOKENS
    };
    Ok(with_selector(selector, body))
}

/// Inner router calls for one route of the split.
fn route_calls(rwq: &RouteWithValidQuote, options: &SwapOptions) -> Result<Vec<Vec<u8>>, RoutingError> {
    let exact_output = rwq.trade_type == TradeType::ExactOutput;
    let amount = &rwq.amount.raw;
    let limit = with_slippage(&rwq.quote.raw, &options.slippage_tolerance, rwq.trade_type);

    match &rwq.route {
        Route::V3(route) => {
            let pools: Vec<Pool> = route.pools.iter().cloned().map(Pool::V3).collect();
            Ok(vec![v3_call(&pools, &route.path, exact_output, &options.recipient, amount, &limit)?])
        }
        Route::V2(route) => Ok(vec![v2_call(&route.path, exact_output, &options.recipient, amount, &limit)?]),
        Route::Mixed(route) => {
            if exact_output {
                return Err(RoutingError::InvalidRoute {
                    message: "mixed routes only support exact input".into(),
                });
            }
            let sections = route.sections();
            let last = sections.len().saturating_sub(1);
            let router = Address::from(ADDRESS_THIS);
            let zero = BigInt::zero();
            let mut start = 0;
            let mut calls = Vec::with_capacity(sections.len());
            for (i, section) in sections.into_iter().enumerate() {
                let tokens = &route.path[start..=start + section.len()];
                // later sections spend whatever the router holds
                let amount_in = if i == 0 { amount } else { &zero };
                let (recipient, min_out) = if i == last {
                    (&options.recipient, &limit)
                } else {
                    (&router, &zero)
                };
                let call = match section.first() {
                    Some(Pool::V3(_)) => v3_call(section, tokens, false, recipient, amount_in, min_out)?,
                    _ => v2_call(tokens, false, recipient, amount_in, min_out)?,
                };
                calls.push(call);
                start += section.len();
            }
            Ok(calls)
        }
    }
}

/// Raw multicall calldata executing every route of the split.
pub fn encode_swap_calldata(routes: &[RouteWithValidQuote], options: &SwapOptions) -> Result<Vec<u8>, RoutingError> {
    let mut calls = Vec::new();
    for rwq in routes {
        calls.extend(route_calls(rwq, options)?);
    }
    let mut body = u64_word(options.deadline).to_vec();
    body.extend_from_slice(&u64_word(0x40));
    body.extend(encode_bytes_array(&calls));
    Ok(with_selector(MULTICALL, body))
}

/// Calldata, value and target for a swap. `native_in` attaches the input
/// amount (or maximum input) as native value.
pub fn build_swap_method_parameters(
    routes: &[RouteWithValidQuote],
    chain: ChainId,
    options: &SwapOptions,
    native_in: bool,
) -> Result<MethodParameters, RoutingError> {
    let calldata = encode_swap_calldata(routes, options)?;
    let value = if native_in {
        routes
            .iter()
            .map(|r| match r.trade_type {
                TradeType::ExactInput => r.amount.raw.clone(),
                TradeType::ExactOutput => with_slippage(&r.quote.raw, &options.slippage_tolerance, r.trade_type),
            })
            .fold(BigInt::zero(), |acc, v| acc + v)
    } else {
        BigInt::zero()
    };
    Ok(MethodParameters {
        calldata: format!("0x{}", hex::encode(calldata)),
        value: format!("0x{:x}", value),
        to: swap_router_address(chain),
    })
}
