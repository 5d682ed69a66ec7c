//! Data Transfer Objects for API requests and responses

use axum::http::StatusCode;
use axum::Json;
use router_core::{Address, CurrencyAmount, Protocol, RoutingConfigOverrides, TradeType};
use serde::{Deserialize, Serialize};
use smart_order_router::{MethodParameters, RouteWithValidQuote, SwapOptions, SwapRoute, SwapToRatioStatus};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Loaded snapshot summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsResponse {
    pub chain_id: u64,
    pub block_number: u64,
    pub v3_pools: usize,
    pub v2_pairs: usize,
}

/// Quote request. `amount` is a raw integer string in the smallest unit of
/// `token_in` (exact input) or `token_out` (exact output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub amount: String,
    pub token_in: Address,
    pub token_out: Address,
    pub trade_type: TradeType,
    #[serde(default)]
    pub protocols: Option<Vec<Protocol>>,
    #[serde(default)]
    pub overrides: Option<RoutingConfigOverrides>,
    #[serde(default)]
    pub swap_options: Option<SwapOptions>,
}

/// One leg of a split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDto {
    pub protocol: Protocol,
    pub percent: u32,
    pub amount: String,
    pub quote: String,
    pub quote_gas_adjusted: String,
    pub gas_estimate: u64,
    pub path: Vec<String>,
    pub pools: Vec<Address>,
}

impl From<&RouteWithValidQuote> for RouteDto {
    fn from(route: &RouteWithValidQuote) -> Self {
        Self {
            protocol: route.protocol(),
            percent: route.percent,
            amount: route.amount.raw.to_string(),
            quote: route.quote.raw.to_string(),
            quote_gas_adjusted: route.quote_adjusted_for_gas.raw.to_string(),
            gas_estimate: route.gas_estimate,
            path: route.token_path.iter().map(|t| t.display_symbol().to_string()).collect(),
            pools: route.pool_addresses.clone(),
        }
    }
}

fn raw(amount: &CurrencyAmount) -> String {
    amount.raw.to_string()
}

/// Routed swap summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub request_id: String,
    pub block_number: u64,
    pub trade_type: TradeType,
    pub amount: String,
    pub quote: String,
    pub quote_gas_adjusted: String,
    pub estimated_gas_used: u64,
    pub estimated_gas_used_quote_token: String,
    pub estimated_gas_used_usd: String,
    pub gas_price_wei: String,
    pub routes: Vec<RouteDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_parameters: Option<MethodParameters>,
}

impl QuoteResponse {
    pub fn from_swap(request_id: &str, swap: &SwapRoute) -> Self {
        Self {
            request_id: request_id.to_string(),
            block_number: swap.block_number,
            trade_type: swap.trade_type,
            amount: raw(&swap.amount),
            quote: raw(&swap.quote),
            quote_gas_adjusted: raw(&swap.quote_gas_adjusted),
            estimated_gas_used: swap.estimated_gas_used,
            estimated_gas_used_quote_token: raw(&swap.estimated_gas_used_quote_token),
            estimated_gas_used_usd: raw(&swap.estimated_gas_used_usd),
            gas_price_wei: swap.gas_price_wei.to_string(),
            routes: swap.route.iter().map(RouteDto::from).collect(),
            method_parameters: swap.method_parameters.clone(),
        }
    }
}

/// Rebalance `token0_balance`/`token1_balance` for a deposit into `pool`
/// between `tick_lower` and `tick_upper`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteToRatioRequest {
    pub pool: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub token0_balance: String,
    pub token1_balance: String,
    #[serde(default)]
    pub ratio_error_tolerance_bips: Option<u64>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub overrides: Option<RoutingConfigOverrides>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteToRatioResponse {
    pub request_id: String,
    pub status: SwapToRatioStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Decimal rendering of the target output-per-input ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_swap_sqrt_price_x96: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_swap_tick: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<QuoteResponse>,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

/// Handler error: status plus JSON body
pub type ApiFailure = (StatusCode, Json<ApiError>);

pub fn bad_request(message: impl Into<String>) -> ApiFailure {
    (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message)))
}

/// Map a router error onto its HTTP status and stable code
pub fn router_failure(err: &router_core::Error) -> ApiFailure {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::new(err.error_code(), err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_core::RoutingError;

    #[test]
    fn test_router_failure_status() {
        let err: router_core::Error = RoutingError::InvalidAmount {
            message: "zero".to_string(),
        }
        .into();
        let (status, Json(body)) = router_failure(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid_amount");
    }

    #[test]
    fn test_quote_request_defaults() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{"amount":"1000","token_in":"0x01","token_out":"0x02","trade_type":"exact_input"}"#,
        )
        .unwrap();
        assert_eq!(request.trade_type, TradeType::ExactInput);
        assert!(request.protocols.is_none() && request.overrides.is_none());
    }
}
