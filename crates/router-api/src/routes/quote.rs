//! Swap quoting

use axum::{extract::State, http::StatusCode, Json};
use num_bigint::BigInt;
use router_core::{Address, CurrencyAmount, Token, TradeType};

use crate::dto::{bad_request, router_failure, ApiError, ApiFailure, QuoteRequest, QuoteResponse};
use crate::AppState;

pub(crate) fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Look a token up in the snapshot; addresses are matched case-insensitively.
pub(crate) fn resolve_token(state: &AppState, address: &Address) -> Result<Token, ApiFailure> {
    state
        .snapshot()
        .token(&Address::new(address.as_str()))
        .cloned()
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new("unknown_token", format!("Unknown token: {}", address))),
            )
        })
}

pub(crate) fn parse_amount(token: &Token, raw: &str) -> Result<CurrencyAmount, ApiFailure> {
    let value: BigInt = raw
        .trim()
        .parse()
        .map_err(|_| bad_request(format!("Invalid amount: {}", raw)))?;
    Ok(CurrencyAmount::from_raw(token.clone(), value))
}

/// POST /quote - Route a swap across the snapshot's pools
pub async fn get_quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiFailure> {
    let request_id = new_request_id();
    let token_in = resolve_token(&state, &request.token_in)?;
    let token_out = resolve_token(&state, &request.token_out)?;
    let (amount_token, quote_token) = match request.trade_type {
        TradeType::ExactInput => (&token_in, token_out.clone()),
        TradeType::ExactOutput => (&token_out, token_in.clone()),
    };
    let amount = parse_amount(amount_token, &request.amount)?;

    let mut overrides = request.overrides.unwrap_or_default();
    if request.protocols.is_some() {
        overrides.protocols = request.protocols;
    }

    tracing::info!(
        request_id = %request_id,
        token_in = %token_in,
        token_out = %token_out,
        amount = %amount.raw,
        trade_type = %request.trade_type,
        "Quote requested"
    );

    let swap = state
        .router()
        .route(&amount, &quote_token, request.trade_type, request.swap_options, overrides)
        .await
        .map_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Routing failed");
            router_failure(&e)
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(
                    "no_route",
                    format!("No route found from {} to {}", token_in, token_out),
                )),
            )
        })?;

    tracing::info!(
        request_id = %request_id,
        quote = %swap.quote.raw,
        splits = swap.route.len(),
        "Quote served"
    );
    Ok(Json(QuoteResponse::from_swap(&request_id, &swap)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amm::{FeeAmount, V3Pool};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use router_core::{tokens, ChainId};
    use serde_json::{json, Value};
    use smart_order_router::providers::V3PoolRecord;
    use smart_order_router::{PoolSnapshot, SnapshotProvider};
    use tower::ServiceExt;

    use crate::{create_app, AppState};

    fn make_pool(a: router_core::Token, b: router_core::Token, fee: FeeAmount) -> V3Pool {
        V3Pool::new(a, b, fee, num_bigint::BigInt::from(1u8) << 96, 10u128.pow(24), 0, vec![]).unwrap()
    }

    fn make_state() -> AppState {
        let x = router_core::Token::new(ChainId::Mainnet, "0x00000000000000000000000000000000000000e1", 18, Some("X"), None);
        let y = router_core::Token::new(ChainId::Mainnet, "0x00000000000000000000000000000000000000e2", 18, Some("Y"), None);
        let mut snapshot = PoolSnapshot::new(ChainId::Mainnet, 42);
        snapshot.gas_price_wei = Some(1);
        for pool in [
            make_pool(tokens::weth_mainnet(), tokens::usdc_mainnet(), FeeAmount::Medium),
            make_pool(tokens::usdc_mainnet(), tokens::dai_mainnet(), FeeAmount::Low),
            make_pool(x, y, FeeAmount::Medium),
        ] {
            snapshot.v3_pools.push(V3PoolRecord {
                pool,
                tvl_usd: 1_000_000.0,
                tvl_eth: 500.0,
            });
        }
        AppState::new(Arc::new(SnapshotProvider::new(snapshot, 1).unwrap()))
    }

    async fn post(body: Value) -> (axum::http::StatusCode, Value) {
        let response = create_app(make_state())
            .oneshot(
                Request::post("/quote")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_quote_single_pool() {
        let (status, body) = post(json!({
            "amount": "1000000",
            "token_in": tokens::usdc_mainnet().address,
            "token_out": tokens::dai_mainnet().address,
            "trade_type": "exact_input",
            "protocols": ["V3"],
        }))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["block_number"], 42);
        assert_eq!(body["routes"].as_array().unwrap().len(), 1);
        assert_eq!(body["routes"][0]["percent"], 100);
        assert!(!body["request_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (status, body) = post(json!({
            "amount": "1000",
            "token_in": tokens::wbtc_mainnet().address,
            "token_out": tokens::dai_mainnet().address,
            "trade_type": "exact_input",
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "unknown_token");
    }

    #[tokio::test]
    async fn test_disconnected_tokens_have_no_route() {
        let (status, body) = post(json!({
            "amount": "1000",
            "token_in": tokens::usdc_mainnet().address,
            "token_out": "0x00000000000000000000000000000000000000E1",
            "trade_type": "exact_input",
            "protocols": ["V3"],
        }))
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "no_route");
    }

    #[tokio::test]
    async fn test_malformed_amount() {
        let (status, body) = post(json!({
            "amount": "ten",
            "token_in": tokens::usdc_mainnet().address,
            "token_out": tokens::dai_mainnet().address,
            "trade_type": "exact_input",
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "bad_request");
    }
}
