//! Route-to-ratio for liquidity deposits

use axum::{extract::State, http::StatusCode, Json};
use router_core::{constants, Address, Fraction, RouteToRatioConfig};
use smart_order_router::SwapToRatioResponse;

use crate::dto::{router_failure, ApiError, ApiFailure, QuoteResponse, RouteToRatioRequest, RouteToRatioResponse};
use crate::routes::quote::{new_request_id, parse_amount};
use crate::AppState;

/// POST /route-to-ratio - Swap needed to deposit both balances into a position
pub async fn route_to_ratio(
    State(state): State<AppState>,
    Json(request): Json<RouteToRatioRequest>,
) -> Result<Json<RouteToRatioResponse>, ApiFailure> {
    let request_id = new_request_id();
    let pool = state
        .snapshot()
        .v3_pool(&Address::new(request.pool.as_str()))
        .cloned()
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::not_found(format!("Pool not found: {}", request.pool))),
            )
        })?;
    let token0_balance = parse_amount(&pool.token0, &request.token0_balance)?;
    let token1_balance = parse_amount(&pool.token1, &request.token1_balance)?;
    let position = amm::Position::new(pool, request.tick_lower, request.tick_upper).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("invalid_position", e.to_string())),
        )
    })?;

    let mut ratio_config = RouteToRatioConfig::default();
    if let Some(bips) = request.ratio_error_tolerance_bips {
        ratio_config.ratio_error_tolerance = Fraction::new(bips, constants::BIPS_BASE);
    }
    if let Some(max_iterations) = request.max_iterations {
        ratio_config.max_iterations = max_iterations;
    }

    tracing::info!(
        request_id = %request_id,
        pool = %request.pool,
        tick_lower = request.tick_lower,
        tick_upper = request.tick_upper,
        "Route to ratio requested"
    );

    let response = state
        .router()
        .route_to_ratio(
            token0_balance,
            token1_balance,
            &position,
            &ratio_config,
            request.overrides.unwrap_or_default(),
        )
        .await
        .map_err(|e| router_failure(&e))?;

    let mut body = RouteToRatioResponse {
        request_id: request_id.clone(),
        status: response.status(),
        error: None,
        optimal_ratio: None,
        post_swap_sqrt_price_x96: None,
        post_swap_tick: None,
        swap: None,
    };
    match response {
        SwapToRatioResponse::Success {
            swap,
            optimal_ratio,
            post_swap_target_pool,
        } => {
            body.optimal_ratio = Some(optimal_ratio.to_fixed(6));
            body.post_swap_sqrt_price_x96 = Some(post_swap_target_pool.sqrt_price_x96.to_string());
            body.post_swap_tick = Some(post_swap_target_pool.tick_current);
            body.swap = Some(QuoteResponse::from_swap(&request_id, &swap));
        }
        SwapToRatioResponse::NoRouteFound { error } => body.error = Some(error),
        SwapToRatioResponse::NoSwapNeeded => {}
    }
    Ok(Json(body))
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

    fn make_pool() -> V3Pool {
        V3Pool::new(
            tokens::usdc_mainnet(),
            tokens::dai_mainnet(),
            FeeAmount::Low,
            num_bigint::BigInt::from(1u8) << 96,
            10u128.pow(24),
            0,
            vec![],
        )
        .unwrap()
    }

    async fn post(body: Value) -> (axum::http::StatusCode, Value) {
        let mut snapshot = PoolSnapshot::new(ChainId::Mainnet, 7);
        snapshot.v3_pools.push(V3PoolRecord {
            pool: make_pool(),
            tvl_usd: 1_000_000.0,
            tvl_eth: 500.0,
        });
        let state = AppState::new(Arc::new(SnapshotProvider::new(snapshot, 1).unwrap()));
        let response = create_app(state)
            .oneshot(
                Request::post("/route-to-ratio")
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
    async fn test_nothing_to_swap_out_of_range() {
        // range below the price holds only token1, and there is no token0 to sell
        let (status, body) = post(json!({
            "pool": make_pool().address(),
            "tick_lower": -200,
            "tick_upper": -100,
            "token0_balance": "0",
            "token1_balance": "5000",
        }))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "NO_SWAP_NEEDED");
    }

    #[tokio::test]
    async fn test_invalid_position_range() {
        let (status, body) = post(json!({
            "pool": make_pool().address(),
            "tick_lower": 100,
            "tick_upper": -100,
            "token0_balance": "0",
            "token1_balance": "5000",
        }))
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "invalid_position");
    }

    #[tokio::test]
    async fn test_unknown_pool() {
        let (status, body) = post(json!({
            "pool": "0x00000000000000000000000000000000000000ff",
            "tick_lower": -100,
            "tick_upper": 100,
            "token0_balance": "1",
            "token1_balance": "1",
        }))
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "not_found");
    }
}
