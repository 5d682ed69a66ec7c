//! Snapshot inspection

use axum::{extract::State, Json};

use crate::dto::PoolsResponse;
use crate::AppState;

/// GET /pools - Pool counts of the loaded snapshot
pub async fn get_pools(State(state): State<AppState>) -> Json<PoolsResponse> {
    let snapshot = state.snapshot();
    Json(PoolsResponse {
        chain_id: snapshot.chain().id(),
        block_number: snapshot.block_number(),
        v3_pools: snapshot.v3_pool_count(),
        v2_pairs: snapshot.v2_pair_count(),
    })
}
