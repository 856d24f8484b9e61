use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use holdersync_core::collection::{NewTrackedMint, TrackedMint};
use serde::Serialize;

use super::require_admin;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterMintsResponse {
    registered: usize,
}

async fn list_mints(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TrackedMint>>> {
    let mints = state.collection_service.list_mints()?;
    Ok(Json(mints))
}

async fn register_mints(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mints): Json<Vec<NewTrackedMint>>,
) -> ApiResult<Json<RegisterMintsResponse>> {
    require_admin(&state, &headers)?;
    let registered = state.collection_service.register_mints(mints).await?;
    Ok(Json(RegisterMintsResponse { registered }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/collection/mints", get(list_mints).post(register_mints))
}
