use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use holdersync_core::watchlist::WatchlistStats;
use serde_json::{json, Value};

use super::require_admin;
use crate::{error::ApiResult, main_lib::AppState};

async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<WatchlistStats>> {
    let stats = state.watchlist_scheduler.stats().await?;
    Ok(Json(stats))
}

async fn request_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_admin(&state, &headers)?;
    state.watchlist_scheduler.request_sync();
    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

async fn list_watched_addresses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<String>>> {
    require_admin(&state, &headers)?;
    let addresses = state.watchlist_provider.list_watched_addresses().await?;
    Ok(Json(addresses))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watchlist/stats", get(get_stats))
        .route("/watchlist/sync", post(request_sync))
        .route("/watchlist/addresses", get(list_watched_addresses))
}
