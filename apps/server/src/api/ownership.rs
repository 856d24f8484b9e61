use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use holdersync_core::ownership::OwnershipRecord;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn list_holders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let holders = state.ownership_service.list_holders()?;
    Ok(Json(holders))
}

async fn get_owner(
    Path(mint): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<OwnershipRecord>> {
    state
        .ownership_service
        .get_owner(&mint)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ownership/holders", get(list_holders))
        .route("/ownership/{mint}", get(get_owner))
}
