use std::sync::Arc;

use axum::{
    http::{HeaderMap, HeaderValue},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

mod collection;
mod health;
mod ownership;
mod watchlist;
mod webhook;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .merge(health::router())
        .merge(webhook::router())
        .merge(watchlist::router())
        .merge(ownership::router())
        .merge(collection::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Rejects the request unless it carries the configured admin key.
/// Admin routes stay closed when no key is configured.
pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.admin_key.as_deref() else {
        return Err(ApiError::Unauthorized("Admin access is disabled".to_string()));
    };
    match headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(provided) if provided == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("Invalid admin key".to_string())),
    }
}
