use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Receives transfer deliveries from the provider.
///
/// The payload is queued and acknowledged at once; processing failures are
/// never reported back, so the provider does not retry deliveries we already hold.
async fn receive_transfers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    if let Some(expected) = state.webhook_auth_header.as_deref() {
        let provided = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!("Rejected webhook delivery with missing or wrong authorization");
            return Err(ApiError::Unauthorized("Invalid webhook authorization".to_string()));
        }
    }

    let events = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(events)) => events,
        _ => {
            return Err(ApiError::BadRequest(
                "Expected a JSON array of events".to_string(),
            ))
        }
    };

    tracing::debug!("Webhook delivery with {} event(s)", events.len());
    state.ingest_queue.enqueue(events);
    Ok(Json(json!({ "success": true })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/transfers", post(receive_transfers))
}
