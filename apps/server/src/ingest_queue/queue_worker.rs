use std::sync::Arc;

use holdersync_core::ingest::IngestServiceTrait;
use tokio::sync::mpsc;

/// Processes queued payloads one at a time, in arrival order.
pub async fn ingest_queue_worker(
    mut rx: mpsc::UnboundedReceiver<Vec<serde_json::Value>>,
    ingest_service: Arc<dyn IngestServiceTrait>,
) {
    tracing::info!("Ingest queue worker started");

    while let Some(events) = rx.recv().await {
        let summary = ingest_service.ingest_events(&events).await;
        tracing::debug!(
            events = summary.events,
            dropped = summary.dropped_events,
            processed = summary.processed,
            skipped = summary.skipped,
            new_owners = summary.new_owners,
            "Webhook payload processed"
        );
    }

    tracing::info!("Ingest queue worker shutting down");
}
