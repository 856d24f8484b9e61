use std::sync::Arc;

use holdersync_core::ingest::IngestServiceTrait;
use tokio::sync::mpsc;

use super::queue_worker::ingest_queue_worker;

/// Sender side of the ingest queue.
#[derive(Clone)]
pub struct IngestQueue {
    tx: mpsc::UnboundedSender<Vec<serde_json::Value>>,
}

impl IngestQueue {
    /// Spawns the worker and returns the queue handle. Must be called from
    /// within a tokio runtime.
    pub fn start(ingest_service: Arc<dyn IngestServiceTrait>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(ingest_queue_worker(rx, ingest_service));
        Self { tx }
    }

    /// Queues one payload. Never blocks.
    pub fn enqueue(&self, events: Vec<serde_json::Value>) {
        let count = events.len();
        if self.tx.send(events).is_err() {
            tracing::error!(
                "Ingest queue worker is gone; dropping payload of {} event(s)",
                count
            );
        }
    }
}
