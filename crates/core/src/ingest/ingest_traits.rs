use async_trait::async_trait;

use super::ingest_model::IngestSummary;

#[async_trait]
pub trait IngestServiceTrait: Send + Sync {
    /// Processes the events of one payload in order. Never fails: rejected
    /// events and failed transfers are only counted.
    async fn ingest_events(&self, events: &[serde_json::Value]) -> IngestSummary;
}
