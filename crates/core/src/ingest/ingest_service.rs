use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::ingest_model::IngestSummary;
use super::ingest_traits::IngestServiceTrait;
use crate::ownership::OwnershipServiceTrait;
use crate::transfers::parse_value;
use crate::watchlist::NewOwnerSink;

/// Feeds provider events into the ledger and forwards new holders.
pub struct IngestService {
    ownership_service: Arc<dyn OwnershipServiceTrait>,
    new_owner_sink: Arc<dyn NewOwnerSink>,
}

impl IngestService {
    pub fn new(
        ownership_service: Arc<dyn OwnershipServiceTrait>,
        new_owner_sink: Arc<dyn NewOwnerSink>,
    ) -> Self {
        Self {
            ownership_service,
            new_owner_sink,
        }
    }
}

#[async_trait]
impl IngestServiceTrait for IngestService {
    async fn ingest_events(&self, events: &[serde_json::Value]) -> IngestSummary {
        let mut summary = IngestSummary {
            events: events.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut new_owners = Vec::new();

        for raw in events {
            let Some(event) = parse_value(raw) else {
                summary.dropped_events += 1;
                continue;
            };

            let result = self
                .ownership_service
                .process_transfers(&event.transfers, event.timestamp)
                .await;
            debug!(
                "Event {} ({}): {} processed, {} skipped",
                event.signature.as_deref().unwrap_or("<unsigned>"),
                event.event_type,
                result.processed_count,
                result.skipped_count
            );

            summary.processed += result.processed_count;
            summary.skipped += result.skipped_count;
            for owner in result.new_owner_addresses {
                if seen.insert(owner.clone()) {
                    new_owners.push(owner);
                }
            }
        }

        summary.new_owners = new_owners.len();
        if !new_owners.is_empty() {
            self.new_owner_sink.add_new_owners(new_owners);
        }

        info!(
            "Ingested {} event(s): {} dropped, {} transfer(s) applied, {} skipped, {} new owner(s)",
            summary.events,
            summary.dropped_events,
            summary.processed,
            summary.skipped,
            summary.new_owners
        );
        summary
    }
}
