//! Ingest queue for webhook payloads.
//!
//! The webhook handler acknowledges deliveries immediately and hands the
//! payload to this queue. A single worker drains it, so payloads reach the
//! ledger strictly in arrival order.

mod queue_worker;
mod sink;

pub use sink::IngestQueue;
