//! Ingest module - runs one webhook payload through parser, ledger and scheduler.

mod ingest_model;
mod ingest_service;
mod ingest_traits;

pub use ingest_model::IngestSummary;
pub use ingest_service::IngestService;
pub use ingest_traits::IngestServiceTrait;
