//! Holdersync Core - Domain entities, services, and traits.
//!
//! This crate holds the ownership-synchronization pipeline for a tracked NFT
//! collection: parsing provider events, mutating the ownership ledger, and
//! reconciling newly discovered holders into the provider's watch-list.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `provider` crates.

pub mod collection;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod ownership;
pub mod transfers;
pub mod watchlist;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
