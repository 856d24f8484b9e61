//! SQLite storage implementation for Holdersync.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `holdersync-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Embedded Diesel migrations
//! - Repositories for the tracked collection and the ownership ledger
//!
//! This crate is the only place in the application where Diesel dependencies exist.

pub mod collection;
pub mod db;
pub mod errors;
pub mod ownership;
pub mod schema;
pub mod utils;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use collection::CollectionRepository;
pub use ownership::OwnershipRepository;

// Re-export from holdersync-core for convenience
pub use holdersync_core::errors::{DatabaseError, Error, Result};
