//! Error types shared by the ledger, collection and watch-list code.
//!
//! Storage crates turn their driver errors into [`DatabaseError`]; the provider
//! client turns HTTP failures into [`WatchlistError`]. Nothing outside those
//! crates sees a Diesel or reqwest type.

use thiserror::Error;

pub use crate::watchlist::WatchlistError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ledger storage error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Rejected input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Watch-list error: {0}")]
    Watchlist(#[from] WatchlistError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage failures, reduced to strings so no driver type leaks out.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Cannot build connection pool: {0}")]
    PoolCreationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate primary key, e.g. a mint inserted twice outside `insert or ignore`.
    #[error("Duplicate key: {0}")]
    UniqueViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The single-writer actor is gone or dropped a reply.
    #[error("Database writer unavailable: {0}")]
    WriterUnavailable(String),

    #[error("Internal storage error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Missing field '{0}'")]
    MissingField(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(format!("Malformed JSON: {}", err)))
    }
}
