//! Diesel and r2d2 failures, and their mapping onto core errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use holdersync_core::errors::{DatabaseError, Error};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite connection failed: {0}")]
    Connect(#[from] diesel::ConnectionError),

    #[error("Pool checkout failed: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Diesel query failed: {0}")]
    Query(#[from] DieselError),

    /// A core error raised inside a writer job; carried through the transaction as text.
    #[error("{0}")]
    Job(String),
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::Job(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db_error = match err {
            StorageError::Connect(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Pool(e) => DatabaseError::ConnectionFailed(e.to_string()),
            StorageError::Query(DieselError::NotFound) => {
                DatabaseError::NotFound("no matching row".to_string())
            }
            StorageError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => DatabaseError::UniqueViolation(info.message().to_string()),
            StorageError::Query(e) => DatabaseError::QueryFailed(e.to_string()),
            StorageError::Job(message) => DatabaseError::Internal(message),
        };
        Error::Database(db_error)
    }
}

/// `.into_core()` on Diesel and pool results.
pub trait IntoCore<T> {
    fn into_core(self) -> holdersync_core::Result<T>;
}

impl<T, E> IntoCore<T> for std::result::Result<T, E>
where
    E: Into<StorageError>,
{
    fn into_core(self) -> holdersync_core::Result<T> {
        self.map_err(|e| Error::from(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_core_not_found() {
        let err: Error = StorageError::Query(DieselError::NotFound).into();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }

    #[test]
    fn test_into_core_wraps_query_errors() {
        let result: std::result::Result<(), DieselError> = Err(DieselError::RollbackTransaction);
        let err = result.into_core().unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn test_job_errors_become_internal() {
        let core = Error::Unexpected("boom".to_string());
        let err: Error = StorageError::from(core).into();
        assert!(matches!(err, Error::Database(DatabaseError::Internal(m)) if m.contains("boom")));
    }
}
