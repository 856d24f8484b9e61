//! Helpers for working with SQLite.

/// Maximum number of rows bound into a single multi-row statement.
///
/// SQLite caps the number of bound parameters per statement (historically 999).
/// Tracked-mint inserts bind three columns per row, so batches stay well below it.
pub const SQLITE_MAX_ROWS_CHUNK: usize = 250;

/// Splits a slice into chunks that can each be bound into one statement.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_ROWS_CHUNK)
}
