use async_trait::async_trait;

use super::collection_model::{NewTrackedMint, TrackedMint};
use crate::errors::Result;

/// Trait for tracked collection repository operations
#[async_trait]
pub trait CollectionRepositoryTrait: Send + Sync {
    /// Existence lookup used as the admission gate for every transfer.
    fn exists_tracked_mint(&self, mint: &str) -> Result<bool>;
    fn list_tracked_mints(&self) -> Result<Vec<TrackedMint>>;
    fn count_tracked_mints(&self) -> Result<i64>;
    /// Inserts mints that are not yet tracked; returns how many were added.
    async fn register_mints(&self, mints: Vec<NewTrackedMint>) -> Result<usize>;
}

/// Trait for tracked collection service operations
#[async_trait]
pub trait CollectionServiceTrait: Send + Sync {
    fn list_mints(&self) -> Result<Vec<TrackedMint>>;
    fn is_tracked(&self, mint: &str) -> Result<bool>;
    async fn register_mints(&self, mints: Vec<NewTrackedMint>) -> Result<usize>;
}
