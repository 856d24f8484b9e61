use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ownership_model::{OwnershipRecord, ProcessResult};
use crate::errors::Result;
use crate::transfers::TransferEvent;

/// Trait for ownership ledger storage operations
#[async_trait]
pub trait OwnershipRepositoryTrait: Send + Sync {
    fn find_owner_by_mint(&self, mint: &str) -> Result<Option<OwnershipRecord>>;
    /// Deletes the record for `mint` only if it is held by `wallet`. Zero rows is not an error.
    async fn delete_owner_by_mint_and_wallet(&self, mint: &str, wallet: &str) -> Result<usize>;
    /// Inserts or overwrites the record keyed by mint.
    ///
    /// Returns `false` when an existing record is newer than `record.updated_at`
    /// and the write was refused.
    async fn upsert_owner(&self, record: OwnershipRecord) -> Result<bool>;
    fn exists_owner_by_wallet(&self, wallet: &str) -> Result<bool>;
    fn list_distinct_owner_wallets(&self) -> Result<Vec<String>>;
}

/// Trait for the ownership ledger processor
#[async_trait]
pub trait OwnershipServiceTrait: Send + Sync {
    /// Applies each transfer independently; failures are counted, never raised.
    async fn process_transfers(
        &self,
        transfers: &[TransferEvent],
        batch_timestamp: Option<DateTime<Utc>>,
    ) -> ProcessResult;
    fn get_owner(&self, mint: &str) -> Result<Option<OwnershipRecord>>;
    fn list_holders(&self) -> Result<Vec<String>>;
}
