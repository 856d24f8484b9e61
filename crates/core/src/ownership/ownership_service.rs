use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::ownership_model::{OwnershipRecord, ProcessResult, SkipReason, TransferOutcome};
use super::ownership_traits::{OwnershipRepositoryTrait, OwnershipServiceTrait};
use crate::collection::CollectionRepositoryTrait;
use crate::constants::NFT_UNIT_AMOUNT;
use crate::errors::Result;
use crate::transfers::TransferEvent;

/// Ownership ledger processor.
///
/// Applies transfer batches to the ledger and reports which receivers are
/// brand-new holders. Side effects are confined to the ledger; nothing here
/// talks to the network.
pub struct OwnershipService {
    ownership_repository: Arc<dyn OwnershipRepositoryTrait>,
    collection_repository: Arc<dyn CollectionRepositoryTrait>,
}

impl OwnershipService {
    pub fn new(
        ownership_repository: Arc<dyn OwnershipRepositoryTrait>,
        collection_repository: Arc<dyn CollectionRepositoryTrait>,
    ) -> Self {
        OwnershipService {
            ownership_repository,
            collection_repository,
        }
    }

    /// Applies one transfer. Storage errors propagate to the caller, which
    /// counts them as skipped.
    async fn apply_transfer(
        &self,
        transfer: &TransferEvent,
        updated_at: DateTime<Utc>,
    ) -> Result<TransferOutcome> {
        if transfer.amount != Some(NFT_UNIT_AMOUNT) {
            return Ok(TransferOutcome::Skipped(SkipReason::UnsupportedAmount));
        }

        if transfer.mint.is_empty()
            || !self
                .collection_repository
                .exists_tracked_mint(&transfer.mint)?
        {
            return Ok(TransferOutcome::Skipped(SkipReason::UntrackedMint));
        }

        if transfer.from_address.is_none() && transfer.to_address.is_none() {
            return Ok(TransferOutcome::Skipped(SkipReason::NoParties));
        }

        let mut removed = 0;
        if let Some(from) = transfer.from_address.as_deref() {
            removed = self
                .ownership_repository
                .delete_owner_by_mint_and_wallet(&transfer.mint, from)
                .await?;
            if removed == 0 {
                debug!(
                    "No record of {} held by {}; already moved or delivered out of order",
                    transfer.mint, from
                );
            }
        }

        let Some(to) = transfer.to_address.as_deref() else {
            return Ok(TransferOutcome::Applied { new_owner: None });
        };

        let is_new_holder = !self.ownership_repository.exists_owner_by_wallet(to)?;
        let written = self
            .ownership_repository
            .upsert_owner(OwnershipRecord {
                mint: transfer.mint.clone(),
                token_account: transfer.to_token_account.clone(),
                owner_wallet: to.to_string(),
                amount: NFT_UNIT_AMOUNT as i64,
                updated_at: updated_at.naive_utc(),
            })
            .await?;

        if !written {
            debug!(
                "Refused stale write of {} to {} at {}",
                transfer.mint, to, updated_at
            );
            return Ok(if removed > 0 {
                TransferOutcome::Applied { new_owner: None }
            } else {
                TransferOutcome::Skipped(SkipReason::Stale)
            });
        }

        Ok(TransferOutcome::Applied {
            new_owner: is_new_holder.then(|| to.to_string()),
        })
    }
}

#[async_trait]
impl OwnershipServiceTrait for OwnershipService {
    async fn process_transfers(
        &self,
        transfers: &[TransferEvent],
        batch_timestamp: Option<DateTime<Utc>>,
    ) -> ProcessResult {
        let updated_at = batch_timestamp.unwrap_or_else(Utc::now);
        let mut result = ProcessResult::default();
        let mut seen = HashSet::new();

        for transfer in transfers {
            let outcome = match self.apply_transfer(transfer, updated_at).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        "Failed to apply transfer of {} ({:?} -> {:?}): {}",
                        transfer.mint, transfer.from_address, transfer.to_address, e
                    );
                    TransferOutcome::Skipped(SkipReason::StorageFailure)
                }
            };

            match outcome {
                TransferOutcome::Applied { new_owner } => {
                    result.processed_count += 1;
                    if let Some(owner) = new_owner {
                        if seen.insert(owner.clone()) {
                            result.new_owner_addresses.push(owner);
                        }
                    }
                }
                TransferOutcome::Skipped(reason) => {
                    debug!("Skipped transfer of {}: {:?}", transfer.mint, reason);
                    result.skipped_count += 1;
                }
            }
        }

        result
    }

    fn get_owner(&self, mint: &str) -> Result<Option<OwnershipRecord>> {
        self.ownership_repository.find_owner_by_mint(mint)
    }

    fn list_holders(&self) -> Result<Vec<String>> {
        self.ownership_repository.list_distinct_owner_wallets()
    }
}
