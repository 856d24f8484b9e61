//! Ownership ledger domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Current holder of one tracked mint. At most one record exists per mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    pub mint: String,
    pub token_account: Option<String>,
    pub owner_wallet: String,
    pub amount: i64,
    /// UTC time of the transfer that produced this record.
    pub updated_at: NaiveDateTime,
}

/// Outcome of processing a transfer batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub processed_count: usize,
    pub skipped_count: usize,
    /// Receivers that held no tracked mint before the transfer, in first-seen order.
    pub new_owner_addresses: Vec<String>,
}

/// Why a transfer left the ledger untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedAmount,
    UntrackedMint,
    NoParties,
    /// The ledger already holds a newer record for the mint.
    Stale,
    StorageFailure,
}

/// Result of applying a single transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Applied { new_owner: Option<String> },
    Skipped(SkipReason),
}
