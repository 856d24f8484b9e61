//! Transfer domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

/// One enhanced-transaction event as delivered by the provider's webhook.
///
/// Only the fields the pipeline reads are modelled; everything else in the
/// payload (native transfers, account data, instructions) is ignored. A field
/// of the wrong type reads as absent, so one bad value never costs the event.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProviderEvent {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    /// Seconds since the Unix epoch.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub timestamp: Option<serde_json::Number>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub signature: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub description: Option<String>,
    /// Elements that are not transfer objects decode as an empty transfer.
    #[serde_as(deserialize_as = "DefaultOnError<Option<Vec<DefaultOnError>>>")]
    #[serde(default)]
    pub token_transfers: Option<Vec<RawTokenTransfer>>,
}

/// A token movement inside a provider event.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenTransfer {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub mint: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub to_user_account: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub from_token_account: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub to_token_account: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub token_amount: Option<serde_json::Number>,
}

/// One on-chain token movement, normalized for the ledger processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    pub mint: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub to_token_account: Option<String>,
    /// Whole-unit count; `None` when the provider sent a fractional or negative amount.
    pub amount: Option<u64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A provider event that carries at least one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub event_type: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub signature: Option<String>,
    pub description: Option<String>,
    pub transfers: Vec<TransferEvent>,
}
