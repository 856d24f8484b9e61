//! Event parser: normalizes a raw provider event into a typed transfer batch.
//!
//! The parser fails closed: an event without a non-empty transfer list is
//! dropped here and never reaches the ledger processor. Individual transfers
//! are not validated beyond shape normalization; the processor rejects
//! unsupported amounts and untracked mints.

use chrono::{DateTime, TimeZone, Utc};
use log::debug;

use super::transfers_model::{ParsedEvent, RawProviderEvent, RawTokenTransfer, TransferEvent};
use crate::constants::PROVIDER_TIMESTAMP_MILLIS_FACTOR;

const UNKNOWN_EVENT_TYPE: &str = "UNKNOWN";

/// Parses one element of a webhook payload.
///
/// Elements that are not JSON objects are treated like events without
/// transfers.
pub fn parse_value(raw: &serde_json::Value) -> Option<ParsedEvent> {
    match RawProviderEvent::deserialize_from(raw) {
        Some(event) => parse_event(event),
        None => {
            debug!("Dropping webhook element that is not a provider event");
            None
        }
    }
}

/// Converts a raw provider event into a [`ParsedEvent`], or `None` when it
/// carries no transfers.
pub fn parse_event(raw: RawProviderEvent) -> Option<ParsedEvent> {
    let raw_transfers = raw.token_transfers.unwrap_or_default();
    if raw_transfers.is_empty() {
        debug!(
            "Dropping event {} without token transfers",
            raw.signature.as_deref().unwrap_or("<unsigned>")
        );
        return None;
    }

    let timestamp = raw.timestamp.as_ref().and_then(to_datetime);
    let transfers = raw_transfers
        .into_iter()
        .map(|t| to_transfer(t, timestamp))
        .collect();

    Some(ParsedEvent {
        event_type: raw
            .event_type
            .unwrap_or_else(|| UNKNOWN_EVENT_TYPE.to_string()),
        timestamp,
        signature: raw.signature,
        description: raw.description,
        transfers,
    })
}

/// Converts a provider token amount into a whole-unit count.
///
/// Only non-negative integral values map to a count; fractional amounts are
/// an unsupported event shape for this collection.
pub fn token_amount_units(amount: &serde_json::Number) -> Option<u64> {
    if let Some(units) = amount.as_u64() {
        return Some(units);
    }
    let value = amount.as_f64()?;
    if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn to_transfer(raw: RawTokenTransfer, timestamp: Option<DateTime<Utc>>) -> TransferEvent {
    TransferEvent {
        mint: raw.mint.unwrap_or_default(),
        from_address: non_empty(raw.from_user_account),
        to_address: non_empty(raw.to_user_account),
        to_token_account: non_empty(raw.to_token_account),
        amount: raw.token_amount.as_ref().and_then(token_amount_units),
        timestamp,
    }
}

/// Whole seconds are exact; fractional seconds are kept to the millisecond.
fn to_datetime(seconds: &serde_json::Number) -> Option<DateTime<Utc>> {
    let millis = match seconds.as_i64() {
        Some(whole) => whole.checked_mul(PROVIDER_TIMESTAMP_MILLIS_FACTOR)?,
        None => {
            let millis = seconds.as_f64()? * PROVIDER_TIMESTAMP_MILLIS_FACTOR as f64;
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return None;
            }
            millis.round() as i64
        }
    };
    Utc.timestamp_millis_opt(millis).single()
}

/// The provider sends `""` for the missing side of mints and burns.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawProviderEvent {
    fn deserialize_from(raw: &serde_json::Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }
        serde_json::from_value(raw.clone()).ok()
    }
}
