//! Watch-list scheduler models.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::constants::{
    DEFAULT_CREDITS_PER_UPDATE, DEFAULT_WATCHLIST_MAX_PENDING, DEFAULT_WATCHLIST_MIN_DELAY,
    DEFAULT_WATCHLIST_RETRY_DELAY,
};

/// Tuning for the reconciliation scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Minimum interval between successful updates (debounce window).
    pub min_delay: Duration,
    /// Pending-set size that forces an update immediately.
    pub max_pending: usize,
    /// Busy window after a failed update.
    pub retry_delay: Duration,
    pub credits_per_update: u64,
    /// Addresses always included in the pushed watch-list.
    pub extra_addresses: Vec<String>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_WATCHLIST_MIN_DELAY,
            max_pending: DEFAULT_WATCHLIST_MAX_PENDING,
            retry_delay: DEFAULT_WATCHLIST_RETRY_DELAY,
            credits_per_update: DEFAULT_CREDITS_PER_UPDATE,
            extra_addresses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchedulerPhase {
    Idle,
    /// Debounce timer running.
    Armed,
    Updating,
    /// Post-failure backoff; still counts as busy.
    CoolingDown,
}

/// Cost counters that reset when the UTC date rolls over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounters {
    pub day: NaiveDate,
    pub total_updates: u64,
    pub total_new_owners: u64,
    pub credits_used: u64,
    pub failed_updates: u64,
}

impl DailyCounters {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            total_updates: 0,
            total_new_owners: 0,
            credits_used: 0,
            failed_updates: 0,
        }
    }

    /// Resets the counters when `today` differs from the tracked day.
    pub fn roll(&mut self, today: NaiveDate) {
        if today != self.day {
            *self = DailyCounters::new(today);
        }
    }
}

/// Liveness and cost view of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    pub state: SchedulerPhase,
    pub pending_count: usize,
    pub is_updating: bool,
    pub last_update_time: Option<DateTime<Utc>>,
    pub seconds_since_last_update: Option<u64>,
    pub total_updates: u64,
    pub total_new_owners: u64,
    pub credits_used: u64,
    pub failed_updates: u64,
    pub counters_date: NaiveDate,
    pub last_error: Option<String>,
}

/// Result of one successful reconciliation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// `false` when the provider already watched exactly the desired set.
    pub replaced: bool,
    pub address_count: usize,
}
