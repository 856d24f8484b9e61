use std::time::Duration;

/// Every token in the tracked collection is a single, indivisible unit.
pub const NFT_UNIT_AMOUNT: u64 = 1;

/// Provider timestamps are expressed in seconds since the Unix epoch.
pub const PROVIDER_TIMESTAMP_MILLIS_FACTOR: i64 = 1000;

/// Minimum spacing between two successful watch-list updates.
pub const DEFAULT_WATCHLIST_MIN_DELAY: Duration = Duration::from_secs(30);

/// Pending addresses that force an update without waiting for the debounce timer.
pub const DEFAULT_WATCHLIST_MAX_PENDING: usize = 50;

/// Cooldown after a failed update before the scheduler re-evaluates.
pub const DEFAULT_WATCHLIST_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Credits charged by the provider for one webhook edit.
pub const DEFAULT_CREDITS_PER_UPDATE: u64 = 100;
