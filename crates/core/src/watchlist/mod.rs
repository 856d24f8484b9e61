//! Watch-list module - keeps the provider's monitored addresses a superset of
//! the ledger's holders.
//!
//! [`ReconcileMachine`] is the pure debounce / single-flight / cooldown state
//! machine; [`WatchlistScheduler`] drives it from a tokio task and performs the
//! provider calls.

mod memory_provider;
mod scheduler;
mod state_machine;
mod watchlist_errors;
mod watchlist_model;
mod watchlist_traits;

#[cfg(test)]
mod scheduler_tests;

pub use memory_provider::InMemoryWatchlistProvider;
pub use scheduler::{reconcile_watchlist, WatchlistScheduler};
pub use state_machine::{ReconcileAction, ReconcileEvent, ReconcileMachine};
pub use watchlist_errors::WatchlistError;
pub use watchlist_model::{
    DailyCounters, ReconcileOutcome, SchedulerPhase, SchedulerSettings, WatchlistStats,
};
pub use watchlist_traits::{same_addresses, NewOwnerSink, WatchlistProviderTrait};
