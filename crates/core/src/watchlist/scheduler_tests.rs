//! Tests for the watch-list scheduler task, run on a paused tokio clock.

#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::ownership::{OwnershipRecord, OwnershipRepositoryTrait};
    use crate::watchlist::{
        reconcile_watchlist, InMemoryWatchlistProvider, NewOwnerSink, SchedulerPhase,
        SchedulerSettings, WatchlistError, WatchlistProviderTrait, WatchlistScheduler,
    };
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    // =========================================================================
    // Mocks
    // =========================================================================

    /// Ledger that only answers the holder query.
    struct FixedHolders(Vec<String>);

    #[async_trait]
    impl OwnershipRepositoryTrait for FixedHolders {
        fn find_owner_by_mint(&self, _mint: &str) -> Result<Option<OwnershipRecord>> {
            Ok(None)
        }

        async fn delete_owner_by_mint_and_wallet(&self, _mint: &str, _wallet: &str) -> Result<usize> {
            Ok(0)
        }

        async fn upsert_owner(&self, _record: OwnershipRecord) -> Result<bool> {
            Ok(true)
        }

        fn exists_owner_by_wallet(&self, wallet: &str) -> Result<bool> {
            Ok(self.0.iter().any(|w| w == wallet))
        }

        fn list_distinct_owner_wallets(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    /// Provider whose replace calls can be held open and made to fail.
    struct ControlledProvider {
        watched: Mutex<Vec<String>>,
        gate: Option<Semaphore>,
        failures_remaining: AtomicUsize,
        replace_attempts: AtomicUsize,
        replace_successes: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ControlledProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self::build(None, 0, Vec::new()))
        }

        fn gated() -> Arc<Self> {
            Arc::new(Self::build(Some(Semaphore::new(0)), 0, Vec::new()))
        }

        fn failing(times: usize) -> Arc<Self> {
            Arc::new(Self::build(None, times, Vec::new()))
        }

        fn watching(addresses: &[&str]) -> Arc<Self> {
            Arc::new(Self::build(
                None,
                0,
                addresses.iter().map(|a| a.to_string()).collect(),
            ))
        }

        fn build(gate: Option<Semaphore>, failures: usize, watched: Vec<String>) -> Self {
            Self {
                watched: Mutex::new(watched),
                gate,
                failures_remaining: AtomicUsize::new(failures),
                replace_attempts: AtomicUsize::new(0),
                replace_successes: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn release(&self, calls: usize) {
            if let Some(gate) = &self.gate {
                gate.add_permits(calls);
            }
        }

        fn attempts(&self) -> usize {
            self.replace_attempts.load(Ordering::SeqCst)
        }

        fn successes(&self) -> usize {
            self.replace_successes.load(Ordering::SeqCst)
        }

        fn watched_set(&self) -> BTreeSet<String> {
            self.watched.lock().unwrap().iter().cloned().collect()
        }
    }

    #[async_trait]
    impl WatchlistProviderTrait for ControlledProvider {
        async fn list_watched_addresses(&self) -> Result<Vec<String>> {
            Ok(self.watched.lock().unwrap().clone())
        }

        async fn replace_watched_addresses(&self, addresses: &[String]) -> Result<()> {
            self.replace_attempts.fetch_add(1, Ordering::SeqCst);
            let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failing = self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(Error::Watchlist(WatchlistError::Status {
                    status: 500,
                    body: "internal error".to_string(),
                }));
            }

            *self.watched.lock().unwrap() = addresses.to_vec();
            self.replace_successes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn settings(min_delay_secs: u64, max_pending: usize) -> SchedulerSettings {
        SchedulerSettings {
            min_delay: Duration::from_secs(min_delay_secs),
            max_pending,
            retry_delay: Duration::from_secs(60),
            credits_per_update: 100,
            extra_addresses: Vec::new(),
        }
    }

    fn holders(wallets: &[&str]) -> Arc<FixedHolders> {
        Arc::new(FixedHolders(
            wallets.iter().map(|w| w.to_string()).collect(),
        ))
    }

    fn set(addresses: &[&str]) -> BTreeSet<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    /// Lets every runnable task make progress before the clock moves.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // =========================================================================
    // Debounce
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_update_waits_for_debounce_window() {
        let provider = ControlledProvider::new();
        let scheduler =
            WatchlistScheduler::spawn(settings(30, 10), holders(&["W1"]), provider.clone());

        scheduler.add_new_owners(vec!["N1".to_string()]);
        settle().await;

        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.state, SchedulerPhase::Armed);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(provider.attempts(), 0);

        tokio::time::sleep(Duration::from_secs(28)).await;
        assert_eq!(provider.attempts(), 0);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["N1", "W1"]));

        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.state, SchedulerPhase::Idle);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.total_updates, 1);
        assert_eq!(stats.total_new_owners, 1);
        assert_eq!(stats.credits_used, 100);
        assert!(stats.last_update_time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_addresses_is_coalesced() {
        let provider = ControlledProvider::new();
        let scheduler = WatchlistScheduler::spawn(settings(30, 100), holders(&[]), provider.clone());

        for i in 0..5 {
            scheduler.add_new_owners(vec![format!("N{}", i)]);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["N0", "N1", "N2", "N3", "N4"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_forces_immediate_update() {
        let provider = ControlledProvider::new();
        let scheduler = WatchlistScheduler::spawn(settings(3600, 10), holders(&[]), provider.clone());

        for i in 0..15 {
            scheduler.add_new_owners(vec![format!("N{:02}", i)]);
        }
        settle().await;

        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set().len(), 10);

        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.pending_count, 5);
        assert_eq!(stats.state, SchedulerPhase::Armed);

        // Leftovers wait out the full interval since the last success.
        tokio::time::sleep(Duration::from_secs(3500)).await;
        assert_eq!(provider.successes(), 1);
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(provider.successes(), 2);
        // The list is rebuilt from the ledger, which this mock keeps empty.
        assert_eq!(provider.watched_set().len(), 5);
    }

    // =========================================================================
    // Single flight
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_only_one_update_in_flight() {
        let provider = ControlledProvider::gated();
        let scheduler = WatchlistScheduler::spawn(settings(0, 1), holders(&[]), provider.clone());

        scheduler.add_new_owners(vec!["A".to_string()]);
        settle().await;
        assert_eq!(provider.attempts(), 1);

        for i in 0..20 {
            scheduler.add_new_owners(vec![format!("B{}", i)]);
        }
        settle().await;

        assert_eq!(provider.attempts(), 1);
        let stats = scheduler.stats().await.unwrap();
        assert!(stats.is_updating);
        // "A" is in flight and still counts as pending.
        assert_eq!(stats.pending_count, 21);

        provider.release(1);
        settle().await;
        assert_eq!(provider.attempts(), 2);

        provider.release(1);
        settle().await;

        assert_eq!(provider.successes(), 2);
        assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(provider.watched_set().len(), 20);
        let stats = scheduler.stats().await.unwrap();
        assert!(!stats.is_updating);
        assert_eq!(stats.pending_count, 0);
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_failed_update_keeps_addresses_for_retry() {
        let provider = ControlledProvider::failing(1);
        let scheduler = WatchlistScheduler::spawn(settings(0, 10), holders(&[]), provider.clone());

        scheduler.add_new_owners(vec!["A".to_string()]);
        settle().await;

        let stats = scheduler.stats().await.unwrap();
        assert_eq!(provider.attempts(), 1);
        assert_eq!(stats.state, SchedulerPhase::CoolingDown);
        assert!(stats.is_updating);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.failed_updates, 1);
        assert!(stats.last_error.is_some());

        // Addresses arriving during cooldown do not trigger a call.
        scheduler.add_new_owners(vec!["B".to_string()]);
        settle().await;
        assert_eq!(provider.attempts(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["A", "B"]));
        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.last_error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_retry_waits_for_next_address() {
        let provider = ControlledProvider::failing(2);
        let scheduler = WatchlistScheduler::spawn(settings(0, 10), holders(&[]), provider.clone());

        scheduler.add_new_owners(vec!["A".to_string()]);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(provider.attempts(), 2);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(provider.attempts(), 2);
        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.state, SchedulerPhase::Idle);
        assert_eq!(stats.pending_count, 1);

        scheduler.add_new_owners(vec!["B".to_string()]);
        settle().await;

        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["A", "B"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_after_failed_retry_is_retried_again() {
        let provider = ControlledProvider::failing(3);
        let scheduler = WatchlistScheduler::spawn(settings(0, 10), holders(&[]), provider.clone());

        scheduler.add_new_owners(vec!["A".to_string()]);
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(provider.attempts(), 2);

        scheduler.add_new_owners(vec!["B".to_string()]);
        settle().await;
        assert_eq!(provider.attempts(), 3);
        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.state, SchedulerPhase::CoolingDown);
        assert_eq!(stats.pending_count, 2);

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(provider.attempts(), 4);
        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["A", "B"]));
    }

    // =========================================================================
    // Payload and forced sync
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_payload_includes_ledger_and_extra_addresses() {
        let provider = ControlledProvider::watching(&["OLD"]);
        let mut cfg = settings(0, 10);
        cfg.extra_addresses = vec!["MARKETPLACE".to_string()];
        let scheduler = WatchlistScheduler::spawn(cfg, holders(&["W1", "W2"]), provider.clone());

        scheduler.add_new_owners(vec!["N1".to_string()]);
        settle().await;

        assert_eq!(
            provider.watched_set(),
            set(&["MARKETPLACE", "N1", "W1", "W2"])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_watchlist_is_not_replaced() {
        let provider = ControlledProvider::watching(&["W1"]);
        let scheduler = WatchlistScheduler::spawn(settings(0, 10), holders(&["W1"]), provider.clone());

        scheduler.add_new_owners(vec!["W1".to_string()]);
        settle().await;

        assert_eq!(provider.attempts(), 0);
        let stats = scheduler.stats().await.unwrap();
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.credits_used, 0);
        assert!(stats.last_update_time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_sync_pushes_ledger_without_pending() {
        let provider = ControlledProvider::new();
        let scheduler =
            WatchlistScheduler::spawn(settings(3600, 10), holders(&["W1", "W2"]), provider.clone());

        scheduler.request_sync();
        settle().await;

        assert_eq!(provider.successes(), 1);
        assert_eq!(provider.watched_set(), set(&["W1", "W2"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_works_as_new_owner_sink() {
        let provider = ControlledProvider::new();
        let scheduler = WatchlistScheduler::spawn(settings(0, 10), holders(&[]), provider.clone());
        let sink: Arc<dyn NewOwnerSink> = Arc::new(scheduler.clone());

        sink.add_new_owners(vec!["A".to_string(), "A".to_string()]);
        sink.add_new_owners(Vec::new());
        settle().await;

        assert_eq!(provider.watched_set(), set(&["A"]));
        assert_eq!(scheduler.stats().await.unwrap().total_new_owners, 1);
    }

    #[tokio::test]
    async fn test_reconcile_with_in_memory_provider() {
        let provider = InMemoryWatchlistProvider::with_addresses(vec!["W1".to_string()]);
        let ledger = FixedHolders(vec!["W1".to_string(), "W2".to_string()]);

        let outcome = reconcile_watchlist(&ledger, &provider, &[], &["N1".to_string()])
            .await
            .unwrap();
        assert!(outcome.replaced);
        assert_eq!(outcome.address_count, 3);

        let again = reconcile_watchlist(&ledger, &provider, &[], &["N1".to_string()])
            .await
            .unwrap();
        assert!(!again.replaced);
    }
}
