//! Debounce / single-flight / cooldown state machine for watch-list updates.
//!
//! The machine is synchronous and side-effect free: it consumes
//! [`ReconcileEvent`]s and answers with [`ReconcileAction`]s for the driver to
//! carry out. Time is passed in explicitly so transitions are testable without
//! a runtime.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::Instant;

use super::watchlist_model::{DailyCounters, SchedulerPhase, SchedulerSettings, WatchlistStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    AddressesAdded(Vec<String>),
    /// The timer armed by the last [`ReconcileAction::ArmTimer`] fired.
    TimerElapsed,
    /// Explicit sync request; ignores debounce and threshold.
    ForceRequested,
    CallSucceeded { at: DateTime<Utc>, replaced: bool },
    CallFailed { at: DateTime<Utc>, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Replace any running timer with one firing after the given delay.
    ArmTimer(Duration),
    CancelTimer,
    /// Begin a provider update for this batch. At most one is ever in flight.
    StartUpdate(Vec<String>),
}

pub struct ReconcileMachine {
    settings: SchedulerSettings,
    phase: SchedulerPhase,
    /// Every address not yet confirmed by a successful update, including the
    /// in-flight batch.
    pending: BTreeSet<String>,
    in_flight: Vec<String>,
    follow_up_forced: bool,
    /// The running or last failed round was the automatic retry.
    retry_round: bool,
    last_success: Option<Instant>,
    last_success_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    counters: DailyCounters,
}

impl ReconcileMachine {
    pub fn new(settings: SchedulerSettings, today: NaiveDate) -> Self {
        Self {
            settings,
            phase: SchedulerPhase::Idle,
            pending: BTreeSet::new(),
            in_flight: Vec::new(),
            follow_up_forced: false,
            retry_round: false,
            last_success: None,
            last_success_at: None,
            last_error: None,
            counters: DailyCounters::new(today),
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_updating(&self) -> bool {
        matches!(
            self.phase,
            SchedulerPhase::Updating | SchedulerPhase::CoolingDown
        )
    }

    pub fn handle(&mut self, event: ReconcileEvent, now: Instant) -> Vec<ReconcileAction> {
        match event {
            ReconcileEvent::AddressesAdded(addresses) => self.on_addresses_added(addresses, now),
            ReconcileEvent::TimerElapsed => self.on_timer_elapsed(),
            ReconcileEvent::ForceRequested => self.on_force_requested(),
            ReconcileEvent::CallSucceeded { at, replaced } => self.on_success(at, replaced, now),
            ReconcileEvent::CallFailed { at, error } => self.on_failure(at, error),
        }
    }

    /// Stats snapshot; rolls the daily counters if the date changed.
    pub fn snapshot(&mut self, now: Instant, wall_now: DateTime<Utc>) -> WatchlistStats {
        self.counters.roll(wall_now.date_naive());
        WatchlistStats {
            state: self.phase,
            pending_count: self.pending.len(),
            is_updating: self.is_updating(),
            last_update_time: self.last_success_at,
            seconds_since_last_update: self
                .last_success
                .map(|t| now.saturating_duration_since(t).as_secs()),
            total_updates: self.counters.total_updates,
            total_new_owners: self.counters.total_new_owners,
            credits_used: self.counters.credits_used,
            failed_updates: self.counters.failed_updates,
            counters_date: self.counters.day,
            last_error: self.last_error.clone(),
        }
    }

    fn on_addresses_added(&mut self, addresses: Vec<String>, now: Instant) -> Vec<ReconcileAction> {
        let before = self.pending.len();
        for address in addresses {
            let address = address.trim();
            if !address.is_empty() {
                self.pending.insert(address.to_string());
            }
        }
        if self.pending.len() == before {
            return Vec::new();
        }

        match self.phase {
            SchedulerPhase::Idle if self.over_threshold() => self.start_update(false),
            SchedulerPhase::Idle => self.arm(now),
            SchedulerPhase::Armed if self.over_threshold() => {
                let mut actions = vec![ReconcileAction::CancelTimer];
                actions.extend(self.start_update(false));
                actions
            }
            // Busy: the addresses wait for the current round to finish.
            SchedulerPhase::Armed | SchedulerPhase::Updating | SchedulerPhase::CoolingDown => {
                Vec::new()
            }
        }
    }

    fn on_timer_elapsed(&mut self) -> Vec<ReconcileAction> {
        match self.phase {
            SchedulerPhase::Armed => {
                if self.pending.is_empty() && !self.follow_up_forced {
                    self.phase = SchedulerPhase::Idle;
                    Vec::new()
                } else {
                    self.start_update(false)
                }
            }
            // One automatic retry per failed round; a failed retry waits for the
            // next address or a forced sync.
            SchedulerPhase::CoolingDown => {
                if self.follow_up_forced {
                    self.start_update(false)
                } else if !self.retry_round && !self.pending.is_empty() {
                    self.start_update(true)
                } else {
                    self.phase = SchedulerPhase::Idle;
                    Vec::new()
                }
            }
            // Stale timer from a phase already left.
            SchedulerPhase::Idle | SchedulerPhase::Updating => Vec::new(),
        }
    }

    fn on_force_requested(&mut self) -> Vec<ReconcileAction> {
        match self.phase {
            SchedulerPhase::Idle => self.start_update(false),
            SchedulerPhase::Armed => {
                let mut actions = vec![ReconcileAction::CancelTimer];
                actions.extend(self.start_update(false));
                actions
            }
            SchedulerPhase::Updating | SchedulerPhase::CoolingDown => {
                self.follow_up_forced = true;
                Vec::new()
            }
        }
    }

    fn on_success(
        &mut self,
        at: DateTime<Utc>,
        replaced: bool,
        now: Instant,
    ) -> Vec<ReconcileAction> {
        if self.phase != SchedulerPhase::Updating {
            return Vec::new();
        }

        self.counters.roll(at.date_naive());
        if replaced {
            self.counters.total_updates += 1;
            self.counters.credits_used += self.settings.credits_per_update;
        }
        self.counters.total_new_owners += self.in_flight.len() as u64;
        for address in self.in_flight.drain(..) {
            self.pending.remove(&address);
        }
        self.retry_round = false;
        self.last_error = None;
        self.last_success = Some(now);
        self.last_success_at = Some(at);

        if self.follow_up_forced || self.over_threshold() {
            self.start_update(false)
        } else if !self.pending.is_empty() {
            self.arm(now)
        } else {
            self.phase = SchedulerPhase::Idle;
            Vec::new()
        }
    }

    fn on_failure(&mut self, at: DateTime<Utc>, error: String) -> Vec<ReconcileAction> {
        if self.phase != SchedulerPhase::Updating {
            return Vec::new();
        }

        self.counters.roll(at.date_naive());
        self.counters.failed_updates += 1;
        // The batch never left `pending`.
        self.in_flight.clear();
        self.last_error = Some(error);
        self.phase = SchedulerPhase::CoolingDown;
        vec![ReconcileAction::ArmTimer(self.settings.retry_delay)]
    }

    fn start_update(&mut self, retry: bool) -> Vec<ReconcileAction> {
        let batch: Vec<String> = self.pending.iter().cloned().collect();
        self.in_flight = batch.clone();
        self.retry_round = retry;
        self.follow_up_forced = false;
        self.phase = SchedulerPhase::Updating;
        vec![ReconcileAction::StartUpdate(batch)]
    }

    fn arm(&mut self, now: Instant) -> Vec<ReconcileAction> {
        self.phase = SchedulerPhase::Armed;
        vec![ReconcileAction::ArmTimer(self.debounce_delay(now))]
    }

    /// Remaining part of the minimum interval since the last success.
    fn debounce_delay(&self, now: Instant) -> Duration {
        match self.last_success {
            Some(at) => self
                .settings
                .min_delay
                .saturating_sub(now.saturating_duration_since(at)),
            None => self.settings.min_delay,
        }
    }

    fn over_threshold(&self) -> bool {
        self.pending.len() >= self.settings.max_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SchedulerSettings {
        SchedulerSettings {
            min_delay: Duration::from_secs(30),
            max_pending: 3,
            retry_delay: Duration::from_secs(60),
            credits_per_update: 100,
            extra_addresses: Vec::new(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn wall(d: u32) -> DateTime<Utc> {
        day(d).and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    fn addrs(list: &[&str]) -> ReconcileEvent {
        ReconcileEvent::AddressesAdded(list.iter().map(|s| s.to_string()).collect())
    }

    fn machine() -> ReconcileMachine {
        ReconcileMachine::new(settings(), day(1))
    }

    #[test]
    fn test_first_address_arms_full_debounce() {
        let mut m = machine();
        let now = Instant::now();

        let actions = m.handle(addrs(&["A"]), now);

        assert_eq!(
            actions,
            vec![ReconcileAction::ArmTimer(Duration::from_secs(30))]
        );
        assert_eq!(m.phase(), SchedulerPhase::Armed);
        assert_eq!(m.pending_count(), 1);
    }

    #[test]
    fn test_duplicate_and_blank_addresses_do_not_rearm() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(addrs(&["A"]), now);

        assert!(m.handle(addrs(&["A", " ", ""]), now).is_empty());
        assert_eq!(m.pending_count(), 1);
    }

    #[test]
    fn test_threshold_while_armed_cancels_timer_and_starts() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(addrs(&["A"]), now);
        m.handle(addrs(&["B"]), now);

        let actions = m.handle(addrs(&["C"]), now);

        assert_eq!(
            actions,
            vec![
                ReconcileAction::CancelTimer,
                ReconcileAction::StartUpdate(vec!["A".into(), "B".into(), "C".into()]),
            ]
        );
        assert_eq!(m.phase(), SchedulerPhase::Updating);
        // The batch stays pending until the provider confirms it.
        assert_eq!(m.pending_count(), 3);
    }

    #[test]
    fn test_threshold_from_idle_starts_immediately() {
        let mut m = machine();

        let actions = m.handle(addrs(&["A", "B", "C", "D"]), Instant::now());

        assert!(matches!(
            actions.as_slice(),
            [ReconcileAction::StartUpdate(batch)] if batch.len() == 4
        ));
    }

    #[test]
    fn test_addresses_during_update_only_accumulate() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(ReconcileEvent::ForceRequested, now);

        assert!(m.handle(addrs(&["A", "B", "C", "D", "E"]), now).is_empty());
        assert!(m.handle(ReconcileEvent::TimerElapsed, now).is_empty());
        assert_eq!(m.pending_count(), 5);
        assert!(m.is_updating());
    }

    #[test]
    fn test_failure_restores_batch_and_cools_down() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(addrs(&["A"]), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        m.handle(addrs(&["B"]), now);

        let actions = m.handle(
            ReconcileEvent::CallFailed {
                at: wall(1),
                error: "HTTP 500".into(),
            },
            now,
        );

        assert_eq!(
            actions,
            vec![ReconcileAction::ArmTimer(Duration::from_secs(60))]
        );
        assert_eq!(m.phase(), SchedulerPhase::CoolingDown);
        assert!(m.is_updating());
        assert_eq!(m.pending_count(), 2);

        let stats = m.snapshot(now, wall(1));
        assert_eq!(stats.failed_updates, 1);
        assert_eq!(stats.last_error.as_deref(), Some("HTTP 500"));
        assert_eq!(stats.last_update_time, None);
    }

    #[test]
    fn test_cooldown_retries_once_then_waits_for_next_address() {
        let mut m = machine();
        let now = Instant::now();
        let failed = || ReconcileEvent::CallFailed {
            at: wall(1),
            error: "timeout".into(),
        };
        m.handle(addrs(&["A"]), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        m.handle(failed(), now);

        let retry = m.handle(ReconcileEvent::TimerElapsed, now);
        assert_eq!(retry, vec![ReconcileAction::StartUpdate(vec!["A".into()])]);

        m.handle(failed(), now);
        assert!(m.handle(ReconcileEvent::TimerElapsed, now).is_empty());
        assert_eq!(m.phase(), SchedulerPhase::Idle);
        assert_eq!(m.pending_count(), 1);

        let next = m.handle(addrs(&["B"]), now);
        assert_eq!(
            next,
            vec![ReconcileAction::ArmTimer(Duration::from_secs(30))]
        );
    }

    #[test]
    fn test_every_failed_round_gets_its_retry() {
        let mut m = machine();
        let now = Instant::now();
        let failed = || ReconcileEvent::CallFailed {
            at: wall(1),
            error: "HTTP 503".into(),
        };
        m.handle(addrs(&["A"]), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        m.handle(failed(), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        m.handle(failed(), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        assert_eq!(m.phase(), SchedulerPhase::Idle);

        m.handle(addrs(&["B"]), now);
        let started = m.handle(ReconcileEvent::TimerElapsed, now);
        assert_eq!(
            started,
            vec![ReconcileAction::StartUpdate(vec!["A".into(), "B".into()])]
        );
        m.handle(failed(), now);

        let retry = m.handle(ReconcileEvent::TimerElapsed, now);
        assert_eq!(
            retry,
            vec![ReconcileAction::StartUpdate(vec!["A".into(), "B".into()])]
        );
        assert_eq!(m.phase(), SchedulerPhase::Updating);
    }

    #[test]
    fn test_pending_count_covers_in_flight_batch() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(addrs(&["A", "B"]), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        assert!(m.is_updating());
        assert_eq!(m.pending_count(), 2);

        m.handle(addrs(&["B", "C"]), now);
        assert_eq!(m.pending_count(), 3);

        m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            now,
        );
        assert_eq!(m.pending_count(), 1);
        let stats = m.snapshot(now, wall(1));
        assert_eq!(stats.total_new_owners, 2);
        assert_eq!(stats.state, SchedulerPhase::Armed);
    }

    #[test]
    fn test_success_with_leftovers_rearms_min_delay() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(addrs(&["A"]), now);
        m.handle(ReconcileEvent::TimerElapsed, now);
        m.handle(addrs(&["B"]), now);

        let actions = m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            now,
        );

        assert_eq!(
            actions,
            vec![ReconcileAction::ArmTimer(Duration::from_secs(30))]
        );
        let stats = m.snapshot(now, wall(1));
        assert_eq!(stats.total_updates, 1);
        assert_eq!(stats.total_new_owners, 1);
        assert_eq!(stats.credits_used, 100);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.last_update_time, Some(wall(1)));
    }

    #[test]
    fn test_debounce_shrinks_with_time_since_last_success() {
        let mut m = machine();
        let start = Instant::now();
        m.handle(ReconcileEvent::ForceRequested, start);
        m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            start,
        );

        let actions = m.handle(addrs(&["A"]), start + Duration::from_secs(20));
        assert_eq!(
            actions,
            vec![ReconcileAction::ArmTimer(Duration::from_secs(10))]
        );

        let mut late = machine();
        late.handle(ReconcileEvent::ForceRequested, start);
        late.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            start,
        );
        let actions = late.handle(addrs(&["A"]), start + Duration::from_secs(300));
        assert_eq!(actions, vec![ReconcileAction::ArmTimer(Duration::ZERO)]);
    }

    #[test]
    fn test_unchanged_list_is_not_charged() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(ReconcileEvent::ForceRequested, now);
        m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: false,
            },
            now,
        );

        let stats = m.snapshot(now, wall(1));
        assert_eq!(stats.total_updates, 0);
        assert_eq!(stats.credits_used, 0);
        assert_eq!(stats.state, SchedulerPhase::Idle);
    }

    #[test]
    fn test_force_during_update_runs_follow_up() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(ReconcileEvent::ForceRequested, now);
        assert!(m.handle(ReconcileEvent::ForceRequested, now).is_empty());

        let actions = m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            now,
        );
        assert_eq!(actions, vec![ReconcileAction::StartUpdate(Vec::new())]);
    }

    #[test]
    fn test_daily_counters_roll_over() {
        let mut m = machine();
        let now = Instant::now();
        m.handle(ReconcileEvent::ForceRequested, now);
        m.handle(
            ReconcileEvent::CallSucceeded {
                at: wall(1),
                replaced: true,
            },
            now,
        );
        assert_eq!(m.snapshot(now, wall(1)).credits_used, 100);

        let next_day = m.snapshot(now, wall(2));
        assert_eq!(next_day.credits_used, 0);
        assert_eq!(next_day.total_updates, 0);
        assert_eq!(next_day.counters_date, day(2));
        // Liveness survives the rollover.
        assert_eq!(next_day.last_update_time, Some(wall(1)));
    }

    #[test]
    fn test_outcomes_outside_update_are_ignored() {
        let mut m = machine();
        let now = Instant::now();
        let actions = m.handle(
            ReconcileEvent::CallFailed {
                at: wall(1),
                error: "late".into(),
            },
            now,
        );
        assert!(actions.is_empty());
        assert_eq!(m.phase(), SchedulerPhase::Idle);
    }
}
