use std::collections::BTreeSet;
use std::future;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use super::state_machine::{ReconcileAction, ReconcileEvent, ReconcileMachine};
use super::watchlist_errors::WatchlistError;
use super::watchlist_model::{ReconcileOutcome, SchedulerSettings, WatchlistStats};
use super::watchlist_traits::{NewOwnerSink, WatchlistProviderTrait};
use crate::errors::Result;
use crate::ownership::OwnershipRepositoryTrait;

enum SchedulerCommand {
    AddOwners(Vec<String>),
    ForceSync,
    Stats(oneshot::Sender<WatchlistStats>),
}

/// Handle to the watch-list reconciliation task.
///
/// Cloning is cheap; all clones feed the same task. The task stops once every
/// handle is dropped. An update already in flight at that point still runs to
/// completion.
#[derive(Clone)]
pub struct WatchlistScheduler {
    commands: mpsc::UnboundedSender<SchedulerCommand>,
}

impl WatchlistScheduler {
    /// Spawns the scheduler task. Must be called from within a tokio runtime.
    pub fn spawn(
        settings: SchedulerSettings,
        ownership_repository: Arc<dyn OwnershipRepositoryTrait>,
        provider: Arc<dyn WatchlistProviderTrait>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        let actor = SchedulerActor {
            extra_addresses: settings.extra_addresses.clone(),
            machine: ReconcileMachine::new(settings, Utc::now().date_naive()),
            ownership_repository,
            provider,
            outcomes: outcomes_tx,
            deadline: None,
        };
        tokio::spawn(actor.run(commands_rx, outcomes_rx));

        Self {
            commands: commands_tx,
        }
    }

    /// Queues addresses for the next update. Never blocks.
    pub fn add_new_owners(&self, addresses: Vec<String>) {
        if addresses.is_empty() {
            return;
        }
        if self
            .commands
            .send(SchedulerCommand::AddOwners(addresses))
            .is_err()
        {
            warn!("Watch-list scheduler stopped; dropping new owners");
        }
    }

    /// Requests an update now, regardless of debounce and threshold.
    pub fn request_sync(&self) {
        if self.commands.send(SchedulerCommand::ForceSync).is_err() {
            warn!("Watch-list scheduler stopped; sync request dropped");
        }
    }

    pub async fn stats(&self) -> Result<WatchlistStats> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SchedulerCommand::Stats(reply_tx))
            .map_err(|_| WatchlistError::SchedulerStopped)?;
        Ok(reply_rx
            .await
            .map_err(|_| WatchlistError::SchedulerStopped)?)
    }
}

impl NewOwnerSink for WatchlistScheduler {
    fn add_new_owners(&self, addresses: Vec<String>) {
        WatchlistScheduler::add_new_owners(self, addresses);
    }
}

struct SchedulerActor {
    machine: ReconcileMachine,
    ownership_repository: Arc<dyn OwnershipRepositoryTrait>,
    provider: Arc<dyn WatchlistProviderTrait>,
    extra_addresses: Vec<String>,
    outcomes: mpsc::UnboundedSender<Result<ReconcileOutcome>>,
    deadline: Option<Instant>,
}

impl SchedulerActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SchedulerCommand>,
        mut outcomes: mpsc::UnboundedReceiver<Result<ReconcileOutcome>>,
    ) {
        info!("Watch-list scheduler started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(outcome) = outcomes.recv() => self.on_outcome(outcome),
                _ = wait_until(self.deadline) => {
                    self.deadline = None;
                    self.dispatch(ReconcileEvent::TimerElapsed);
                }
            }
        }
        info!("Watch-list scheduler stopped");
    }

    fn on_command(&mut self, command: SchedulerCommand) {
        match command {
            SchedulerCommand::AddOwners(addresses) => {
                debug!("Queued {} new owner(s) for watch-list", addresses.len());
                self.dispatch(ReconcileEvent::AddressesAdded(addresses));
            }
            SchedulerCommand::ForceSync => {
                info!("Forced watch-list sync requested");
                self.dispatch(ReconcileEvent::ForceRequested);
            }
            SchedulerCommand::Stats(reply) => {
                let _ = reply.send(self.machine.snapshot(Instant::now(), Utc::now()));
            }
        }
    }

    fn on_outcome(&mut self, outcome: Result<ReconcileOutcome>) {
        let event = match outcome {
            Ok(outcome) => {
                if outcome.replaced {
                    info!(
                        "Watch-list updated with {} address(es)",
                        outcome.address_count
                    );
                } else {
                    info!(
                        "Watch-list already up to date ({} address(es)); no update sent",
                        outcome.address_count
                    );
                }
                ReconcileEvent::CallSucceeded {
                    at: Utc::now(),
                    replaced: outcome.replaced,
                }
            }
            Err(e) => {
                error!("Watch-list update failed: {}", e);
                ReconcileEvent::CallFailed {
                    at: Utc::now(),
                    error: e.to_string(),
                }
            }
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: ReconcileEvent) {
        let now = Instant::now();
        for action in self.machine.handle(event, now) {
            match action {
                ReconcileAction::ArmTimer(delay) => self.deadline = Some(now + delay),
                ReconcileAction::CancelTimer => self.deadline = None,
                ReconcileAction::StartUpdate(batch) => self.start_update(batch),
            }
        }
    }

    fn start_update(&self, batch: Vec<String>) {
        debug!("Starting watch-list update with {} new owner(s)", batch.len());
        let ownership_repository = Arc::clone(&self.ownership_repository);
        let provider = Arc::clone(&self.provider);
        let extra_addresses = self.extra_addresses.clone();
        let outcomes = self.outcomes.clone();

        tokio::spawn(async move {
            let outcome = reconcile_watchlist(
                ownership_repository.as_ref(),
                provider.as_ref(),
                &extra_addresses,
                &batch,
            )
            .await;
            let _ = outcomes.send(outcome);
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

/// Pushes the full desired watch-list to the provider.
///
/// The desired list is every distinct ledger holder plus `batch` plus
/// `extra_addresses`. When the provider already watches exactly that set the
/// replace call is skipped.
pub async fn reconcile_watchlist(
    ownership_repository: &dyn OwnershipRepositoryTrait,
    provider: &dyn WatchlistProviderTrait,
    extra_addresses: &[String],
    batch: &[String],
) -> Result<ReconcileOutcome> {
    let mut desired: BTreeSet<String> = ownership_repository
        .list_distinct_owner_wallets()?
        .into_iter()
        .collect();
    desired.extend(batch.iter().cloned());
    desired.extend(extra_addresses.iter().cloned());

    let addresses: Vec<String> = desired.into_iter().collect();
    let replaced = provider.sync_watched_addresses(&addresses).await?;
    Ok(ReconcileOutcome {
        replaced,
        address_count: addresses.len(),
    })
}
