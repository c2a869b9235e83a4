//! Periodic background reconciliation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Reconciler;
use crate::db::KeyValueStore;
use crate::remote::RemoteStore;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

struct Running {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Runs [`Reconciler::run_all`] once on start and then every `period`.
///
/// Ticks that fall due while a run is still going are delayed rather than
/// replayed in a burst.
pub struct SyncScheduler<S, R> {
    reconciler: Arc<Reconciler<S, R>>,
    period: Duration,
    running: Mutex<Option<Running>>,
}

impl<S: KeyValueStore, R: RemoteStore> SyncScheduler<S, R> {
    pub fn new(reconciler: Arc<Reconciler<S, R>>, period: Duration) -> Self {
        Self {
            reconciler,
            period,
            running: Mutex::new(None),
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the periodic task. Returns `false` when it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_periodically(
            Arc::clone(&self.reconciler),
            self.period,
            shutdown_rx,
        ));
        *running = Some(Running { shutdown, handle });
        tracing::info!("Sync scheduler started (every {:?})", self.period);
        true
    }

    /// Signal the periodic task to finish and wait for it.
    ///
    /// A run already in progress completes first. Calling `stop` on a stopped
    /// scheduler does nothing.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(Running { shutdown, handle }) = running else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(error) = handle.await {
            tracing::warn!("Sync scheduler task ended abnormally: {}", error);
        }
        tracing::info!("Sync scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

async fn run_periodically<S: KeyValueStore, R: RemoteStore>(
    reconciler: Arc<Reconciler<S, R>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => match reconciler.run_all().await {
                Ok(reports) => {
                    for report in reports.iter().filter(|report| report.attempted > 0) {
                        tracing::debug!(
                            "Scheduled sync of {}: {} synced, {} remaining",
                            report.collection,
                            report.synced,
                            report.remaining
                        );
                    }
                }
                Err(error) => tracing::warn!("Scheduled sync failed: {}", error),
            },
        }
    }
}
