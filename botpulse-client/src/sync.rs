//! Data-sync loop: keeps the dashboard fresh by polling the four REST
//! resources as one batch, on activation and on a fixed interval.
//!
//! One tick = one batch of four concurrent requests, committed all-or-nothing
//! so the displayed collections are always mutually consistent. A failed
//! batch is logged and discarded; the previous snapshot stays on screen.
//! The batch is awaited inside the loop body, so at most one batch is ever
//! in flight; ticks that would overlap are coalesced. A timeframe change
//! supersedes an in-flight batch: the stale future is dropped and a fresh
//! batch for the new scope is issued immediately.

use crate::api::TradingApi;
use crate::error::ClientError;
use crate::types::{ActiveTrades, ClosedTrade, EquityPoint, PerformanceStats, Timeframe};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The four dashboard collections plus refresh bookkeeping.
///
/// Replaced atomically per successful batch; partial updates never happen.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub stats: PerformanceStats,
    pub active_trades: ActiveTrades,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_history: Vec<EquityPoint>,
    /// Scope the collections were fetched under
    pub timeframe: Timeframe,
    /// False until the first batch commits (the loading state)
    pub refreshed: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Refresh ticks that failed since the last successful commit
    pub consecutive_failures: u32,
}

/// One successfully fetched batch, held together until commit.
struct Batch {
    stats: PerformanceStats,
    active_trades: ActiveTrades,
    closed_trades: Vec<ClosedTrade>,
    equity_history: Vec<EquityPoint>,
}

/// Jointly await the four resources; any rejection rejects the batch.
async fn fetch_batch(api: &dyn TradingApi, timeframe: Timeframe) -> Result<Batch, ClientError> {
    let (stats, active_trades, closed_trades, equity_history) = tokio::try_join!(
        api.performance(timeframe),
        api.active_trades(),
        api.closed_trades(timeframe),
        api.equity_history(timeframe),
    )?;

    Ok(Batch {
        stats,
        active_trades,
        closed_trades,
        equity_history,
    })
}

/// Handle to a running sync task.
///
/// Dropping the handle aborts the task, so no timer survives deactivation.
pub struct SyncHandle {
    state: Arc<Mutex<DashboardSnapshot>>,
    timeframe_tx: watch::Sender<Timeframe>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Cheap copy of the current dashboard state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Change the scoping window. A real change forces an immediate full
    /// re-fetch; setting the current value again is a no-op.
    pub fn set_timeframe(&self, timeframe: Timeframe) {
        self.timeframe_tx.send_if_modified(|current| {
            if *current != timeframe {
                *current = timeframe;
                true
            } else {
                false
            }
        });
    }

    /// Currently selected scope.
    pub fn timeframe(&self) -> Timeframe {
        *self.timeframe_tx.borrow()
    }

    /// Stop polling deterministically.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

/// Spawn the sync loop: an immediate batch on activation, then one batch per
/// refresh interval, re-scoped whenever the timeframe changes.
pub fn spawn_data_sync(
    api: Arc<dyn TradingApi>,
    timeframe: Timeframe,
    refresh_interval: Duration,
) -> SyncHandle {
    let state = Arc::new(Mutex::new(DashboardSnapshot {
        timeframe,
        ..Default::default()
    }));
    let (timeframe_tx, timeframe_rx) = watch::channel(timeframe);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(run_sync_loop(
        api,
        Arc::clone(&state),
        timeframe_rx,
        shutdown_rx,
        refresh_interval,
    ));

    SyncHandle {
        state,
        timeframe_tx,
        shutdown_tx,
        task,
    }
}

async fn run_sync_loop(
    api: Arc<dyn TradingApi>,
    state: Arc<Mutex<DashboardSnapshot>>,
    mut timeframe_rx: watch::Receiver<Timeframe>,
    mut shutdown_rx: watch::Receiver<bool>,
    refresh_interval: Duration,
) {
    info!("starting data sync loop, refresh every {:?}", refresh_interval);

    let mut ticker = tokio::time::interval(refresh_interval);
    // Overlapping ticks are coalesced, not queued up
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Timeframe of a batch that must run right now (set after supersession)
    let mut pending: Option<Timeframe> = None;

    loop {
        // Wait for something that warrants a batch: the periodic tick or a
        // timeframe change. The first tick completes immediately, which is
        // the fetch-on-activation.
        let issued = match pending.take() {
            Some(timeframe) => timeframe,
            None => {
                tokio::select! {
                    changed = timeframe_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        // Scope changed: restart the timer phase and fetch now
                        ticker.reset();
                        *timeframe_rx.borrow_and_update()
                    }
                    _ = ticker.tick() => *timeframe_rx.borrow_and_update(),
                    _ = shutdown_rx.changed() => break,
                }
            }
        };

        // Run the batch, racing it against supersession and shutdown. When a
        // timeframe change wins, the in-flight batch future is dropped and
        // its result can never overwrite the newer scope.
        tokio::select! {
            outcome = fetch_batch(api.as_ref(), issued) => match outcome {
                Ok(batch) => {
                    let current = *timeframe_rx.borrow();
                    if current == issued {
                        commit(&state, issued, batch);
                        debug!("dashboard refreshed, timeframe={}", issued);
                    } else {
                        // Tag no longer matches the active scope
                        debug!("discarding superseded batch for timeframe={}", issued);
                        pending = Some(current);
                    }
                }
                Err(e) if e.is_session_terminal() => {
                    info!("session expired, stopping data sync loop");
                    break;
                }
                Err(e) => {
                    warn!("refresh batch failed, keeping previous data: {}", e);
                    record_failure(&state);
                }
            },
            changed = timeframe_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                ticker.reset();
                let superseding = *timeframe_rx.borrow_and_update();
                debug!(
                    "timeframe changed {} -> {}, superseding in-flight batch",
                    issued, superseding
                );
                pending = Some(superseding);
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    info!("data sync loop stopped");
}

/// Replace all four collections atomically.
fn commit(state: &Mutex<DashboardSnapshot>, timeframe: Timeframe, batch: Batch) {
    if let Ok(mut guard) = state.lock() {
        *guard = DashboardSnapshot {
            stats: batch.stats,
            active_trades: batch.active_trades,
            closed_trades: batch.closed_trades,
            equity_history: batch.equity_history,
            timeframe,
            refreshed: true,
            last_refresh: Some(Utc::now()),
            consecutive_failures: 0,
        };
    }
}

fn record_failure(state: &Mutex<DashboardSnapshot>) {
    if let Ok(mut guard) = state.lock() {
        guard.consecutive_failures += 1;
    }
}
