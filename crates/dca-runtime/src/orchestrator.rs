//! Async dashboard orchestrator.
//!
//! Runs dashboard loads in a tokio task, refreshing on an interval and on
//! demand, and sends [`DashboardSnapshot`]s through an `mpsc` channel so the
//! TUI event loop can consume them without any shared mutable state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use dca_core::models::TimeRange;
use dca_data::client::DashboardSource;

use crate::data_manager::{fetch_dashboard, DataManager, DashboardSnapshot, LoadResult};
use crate::generation::LoadGeneration;

// ── Commands ──────────────────────────────────────────────────────────────────

/// Requests from the UI to the running orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Reload now with the current time range.
    Refresh,
    /// Switch the analytics window and reload.
    SetTimeRange(TimeRange),
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background loader for the live dashboard.
///
/// Every load is tagged with a [`LoadGeneration`] token and runs in its own
/// task, so a time-range switch does not wait for an in-flight load. A
/// finished load is applied only if no newer load was issued meanwhile.
/// Interval ticks are skipped while a load is running, so a backend slower
/// than the refresh rate still gets its results shown.
pub struct DashboardOrchestrator {
    source: Arc<dyn DashboardSource>,
    refresh_interval: Duration,
    transactions_limit: u32,
    time_range: TimeRange,
}

impl DashboardOrchestrator {
    /// # Parameters
    /// - `source`               – where dashboard data comes from.
    /// - `refresh_interval_secs` – seconds between automatic reloads.
    /// - `transactions_limit`   – number of recent transactions to fetch.
    /// - `time_range`           – initial analytics window.
    pub fn new(
        source: Arc<dyn DashboardSource>,
        refresh_interval_secs: u64,
        transactions_limit: u32,
        time_range: TimeRange,
    ) -> Self {
        Self {
            source,
            refresh_interval: Duration::from_secs(refresh_interval_secs.max(1)),
            transactions_limit,
            time_range,
        }
    }

    /// Start the loop.
    ///
    /// Returns the snapshot receiver and a [`DashboardHandle`] for sending
    /// commands and stopping the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, DashboardHandle) {
        let (tx, rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.run(tx, cmd_rx).await;
        });

        (
            rx,
            DashboardHandle {
                commands: cmd_tx,
                handle,
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn run(
        mut self,
        tx: mpsc::Sender<DashboardSnapshot>,
        mut commands: mpsc::Receiver<DashboardCommand>,
    ) {
        let generation = LoadGeneration::new();
        let (done_tx, mut done_rx) = mpsc::channel::<(u64, LoadResult)>(8);
        let mut manager = DataManager::new();
        // Token of the newest load still running. Ticks never supersede it;
        // only user commands do.
        let mut in_flight = Some(self.spawn_load(&generation, &done_tx));

        let mut interval = time::interval(self.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; we already started a load.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(token) = in_flight {
                        tracing::debug!(token, "load still running; skipping refresh tick");
                    } else {
                        in_flight = Some(self.spawn_load(&generation, &done_tx));
                    }
                }
                cmd = commands.recv() => match cmd {
                    Some(DashboardCommand::Refresh) => {
                        tracing::debug!("manual refresh requested");
                        in_flight = Some(self.spawn_load(&generation, &done_tx));
                    }
                    Some(DashboardCommand::SetTimeRange(range)) => {
                        tracing::debug!(range = %range, "time range changed");
                        self.time_range = range;
                        in_flight = Some(self.spawn_load(&generation, &done_tx));
                    }
                    None => {
                        tracing::debug!("command channel closed; exiting loop");
                        break;
                    }
                },
                Some((token, result)) = done_rx.recv() => {
                    if in_flight == Some(token) {
                        in_flight = None;
                    }
                    if !generation.is_current(token) {
                        tracing::debug!(token, latest = generation.current(), "discarding stale load");
                        continue;
                    }
                    let snapshot = manager.apply(result, token).clone();
                    if let Err(e) = tx.send(snapshot).await {
                        tracing::warn!(error = %e, "failed to send dashboard snapshot; receiver dropped");
                        break;
                    }
                }
            }

            if tx.is_closed() {
                tracing::debug!("snapshot channel closed; exiting loop");
                break;
            }
        }
    }

    /// Issue a new generation and start its load in a separate task.
    fn spawn_load(&self, generation: &LoadGeneration, done: &mpsc::Sender<(u64, LoadResult)>) -> u64 {
        let token = generation.issue();
        let source = Arc::clone(&self.source);
        let done = done.clone();
        let limit = self.transactions_limit;
        let range = self.time_range;

        tracing::debug!(token, range = %range, "starting dashboard load");
        tokio::spawn(async move {
            let result = fetch_dashboard(source.as_ref(), limit, range).await;
            // The loop may have exited; nothing to do then.
            let _ = done.send((token, result)).await;
        });
        token
    }
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// Handle to the background dashboard task.
pub struct DashboardHandle {
    commands: mpsc::Sender<DashboardCommand>,
    handle: tokio::task::JoinHandle<()>,
}

impl DashboardHandle {
    /// Queue a command without blocking. Returns `false` if the queue is full
    /// or the loop has stopped.
    pub fn send(&self, command: DashboardCommand) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "dropping dashboard command");
                false
            }
        }
    }

    pub fn refresh(&self) -> bool {
        self.send(DashboardCommand::Refresh)
    }

    pub fn set_time_range(&self, range: TimeRange) -> bool {
        self.send(DashboardCommand::SetTimeRange(range))
    }

    /// Immediately abort the loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
