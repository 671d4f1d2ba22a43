//! Dashboard data loading.
//!
//! [`fetch_dashboard`] issues the summary, transactions and analytics reads
//! concurrently and retries transient failures. [`DataManager`] merges each
//! [`LoadResult`] into the last good data so one failed fetch never blanks
//! the parts of the dashboard that did load.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};

use dca_core::error::Result;
use dca_core::models::{
    ClientAnalytics, ClientTransaction, CumulativeSeries, DashboardSummary, TimeRange,
};
use dca_data::client::DashboardSource;
use dca_data::timeline::TimelineAggregator;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Transactions shown on the dashboard.
pub const DEFAULT_TRANSACTIONS_LIMIT: u32 = 10;

/// Maximum number of attempts per fetch.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── LoadResult ────────────────────────────────────────────────────────────────

/// Raw outcome of one concurrent dashboard load.
#[derive(Debug)]
pub struct LoadResult {
    pub time_range: TimeRange,
    pub summary: Result<DashboardSummary>,
    pub transactions: Result<Vec<ClientTransaction>>,
    pub analytics: Result<ClientAnalytics>,
}

/// Fetch all three dashboard resources concurrently.
///
/// Each fetch is retried independently; a failure in one never cancels the
/// others.
pub async fn fetch_dashboard<S>(source: &S, transactions_limit: u32, range: TimeRange) -> LoadResult
where
    S: DashboardSource + ?Sized,
{
    let (summary, transactions, analytics) = tokio::join!(
        fetch_with_retry("summary", || source.summary()),
        fetch_with_retry("transactions", || source.transactions(transactions_limit)),
        fetch_with_retry("analytics", || source.analytics(range)),
    );

    LoadResult {
        time_range: range,
        summary,
        transactions,
        analytics,
    }
}

/// Run `fetch` up to [`MAX_RETRY_ATTEMPTS`] times.
///
/// Only transient errors are retried. Back-off schedule: attempt 1 → 0 ms,
/// attempt 2 → 100 ms, attempt 3 → 200 ms.
pub async fn fetch_with_retry<T, F, Fut>(what: &str, mut fetch: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let sleep_ms = (attempt as u64) * 100;
            tracing::debug!(what, attempt, sleep_ms, "retrying fetch after back-off");
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }

        match fetch().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < MAX_RETRY_ATTEMPTS => {
                tracing::warn!(what, attempt, error = %e, "fetch attempt failed");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// Everything the dashboard view renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    /// Generation token of the load that produced this snapshot.
    pub generation: u64,
    pub time_range: TimeRange,
    pub summary: Option<DashboardSummary>,
    pub transactions: Vec<ClientTransaction>,
    pub analytics: Option<ClientAnalytics>,
    /// Cumulative sats series for the chart.
    pub series: CumulativeSeries,
    /// One `"Failed to load <what>: <reason>"` entry per failed fetch.
    pub errors: Vec<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    /// `true` once at least one load has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Keeps the last good dashboard data across loads.
#[derive(Debug, Default)]
pub struct DataManager {
    current: DashboardSnapshot,
    last_successful_fetch: Option<DateTime<Utc>>,
}

impl DataManager {
    pub fn new() -> Self {
        Self {
            current: DashboardSnapshot {
                series: CumulativeSeries::placeholder(),
                ..Default::default()
            },
            last_successful_fetch: None,
        }
    }

    /// Fetch from `source` and merge the result.
    pub async fn load<S>(
        &mut self,
        source: &S,
        transactions_limit: u32,
        range: TimeRange,
        generation: u64,
    ) -> &DashboardSnapshot
    where
        S: DashboardSource + ?Sized,
    {
        let result = fetch_dashboard(source, transactions_limit, range).await;
        self.apply(result, generation)
    }

    /// Merge `result` into the current data and return the new snapshot.
    ///
    /// Successful fetches replace their part; failed ones keep the previous
    /// value and add an error line. The chart series is rebuilt whenever
    /// analytics arrive.
    pub fn apply(&mut self, result: LoadResult, generation: u64) -> &DashboardSnapshot {
        let mut errors = Vec::new();
        let mut any_ok = false;

        match result.summary {
            Ok(summary) => {
                self.current.summary = Some(summary);
                any_ok = true;
            }
            Err(e) => errors.push(failure("summary", &e)),
        }

        match result.transactions {
            Ok(transactions) => {
                self.current.transactions = transactions;
                any_ok = true;
            }
            Err(e) => errors.push(failure("transactions", &e)),
        }

        match result.analytics {
            Ok(analytics) => {
                self.current.series = TimelineAggregator::aggregate(
                    &analytics.accumulation_timeline,
                    &analytics.cost_basis_history,
                );
                tracing::debug!(points = self.current.series.len(), "chart series rebuilt");
                self.current.analytics = Some(analytics);
                any_ok = true;
            }
            Err(e) => errors.push(failure("analytics", &e)),
        }

        let now = Utc::now();
        if any_ok {
            self.last_successful_fetch = Some(now);
        }
        self.current.generation = generation;
        self.current.time_range = result.time_range;
        self.current.errors = errors;
        self.current.loaded_at = Some(now);
        &self.current
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.current
    }

    pub fn last_successful_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_successful_fetch
    }

    /// First error of the latest load, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.current.errors.first().map(String::as_str)
    }
}

fn failure(what: &str, err: &dca_core::error::DashboardError) -> String {
    tracing::warn!(what, error = %err, "dashboard fetch failed");
    format!("Failed to load {what}: {err}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
