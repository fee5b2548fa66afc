//! Scheduler engine — one pass runs the four lifecycle phases in order.
//! Stateless between passes: every pass opens its own store connection.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use meets_core::{DatabaseConfig, Result};

use crate::lifecycle::Phase;
use crate::status::MeetStatus;
use crate::store::{self, MeetStore};

/// Rows transitioned by one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub opened: u64,
    pub closed: u64,
    pub waitlist_closed: u64,
    pub archived: u64,
    pub timestamp: DateTime<Utc>,
}

impl PassSummary {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            opened: 0,
            closed: 0,
            waitlist_closed: 0,
            archived: 0,
            timestamp,
        }
    }

    fn record(&mut self, phase: Phase, count: u64) {
        match phase {
            Phase::Open => self.opened += count,
            Phase::CloseByDate => self.closed += count,
            Phase::CloseByWaitlist => self.waitlist_closed += count,
            Phase::Archive => self.archived += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.opened + self.closed + self.waitlist_closed + self.archived
    }
}

/// Run all phases against an open store at `now`.
///
/// The first failing phase aborts the rest; phases before it stay committed.
pub async fn run_pass_on(store: &mut dyn MeetStore, now: DateTime<Utc>) -> Result<PassSummary> {
    let mut summary = PassSummary::new(now);
    for phase in Phase::ALL {
        let count = store.apply(phase, now).await?;
        tracing::debug!("Phase '{}' → {} meet(s) now {}", phase, count, phase.target());
        summary.record(phase, count);
    }
    Ok(summary)
}

/// The meet lifecycle scheduler.
pub struct LifecycleScheduler {
    database: DatabaseConfig,
}

impl LifecycleScheduler {
    pub fn new(database: DatabaseConfig) -> Self {
        Self { database }
    }

    /// One full pass at the current wall-clock time.
    pub async fn run_scheduler_pass(&self) -> Result<PassSummary> {
        let store = store::connect(&self.database).await?;
        Self::run_with(store, Utc::now()).await
    }

    /// Run a pass on `store` and release it, whatever the outcome.
    ///
    /// A failed release is logged only; the phases it follows are already committed.
    pub async fn run_with(mut store: Box<dyn MeetStore>, now: DateTime<Utc>) -> Result<PassSummary> {
        let result = run_pass_on(store.as_mut(), now).await;
        release(store.as_mut()).await;
        result
    }

    /// Meets per lifecycle state.
    pub async fn status_counts(&self) -> Result<Vec<(MeetStatus, u64)>> {
        let store = store::connect(&self.database).await?;
        Self::status_counts_with(store).await
    }

    /// Read status counts from `store` and release it.
    pub async fn status_counts_with(mut store: Box<dyn MeetStore>) -> Result<Vec<(MeetStatus, u64)>> {
        let result = store.status_counts().await;
        release(store.as_mut()).await;
        result
    }
}

async fn release(store: &mut dyn MeetStore) {
    if let Err(e) = store.close().await {
        tracing::warn!("⚠️ Failed to close store: {e}");
    }
}

/// Run a pass every `interval_secs` until `shutdown` resolves.
/// A failed pass is logged and the next tick starts from scratch.
pub async fn spawn_scheduler<F>(scheduler: LifecycleScheduler, interval_secs: u64, shutdown: F)
where
    F: std::future::Future<Output = ()>,
{
    tracing::info!("⏰ Meet scheduler started (pass every {}s)", interval_secs);

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Meet scheduler stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        match scheduler.run_scheduler_pass().await {
            Ok(summary) if summary.total() > 0 => {
                tracing::info!(
                    opened = summary.opened,
                    closed = summary.closed,
                    waitlist_closed = summary.waitlist_closed,
                    archived = summary.archived,
                    "📣 Scheduler pass applied {} transition(s)",
                    summary.total()
                );
            }
            Ok(_) => tracing::debug!("Scheduler pass: nothing to do"),
            Err(e) if e.is_connection() => {
                tracing::error!("❌ Store unreachable, no phases ran: {e}")
            }
            Err(e) => tracing::error!("❌ Scheduler pass failed: {e}"),
        }
    }
}
