//! Background writers that keep the history durable.
//!
//! The platform accessor only exposes a shallow rolling window of history,
//! so anything not copied into the store in time is lost. Two tasks cover
//! that: a one-shot backfill of the current month shortly after startup, and
//! a recurring save of today's totals. Both go through the same
//! upsert-by-date contract, so replays and overlapping writes converge.

use std::sync::Arc;

use orbit_common::DailyUsageRecord;
use orbit_db::{DailyUsageQueries, HistoryStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::config::TrackingConfig;

pub struct BackfillScheduler {
    aggregator: Arc<Aggregator>,
    store: Arc<HistoryStore>,
    tracking: TrackingConfig,
}

impl BackfillScheduler {
    pub fn new(
        aggregator: Arc<Aggregator>,
        store: Arc<HistoryStore>,
        tracking: TrackingConfig,
    ) -> Self {
        Self { aggregator, store, tracking }
    }

    /// One backfill pass: pull the current month and persist every day that
    /// actually saw usage. Failures are per-day; one bad day never aborts
    /// the rest of the loop.
    pub async fn backfill_current_month(&self) {
        let days = self.aggregator.month(0).await;

        let mut saved = 0usize;
        for day in days {
            if !day.has_data || day.total_screen_time_ms <= 0 {
                continue;
            }

            match DailyUsageQueries::upsert(self.store.database(), &day).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!(date = %day.date, "Backfill write failed for one day, continuing: {}", e);
                }
            }
        }

        info!(saved, "Monthly backfill pass complete");
    }

    /// One save pass: persist today's snapshot if it carries real data.
    pub async fn save_today(&self) {
        let snapshot = self.aggregator.today().await;
        if !snapshot.has_real_data {
            debug!("No usage recorded for today yet, skipping save");
            return;
        }

        let record = DailyUsageRecord::from_totals(
            snapshot.date,
            snapshot.total_screen_time_ms,
            snapshot.unlock_count,
            snapshot.breakdown.clone(),
            self.tracking.daily_goal_minutes,
        );

        self.store.upsert(&record).await;
        debug!(date = %record.date, score = record.health_score, "Saved today's usage");
    }

    /// Fire the one-shot backfill after `delay`, unless shutdown wins first.
    /// The delay keeps it out of the way of the first interactive queries.
    pub fn spawn_startup_backfill(
        self: &Arc<Self>,
        delay: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.changed() => {
                    debug!("Startup backfill cancelled before running");
                    return;
                }
            }

            scheduler.backfill_current_month().await;
        })
    }

    /// Run `save_today` immediately and then on every interval tick until
    /// shutdown.
    pub fn spawn_periodic_save(
        self: &Arc<Self>,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            let mut timer = interval(every);

            loop {
                tokio::select! {
                    _ = timer.tick() => scheduler.save_today().await,
                    _ = shutdown.changed() => {
                        info!("Periodic save task stopped");
                        return;
                    }
                }
            }
        })
    }
}
