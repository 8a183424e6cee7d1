use std::sync::Arc;

use anyhow::{Context, Result};
use orbit_common::DailyUsageRecord;
use orbit_db::HistoryStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info};

use crate::aggregator::Aggregator;
use crate::backfill::BackfillScheduler;
use crate::comparison::WeekComparisonEngine;
use crate::config::EngineConfig;
use crate::results::{CalendarDay, DaySnapshot, WeekComparisonResult, WeekSummary};
use crate::source::{InstalledApp, UsageSource};

/// Top-level engine object.
///
/// Owns the store, the aggregator, and the background tasks, so teardown is
/// deterministic: `shutdown` signals the tasks, awaits them, and closes the
/// pool instead of leaving timers to die with the process.
pub struct Engine {
    aggregator: Arc<Aggregator>,
    comparison: WeekComparisonEngine,
    store: Arc<HistoryStore>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Engine {
    pub async fn start(config: EngineConfig, source: Arc<dyn UsageSource>) -> Result<Self> {
        let store = Arc::new(HistoryStore::new(config.database_config()));
        store
            .database()
            .pool()
            .await
            .context("Failed to open usage history database")?;

        let aggregator =
            Arc::new(Aggregator::new(Arc::clone(&store), source, config.tracking.clone()));
        let comparison = WeekComparisonEngine::new(Arc::clone(&aggregator));

        let scheduler = Arc::new(BackfillScheduler::new(
            Arc::clone(&aggregator),
            Arc::clone(&store),
            config.tracking.clone(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = vec![
            scheduler.spawn_startup_backfill(
                Duration::from_secs(config.tracking.backfill_delay_secs),
                shutdown_rx.clone(),
            ),
            scheduler.spawn_periodic_save(
                Duration::from_secs(config.tracking.save_interval_secs),
                shutdown_rx,
            ),
        ];

        info!("Usage engine started");

        Ok(Self { aggregator, comparison, store, shutdown_tx, tasks })
    }

    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    pub async fn today(&self) -> DaySnapshot {
        self.aggregator.today().await
    }

    pub async fn week(&self, offset: i32) -> WeekSummary {
        self.aggregator.week(offset).await
    }

    pub async fn month(&self, offset: i32) -> Vec<DailyUsageRecord> {
        self.aggregator.month(offset).await
    }

    pub async fn compare_weeks(&self) -> WeekComparisonResult {
        self.comparison.compare().await
    }

    pub async fn calendar_data(&self) -> Vec<CalendarDay> {
        self.aggregator.calendar_data().await
    }

    pub async fn installed_apps(&self) -> Vec<InstalledApp> {
        self.aggregator.installed_apps().await
    }

    /// Stop the background tasks and close the store. Idempotent writes make
    /// it safe to shut down mid-backfill; in-flight work simply finishes or
    /// is abandoned at its next await point.
    pub async fn shutdown(mut self) {
        if self.shutdown_tx.send(true).is_err() {
            debug!("Background tasks already gone at shutdown");
        }

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if e.is_panic() {
                    error!("Background task panicked during shutdown: {}", e);
                }
            }
        }

        self.store.close().await;
        info!("Usage engine stopped");
    }
}
