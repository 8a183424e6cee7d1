#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};
use orbit_common::AppUsageSample;
use orbit_engine::{
    InstalledApp, SourceError, SourceResult, TrackingConfig, UsageRangeSnapshot, UsageSource,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn tracking() -> TrackingConfig {
    TrackingConfig {
        daily_goal_minutes: 180,
        host_package: "com.orbit.app".to_string(),
        min_display_duration_ms: 60_000,
        backfill_delay_secs: 0,
        save_interval_secs: 1800,
    }
}

pub fn sample(package: &str, name: &str, ms: i64) -> AppUsageSample {
    AppUsageSample {
        package_name: package.to_string(),
        app_name: name.to_string(),
        time_in_foreground_ms: ms,
        last_used_ms: 0,
    }
}

/// Scriptable in-memory usage source. Day data is keyed by the local date a
/// `fetch_range` call resolves to.
pub struct MockUsageSource {
    permission: AtomicBool,
    failing: AtomicBool,
    days: Mutex<HashMap<NaiveDate, UsageRangeSnapshot>>,
    installed: Mutex<Vec<InstalledApp>>,
    fetch_calls: AtomicUsize,
    installed_calls: AtomicUsize,
}

impl MockUsageSource {
    pub fn new() -> Self {
        Self {
            permission: AtomicBool::new(true),
            failing: AtomicBool::new(false),
            days: Mutex::new(HashMap::new()),
            installed: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            installed_calls: AtomicUsize::new(0),
        }
    }

    pub fn deny_permission(&self) {
        self.permission.store(false, Ordering::SeqCst);
    }

    pub fn fail_all_fetches(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn set_day(&self, date: NaiveDate, total_ms: i64, unlocks: i64, apps: Vec<AppUsageSample>) {
        self.days.lock().unwrap().insert(
            date,
            UsageRangeSnapshot {
                apps,
                total_screen_time_ms: total_ms,
                unlock_count: unlocks,
                has_permission: true,
            },
        );
    }

    pub fn set_installed(&self, apps: Vec<InstalledApp>) {
        *self.installed.lock().unwrap() = apps;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn installed_count(&self) -> usize {
        self.installed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageSource for MockUsageSource {
    async fn has_permission(&self) -> bool {
        self.permission.load(Ordering::SeqCst)
    }

    async fn fetch_range(&self, start_ms: i64, _end_ms: i64) -> SourceResult<UsageRangeSnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Platform("mock transport failure".to_string()));
        }
        if !self.permission.load(Ordering::SeqCst) {
            return Ok(UsageRangeSnapshot::default());
        }

        let date = Local
            .timestamp_millis_opt(start_ms)
            .single()
            .map(|dt| dt.date_naive());

        let snapshot = date
            .and_then(|d| self.days.lock().unwrap().get(&d).cloned())
            .unwrap_or(UsageRangeSnapshot { has_permission: true, ..Default::default() });

        Ok(snapshot)
    }

    async fn fetch_installed_apps(&self) -> SourceResult<Vec<InstalledApp>> {
        self.installed_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Platform("mock transport failure".to_string()));
        }
        if !self.permission.load(Ordering::SeqCst) {
            return Err(SourceError::PermissionDenied);
        }

        Ok(self.installed.lock().unwrap().clone())
    }
}
