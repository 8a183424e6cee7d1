//! Live/persisted merge over day-keyed windows.
//!
//! Every query resolves a window of calendar dates, pulls whatever the
//! platform source still knows about those days alongside the persisted
//! history, and merges per date with live data winning over stored rows and
//! zero-fill covering the rest. Results are always complete and renderable;
//! a dead or permission-less source only lowers `has_real_data`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate, TimeZone, Utc};
use orbit_common::{
    days_between, merge_samples, month_window, orb_level, score, week_dates, AppBreakdownEntry,
    DailyUsageRecord,
};
use orbit_db::HistoryStore;
use tokio::time::Duration;
use tracing::debug;

use crate::config::TrackingConfig;
use crate::memoizer::Memoizer;
use crate::results::{CalendarDay, DaySnapshot, WeekSummary};
use crate::source::{InstalledApp, SourceError, SourceResult, UsageRangeSnapshot, UsageSource};

/// Oldest day the platform accessor still answers for. Past this the source
/// deterministically reports nothing, so only the store is consulted.
const LIVE_WINDOW_DAYS: i64 = 28;

const TODAY_TTL: Duration = Duration::from_secs(5 * 60);
const INSTALLED_APPS_TTL: Duration = Duration::from_secs(60 * 60);

/// Read-side row cap for the calendar view.
const CALENDAR_MAX_DAYS: usize = 365;

pub struct Aggregator {
    store: Arc<HistoryStore>,
    source: Arc<dyn UsageSource>,
    tracking: TrackingConfig,
    today_cache: Memoizer<DaySnapshot>,
    apps_cache: Memoizer<Vec<InstalledApp>>,
}

impl Aggregator {
    pub fn new(
        store: Arc<HistoryStore>,
        source: Arc<dyn UsageSource>,
        tracking: TrackingConfig,
    ) -> Self {
        Self {
            store,
            source,
            tracking,
            today_cache: Memoizer::new(),
            apps_cache: Memoizer::new(),
        }
    }

    /// Usage accumulated today so far. Served from cache for five minutes;
    /// degrades to an all-zero snapshot when the source is unavailable.
    pub async fn today(&self) -> DaySnapshot {
        let date = Local::now().date_naive();
        let key = format!("today:{date}");

        self.today_cache
            .get_or_fetch(&key, TODAY_TTL, || self.live_day_snapshot(date))
            .await
            .unwrap_or_else(|e| {
                debug!("No live data for today ({}), serving zeros", e);
                DaySnapshot::empty(date)
            })
    }

    /// The 7-day window ending at `today + offset * 7`. Always exactly seven
    /// days, zero-filled where nothing is known; future days are zero-filled
    /// unconditionally.
    pub async fn week(&self, offset: i32) -> WeekSummary {
        let today = Local::now().date_naive();
        let dates = week_dates(today, offset);
        let days = self.merged_days(&dates, today).await;

        summarize_week(offset, &dates, days)
    }

    /// The calendar month `offset` months from the current one, merged the
    /// same way as [`week`](Self::week). Cardinality is the number of days
    /// in that month regardless of store contents.
    pub async fn month(&self, offset: i32) -> Vec<DailyUsageRecord> {
        let today = Local::now().date_naive();
        let (first, last) = month_window(today, offset);
        let dates = days_between(first, last);

        self.merged_days(&dates, today).await
    }

    /// Persisted history plus zero-filled placeholders for the current
    /// month, ascending, capped at the most recent 365 days.
    pub async fn calendar_data(&self) -> Vec<CalendarDay> {
        let today = Local::now().date_naive();

        let mut by_date: BTreeMap<NaiveDate, CalendarDay> = self
            .store
            .scan_recent(CALENDAR_MAX_DAYS as i64)
            .await
            .into_iter()
            .map(|record| {
                (
                    record.date,
                    CalendarDay {
                        date: record.date,
                        health_score: record.health_score,
                        screen_time_ms: record.total_screen_time_ms,
                        unlock_count: record.unlock_count,
                    },
                )
            })
            .collect();

        let (first, last) = month_window(today, 0);
        for date in days_between(first, last) {
            by_date.entry(date).or_insert(CalendarDay {
                date,
                health_score: 0,
                screen_time_ms: 0,
                unlock_count: 0,
            });
        }

        let mut days: Vec<CalendarDay> = by_date.into_values().collect();
        if days.len() > CALENDAR_MAX_DAYS {
            days = days.split_off(days.len() - CALENDAR_MAX_DAYS);
        }
        days
    }

    /// Installed-app list, cached for an hour. Empty when the source cannot
    /// answer.
    pub async fn installed_apps(&self) -> Vec<InstalledApp> {
        self.apps_cache
            .get_or_fetch("installed_apps", INSTALLED_APPS_TTL, || {
                self.source.fetch_installed_apps()
            })
            .await
            .unwrap_or_else(|e| {
                debug!("Installed app fetch unavailable: {}", e);
                Vec::new()
            })
    }

    async fn live_day_snapshot(&self, date: NaiveDate) -> SourceResult<DaySnapshot> {
        if !self.source.has_permission().await {
            return Err(SourceError::PermissionDenied);
        }

        let (start_ms, end_ms) = day_bounds_ms(date);
        let snapshot = self.source.fetch_range(start_ms, end_ms).await?;
        if !snapshot.has_permission {
            return Err(SourceError::PermissionDenied);
        }

        let breakdown = merge_samples(&snapshot.apps);
        let has_real_data = snapshot.has_usage();

        Ok(DaySnapshot {
            date,
            apps: self.display_filter(&breakdown),
            breakdown,
            total_screen_time_ms: snapshot.total_screen_time_ms.max(0),
            unlock_count: snapshot.unlock_count.max(0),
            has_real_data,
        })
    }

    /// One record per requested date: live data wins, then the persisted
    /// row, then a zero-fill. Scores are recomputed from the merged totals
    /// so a stale stored score can never leak through.
    async fn merged_days(&self, dates: &[NaiveDate], today: NaiveDate) -> Vec<DailyUsageRecord> {
        let Some((&start, &end)) = dates.first().zip(dates.last()) else {
            return Vec::new();
        };

        let (live, persisted) =
            tokio::join!(self.live_days(dates, today), self.store.scan_range(start, end));

        let persisted: HashMap<NaiveDate, DailyUsageRecord> =
            persisted.into_iter().map(|record| (record.date, record)).collect();

        dates
            .iter()
            .map(|&date| {
                if date > today {
                    return DailyUsageRecord::zero_filled(date);
                }
                if let Some(snapshot) = live.get(&date) {
                    return DailyUsageRecord::from_totals(
                        date,
                        snapshot.total_screen_time_ms,
                        snapshot.unlock_count,
                        merge_samples(&snapshot.apps),
                        self.tracking.daily_goal_minutes,
                    );
                }
                if let Some(stored) = persisted.get(&date) {
                    let mut record = stored.clone();
                    record.health_score = score(
                        record.total_screen_time_ms,
                        record.unlock_count,
                        0,
                        self.tracking.daily_goal_minutes,
                    );
                    record.orb_level = orb_level(record.health_score);
                    return record;
                }
                DailyUsageRecord::zero_filled(date)
            })
            .collect()
    }

    /// Per-day live snapshots for the dates the platform window still
    /// covers. Any source failure leaves the affected day out, silently
    /// falling back to the store.
    async fn live_days(
        &self,
        dates: &[NaiveDate],
        today: NaiveDate,
    ) -> HashMap<NaiveDate, UsageRangeSnapshot> {
        let mut live = HashMap::new();

        if !self.source.has_permission().await {
            debug!("Usage source unavailable, serving persisted data only");
            return live;
        }

        for &date in dates {
            if !live_eligible(date, today) {
                continue;
            }

            let (start_ms, end_ms) = day_bounds_ms(date);
            match self.source.fetch_range(start_ms, end_ms).await {
                Ok(snapshot) if snapshot.has_usage() => {
                    live.insert(date, snapshot);
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(date = %date, "Live fetch failed, using history: {}", e);
                }
            }
        }

        live
    }

    fn display_filter(&self, entries: &[AppBreakdownEntry]) -> Vec<AppBreakdownEntry> {
        entries
            .iter()
            .filter(|entry| {
                entry.package_name != self.tracking.host_package
                    && entry.duration_ms >= self.tracking.min_display_duration_ms
            })
            .cloned()
            .collect()
    }
}

fn summarize_week(offset: i32, dates: &[NaiveDate], days: Vec<DailyUsageRecord>) -> WeekSummary {
    let total_ms: i64 = days.iter().map(|d| d.total_screen_time_ms).sum();
    let total_hours = total_ms as f64 / 3_600_000.0;

    // A week with a single real day averages over that day, not over seven.
    let days_with_data = days.iter().filter(|d| d.has_data).count().max(1);
    let daily_average_hours = total_hours / days_with_data as f64;

    let total_unlocks = days.iter().map(|d| d.unlock_count).sum();
    let peak_day = days
        .iter()
        .filter(|d| d.has_data)
        .max_by_key(|d| d.total_screen_time_ms)
        .map(|d| d.date);
    let has_real_data = days.iter().any(|d| d.has_data);

    let start_date = dates.first().copied().unwrap_or_default();
    let end_date = dates.last().copied().unwrap_or_default();

    WeekSummary {
        offset,
        start_date,
        end_date,
        days,
        total_hours,
        daily_average_hours,
        total_unlocks,
        peak_day,
        has_real_data,
    }
}

fn live_eligible(date: NaiveDate, today: NaiveDate) -> bool {
    date <= today && (today - date).num_days() < LIVE_WINDOW_DAYS
}

/// Local-midnight bounds of a calendar day in epoch milliseconds.
fn day_bounds_ms(date: NaiveDate) -> (i64, i64) {
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    (local_midnight_ms(date), local_midnight_ms(next))
}

fn local_midnight_ms(date: NaiveDate) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight).timestamp_millis())
}
