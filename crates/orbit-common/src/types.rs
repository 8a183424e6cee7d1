use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::score;

/// One app's share of a day's foreground time. `package_name` is unique
/// within a breakdown list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBreakdownEntry {
    pub package_name: String,
    pub app_name: String,
    pub duration_ms: i64,
}

/// Raw per-app foreground sample as reported by the platform accessor.
/// Transient: samples are merged into an [`AppBreakdownEntry`] list before
/// anything is persisted or exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageSample {
    pub package_name: String,
    pub app_name: String,
    pub time_in_foreground_ms: i64,
    pub last_used_ms: i64,
}

/// Sum samples by package. The platform may report several samples for the
/// same package within one range; they are added, never duplicated. The
/// result is ordered by descending foreground time.
pub fn merge_samples(samples: &[AppUsageSample]) -> Vec<AppBreakdownEntry> {
    let mut by_package: HashMap<&str, AppBreakdownEntry> = HashMap::new();

    for sample in samples {
        by_package
            .entry(sample.package_name.as_str())
            .and_modify(|entry| entry.duration_ms += sample.time_in_foreground_ms.max(0))
            .or_insert_with(|| AppBreakdownEntry {
                package_name: sample.package_name.clone(),
                app_name: sample.app_name.clone(),
                duration_ms: sample.time_in_foreground_ms.max(0),
            });
    }

    let mut merged: Vec<AppBreakdownEntry> = by_package.into_values().collect();
    merged.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
    merged
}

/// One calendar day of aggregated usage, keyed by local date.
///
/// This is both the persisted row shape (breakdown serialized to JSON) and
/// the per-day element of week/month results. `has_data` distinguishes a real
/// record from a zero-filled placeholder; it is derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsageRecord {
    pub date: NaiveDate,
    pub total_screen_time_ms: i64,
    pub unlock_count: i64,
    pub health_score: i64,
    pub orb_level: i64,
    pub app_breakdown: Vec<AppBreakdownEntry>,
    pub has_data: bool,
    pub created_at: DateTime<Utc>,
}

impl DailyUsageRecord {
    /// Build a record from raw day totals, deriving score and orb level.
    pub fn from_totals(
        date: NaiveDate,
        total_screen_time_ms: i64,
        unlock_count: i64,
        app_breakdown: Vec<AppBreakdownEntry>,
        daily_goal_minutes: i64,
    ) -> Self {
        let health_score =
            score::score(total_screen_time_ms, unlock_count, 0, daily_goal_minutes);
        Self {
            date,
            total_screen_time_ms: total_screen_time_ms.max(0),
            unlock_count: unlock_count.max(0),
            health_score,
            orb_level: score::orb_level(health_score),
            app_breakdown,
            has_data: true,
            created_at: Utc::now(),
        }
    }

    /// An absent day: all-zero metrics, `has_data = false`. Never persisted;
    /// only used to pad fixed-cardinality window results.
    pub fn zero_filled(date: NaiveDate) -> Self {
        Self {
            date,
            total_screen_time_ms: 0,
            unlock_count: 0,
            health_score: 0,
            orb_level: 1,
            app_breakdown: Vec::new(),
            has_data: false,
            created_at: Utc::now(),
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.total_screen_time_ms as f64 / 3_600_000.0
    }
}
