use chrono::NaiveDate;
use orbit_common::{AppBreakdownEntry, DailyUsageRecord};
use serde::{Deserialize, Serialize};

/// "Today so far" as served to callers. `apps` is display-filtered (host app
/// and sub-minute entries removed); `breakdown` is the complete merged list
/// the persistence path keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub apps: Vec<AppBreakdownEntry>,
    pub breakdown: Vec<AppBreakdownEntry>,
    pub total_screen_time_ms: i64,
    pub unlock_count: i64,
    pub has_real_data: bool,
}

impl DaySnapshot {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            apps: Vec::new(),
            breakdown: Vec::new(),
            total_screen_time_ms: 0,
            unlock_count: 0,
            has_real_data: false,
        }
    }
}

/// A fixed 7-day window. `days` always has exactly 7 elements, zero-filled
/// where neither the live source nor the store had anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub offset: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailyUsageRecord>,
    pub total_hours: f64,
    pub daily_average_hours: f64,
    pub total_unlocks: i64,
    pub peak_day: Option<NaiveDate>,
    pub has_real_data: bool,
}

/// One cell of the calendar view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub health_score: i64,
    pub screen_time_ms: i64,
    pub unlock_count: i64,
}

/// Current-vs-previous-week deltas. Less screen time this week counts as an
/// improvement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekDelta {
    pub hours_diff: f64,
    pub hours_percent_change: i64,
    pub unlocks_diff: i64,
    pub unlocks_percent_change: i64,
    pub improved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekComparisonResult {
    pub this_week: WeekSummary,
    pub last_week: WeekSummary,
    pub comparison: WeekDelta,
}
