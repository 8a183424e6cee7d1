use chrono::{DateTime, NaiveDate, Utc};
use orbit_common::{AppBreakdownEntry, DailyUsageRecord};
use sqlx::FromRow;

use crate::error::Result;

/// Raw `daily_usage` row. The breakdown stays serialized here; decoding is
/// deferred so a corrupt row can be skipped without failing a whole scan.
#[derive(Debug, Clone, FromRow)]
pub struct DbDailyUsage {
    pub id: i64,
    pub date: NaiveDate,
    pub total_screen_time_ms: i64,
    pub unlock_count: i64,
    pub health_score: i64,
    pub orb_level: i64,
    pub app_breakdown: String, // JSON array
    pub created_at: DateTime<Utc>,
}

impl DbDailyUsage {
    pub fn into_record(self) -> Result<DailyUsageRecord> {
        let app_breakdown: Vec<AppBreakdownEntry> = serde_json::from_str(&self.app_breakdown)?;

        Ok(DailyUsageRecord {
            date: self.date,
            total_screen_time_ms: self.total_screen_time_ms,
            unlock_count: self.unlock_count,
            health_score: self.health_score,
            orb_level: self.orb_level,
            app_breakdown,
            has_data: true,
            created_at: self.created_at,
        })
    }
}
