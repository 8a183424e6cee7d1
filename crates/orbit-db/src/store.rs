//! Lossy read/write facade over the strict query layer.
//!
//! The aggregation engine renders whatever this store returns, so nothing
//! here propagates an error upward: reads degrade to empty results, writes
//! are dropped and picked up again by the next scheduled save, and a corrupt
//! row is skipped without aborting the scan that found it.

use chrono::NaiveDate;
use orbit_common::DailyUsageRecord;
use tracing::warn;

use crate::connection::{Database, DatabaseConfig};
use crate::models::DbDailyUsage;
use crate::queries::daily_usage::DailyUsageQueries;

pub struct HistoryStore {
    db: Database,
}

impl HistoryStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { db: Database::new(config) }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Persist `record`, overwriting any existing row for its date. Failures
    /// are logged and dropped; the periodic save retries naturally.
    pub async fn upsert(&self, record: &DailyUsageRecord) {
        if let Err(e) = DailyUsageQueries::upsert(&self.db, record).await {
            warn!(date = %record.date, "Dropping daily usage write: {}", e);
        }
    }

    pub async fn get(&self, date: NaiveDate) -> Option<DailyUsageRecord> {
        let row = match DailyUsageQueries::get(&self.db, date).await {
            Ok(row) => row?,
            Err(e) => {
                warn!(date = %date, "Daily usage read failed, treating as absent: {}", e);
                return None;
            }
        };

        decode_row(row)
    }

    /// Ascending records in `[start_date, end_date]`. Missing days are simply
    /// absent here; fixed-cardinality zero-filling is the aggregator's job.
    pub async fn scan_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<DailyUsageRecord> {
        match DailyUsageQueries::scan_range(&self.db, start_date, end_date).await {
            Ok(rows) => rows.into_iter().filter_map(decode_row).collect(),
            Err(e) => {
                warn!("Daily usage range scan failed, returning empty: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn scan_recent(&self, limit: i64) -> Vec<DailyUsageRecord> {
        match DailyUsageQueries::scan_recent(&self.db, limit).await {
            Ok(rows) => rows.into_iter().filter_map(decode_row).collect(),
            Err(e) => {
                warn!("Recent daily usage scan failed, returning empty: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn exists_in_range(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        match DailyUsageQueries::exists_in_range(&self.db, start_date, end_date).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Daily usage existence check failed, assuming empty: {}", e);
                false
            }
        }
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

fn decode_row(row: DbDailyUsage) -> Option<DailyUsageRecord> {
    let date = row.date;
    match row.into_record() {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(date = %date, "Skipping malformed daily usage row: {}", e);
            None
        }
    }
}
