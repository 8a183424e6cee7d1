use chrono::{NaiveDate, Utc};
use orbit_common::DailyUsageRecord;

use crate::connection::Database;
use crate::error::{DbError, Result};
use crate::models::DbDailyUsage;

pub struct DailyUsageQueries;

impl DailyUsageQueries {
    /// Write-or-overwrite the row for `record.date`. The conflict clause
    /// makes the write atomic per row: a replayed or concurrent upsert for
    /// the same date converges on the last writer's values.
    pub async fn upsert(db: &Database, record: &DailyUsageRecord) -> Result<()> {
        let pool = db.pool().await?;

        let breakdown = serde_json::to_string(&record.app_breakdown)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO daily_usage (
                date, total_screen_time_ms, unlock_count, health_score, orb_level,
                app_breakdown, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                total_screen_time_ms = excluded.total_screen_time_ms,
                unlock_count = excluded.unlock_count,
                health_score = excluded.health_score,
                orb_level = excluded.orb_level,
                app_breakdown = excluded.app_breakdown,
                created_at = excluded.created_at
            "#,
        )
        .bind(record.date)
        .bind(record.total_screen_time_ms)
        .bind(record.unlock_count)
        .bind(record.health_score)
        .bind(record.orb_level)
        .bind(&breakdown)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn get(db: &Database, date: NaiveDate) -> Result<Option<DbDailyUsage>> {
        let pool = db.pool().await?;

        sqlx::query_as::<_, DbDailyUsage>("SELECT * FROM daily_usage WHERE date = ?")
            .bind(date)
            .fetch_optional(pool)
            .await
            .map_err(DbError::Sqlx)
    }

    pub async fn scan_range(
        db: &Database,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DbDailyUsage>> {
        let pool = db.pool().await?;

        sqlx::query_as::<_, DbDailyUsage>(
            "SELECT * FROM daily_usage WHERE date >= ? AND date <= ? ORDER BY date ASC",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }

    pub async fn scan_recent(db: &Database, limit: i64) -> Result<Vec<DbDailyUsage>> {
        let pool = db.pool().await?;

        sqlx::query_as::<_, DbDailyUsage>(
            "SELECT * FROM daily_usage ORDER BY date DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(DbError::Sqlx)
    }

    pub async fn exists_in_range(
        db: &Database,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<bool> {
        let pool = db.pool().await?;

        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM daily_usage WHERE date >= ? AND date <= ?)",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(pool)
        .await?;

        Ok(exists != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DatabaseConfig;
    use orbit_common::AppBreakdownEntry;
    use tempfile::tempdir;

    async fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::new(DatabaseConfig {
            path: dir.path().join("test.db").to_str().unwrap().to_string(),
        });
        db.pool().await.unwrap();
        (db, dir)
    }

    fn record(date: NaiveDate, screen_ms: i64, unlocks: i64) -> DailyUsageRecord {
        DailyUsageRecord::from_totals(date, screen_ms, unlocks, Vec::new(), 180)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let (db, _dir) = setup_test_db().await;

        let day = date(2024, 1, 15);
        let mut rec = record(day, 3_600_000, 25);
        rec.app_breakdown = vec![AppBreakdownEntry {
            package_name: "com.example.browser".to_string(),
            app_name: "Browser".to_string(),
            duration_ms: 3_600_000,
        }];

        DailyUsageQueries::upsert(&db, &rec).await.unwrap();

        let row = DailyUsageQueries::get(&db, day).await.unwrap().unwrap();
        assert_eq!(row.total_screen_time_ms, 3_600_000);
        assert_eq!(row.unlock_count, 25);

        let stored = row.into_record().unwrap();
        assert_eq!(stored.app_breakdown.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_date() {
        let (db, _dir) = setup_test_db().await;

        let day = date(2024, 1, 15);
        DailyUsageQueries::upsert(&db, &record(day, 1_000_000, 5)).await.unwrap();
        DailyUsageQueries::upsert(&db, &record(day, 7_200_000, 90)).await.unwrap();

        let rows = DailyUsageQueries::scan_range(&db, day, day).await.unwrap();
        assert_eq!(rows.len(), 1, "upsert must never duplicate a date");
        assert_eq!(rows[0].total_screen_time_ms, 7_200_000);
        assert_eq!(rows[0].unlock_count, 90);
    }

    #[tokio::test]
    async fn test_get_missing_date_is_none() {
        let (db, _dir) = setup_test_db().await;

        let row = DailyUsageQueries::get(&db, date(2024, 1, 15)).await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_scan_range_is_ascending_and_bounded() {
        let (db, _dir) = setup_test_db().await;

        for day in [date(2024, 1, 17), date(2024, 1, 15), date(2024, 1, 16), date(2024, 1, 20)] {
            DailyUsageQueries::upsert(&db, &record(day, 1_000_000, 1)).await.unwrap();
        }

        let rows =
            DailyUsageQueries::scan_range(&db, date(2024, 1, 15), date(2024, 1, 17)).await.unwrap();

        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 15), date(2024, 1, 16), date(2024, 1, 17)]);
    }

    #[tokio::test]
    async fn test_scan_recent_is_descending_and_limited() {
        let (db, _dir) = setup_test_db().await;

        for d in 1..=5 {
            DailyUsageQueries::upsert(&db, &record(date(2024, 1, d), 1_000_000, 1)).await.unwrap();
        }

        let rows = DailyUsageQueries::scan_recent(&db, 3).await.unwrap();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 5), date(2024, 1, 4), date(2024, 1, 3)]);
    }

    #[tokio::test]
    async fn test_exists_in_range() {
        let (db, _dir) = setup_test_db().await;

        assert!(!DailyUsageQueries::exists_in_range(&db, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap());

        DailyUsageQueries::upsert(&db, &record(date(2024, 1, 15), 1_000_000, 1)).await.unwrap();

        assert!(DailyUsageQueries::exists_in_range(&db, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap());
        assert!(!DailyUsageQueries::exists_in_range(&db, date(2024, 2, 1), date(2024, 2, 28))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_reads_succeed_on_empty_store() {
        let (db, _dir) = setup_test_db().await;

        let rows =
            DailyUsageQueries::scan_range(&db, date(2024, 1, 1), date(2024, 12, 31)).await.unwrap();
        assert!(rows.is_empty());

        let recent = DailyUsageQueries::scan_recent(&db, 10).await.unwrap();
        assert!(recent.is_empty());
    }
}
