use async_trait::async_trait;
use orbit_common::AppUsageSample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("usage access permission not granted")]
    PermissionDenied,

    #[error("platform accessor error: {0}")]
    Platform(String),
}

/// What the platform accessor reports for one time range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageRangeSnapshot {
    pub apps: Vec<AppUsageSample>,
    pub total_screen_time_ms: i64,
    pub unlock_count: i64,
    pub has_permission: bool,
}

impl UsageRangeSnapshot {
    /// True when the range carries real usage, not just an empty answer.
    pub fn has_usage(&self) -> bool {
        self.has_permission && (self.total_screen_time_ms > 0 || self.unlock_count > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub package_name: String,
    pub app_name: String,
    pub icon_ref: Option<String>,
}

/// Capability-checked access to the platform usage accessor.
///
/// Implementations are permission-gated and may stop answering at any time.
/// Callers branch on availability explicitly; both a denied permission and a
/// transport failure mean "no live data", never a fatal error.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn has_permission(&self) -> bool;

    /// Per-app foreground samples plus day totals for `[start_ms, end_ms)`
    /// in epoch milliseconds.
    async fn fetch_range(&self, start_ms: i64, end_ms: i64) -> SourceResult<UsageRangeSnapshot>;

    async fn fetch_installed_apps(&self) -> SourceResult<Vec<InstalledApp>>;
}

/// Source for platforms without a usage accessor. Always unavailable, so the
/// engine runs in persisted-only mode.
pub struct NoopUsageSource;

#[async_trait]
impl UsageSource for NoopUsageSource {
    async fn has_permission(&self) -> bool {
        false
    }

    async fn fetch_range(&self, _start_ms: i64, _end_ms: i64) -> SourceResult<UsageRangeSnapshot> {
        Err(SourceError::PermissionDenied)
    }

    async fn fetch_installed_apps(&self) -> SourceResult<Vec<InstalledApp>> {
        Err(SourceError::PermissionDenied)
    }
}
