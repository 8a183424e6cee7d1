pub mod score;
pub mod types;
pub mod window;

pub use score::{orb_level, raw_score, score, DEFAULT_DAILY_GOAL_MINUTES};
pub use types::{merge_samples, AppBreakdownEntry, AppUsageSample, DailyUsageRecord};
pub use window::{days_between, month_window, week_dates, week_window};
