pub mod aggregator;
pub mod backfill;
pub mod comparison;
pub mod config;
pub mod engine;
pub mod memoizer;
pub mod results;
pub mod source;

pub use aggregator::Aggregator;
pub use backfill::BackfillScheduler;
pub use comparison::WeekComparisonEngine;
pub use config::{EngineConfig, TrackingConfig};
pub use engine::Engine;
pub use memoizer::Memoizer;
pub use results::{CalendarDay, DaySnapshot, WeekComparisonResult, WeekDelta, WeekSummary};
pub use source::{
    InstalledApp, NoopUsageSource, SourceError, SourceResult, UsageRangeSnapshot, UsageSource,
};
