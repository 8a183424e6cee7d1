use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::results::{WeekComparisonResult, WeekDelta, WeekSummary};

/// Current-vs-previous-week comparison on top of the aggregator.
///
/// Both underlying week queries are total (they degrade to zero-filled
/// summaries instead of failing), so the comparison always yields a
/// renderable shape; an empty history simply produces zero deltas.
pub struct WeekComparisonEngine {
    aggregator: Arc<Aggregator>,
}

impl WeekComparisonEngine {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }

    pub async fn compare(&self) -> WeekComparisonResult {
        let (this_week, last_week) =
            tokio::join!(self.aggregator.week(0), self.aggregator.week(-1));

        let comparison = delta(&this_week, &last_week);

        WeekComparisonResult { this_week, last_week, comparison }
    }
}

fn delta(this_week: &WeekSummary, last_week: &WeekSummary) -> WeekDelta {
    let hours_diff = this_week.total_hours - last_week.total_hours;
    let hours_percent_change = if last_week.total_hours > 0.0 {
        (hours_diff / last_week.total_hours * 100.0).round() as i64
    } else {
        0
    };

    let unlocks_diff = this_week.total_unlocks - last_week.total_unlocks;
    let unlocks_percent_change = if last_week.total_unlocks > 0 {
        (unlocks_diff as f64 / last_week.total_unlocks as f64 * 100.0).round() as i64
    } else {
        0
    };

    WeekDelta {
        hours_diff,
        hours_percent_change,
        unlocks_diff,
        unlocks_percent_change,
        improved: hours_diff < 0.0,
    }
}
