//! Health score derivation.
//!
//! The score is a linear blend of screen-time pressure against the daily
//! goal, unlock frequency, and earned reward minutes, clamped to [0, 100].
//! An unclamped variant exists for trend tracking, where overshoot past the
//! bounds is itself a signal; it is never exposed to callers of the public
//! result types.

/// Fallback when a caller passes a zero or negative goal.
pub const DEFAULT_DAILY_GOAL_MINUTES: i64 = 180;

/// Unlock count at which the unlock penalty saturates.
const UNLOCK_BASELINE: f64 = 150.0;
/// Maximum points the screen-time term subtracts at exactly one goal's worth
/// of usage. The term keeps growing past the goal.
const SCREEN_TIME_WEIGHT: f64 = 40.0;
/// Maximum points the unlock term subtracts.
const UNLOCK_WEIGHT: f64 = 15.0;
/// Points per earned minute, capped at `EARNED_BONUS_CAP`.
const EARNED_BONUS_PER_MINUTE: f64 = 0.5;
const EARNED_BONUS_CAP: f64 = 20.0;

/// Unclamped score. Values above 100 or below 0 are meaningful for internal
/// trend tracking only.
pub fn raw_score(
    total_screen_time_ms: i64,
    unlock_count: i64,
    earned_minutes: i64,
    daily_goal_minutes: i64,
) -> f64 {
    let goal = if daily_goal_minutes > 0 {
        daily_goal_minutes as f64
    } else {
        DEFAULT_DAILY_GOAL_MINUTES as f64
    };

    let screen_time_minutes = total_screen_time_ms.max(0) as f64 / 60_000.0;
    let screen_time_penalty = (screen_time_minutes / goal) * SCREEN_TIME_WEIGHT;

    let unlocks_penalty =
        ((unlock_count.max(0) as f64 / UNLOCK_BASELINE) * UNLOCK_WEIGHT).min(UNLOCK_WEIGHT);

    let earned_bonus =
        (earned_minutes.max(0) as f64 * EARNED_BONUS_PER_MINUTE).min(EARNED_BONUS_CAP);

    100.0 - screen_time_penalty - unlocks_penalty + earned_bonus
}

/// Display score in [0, 100].
pub fn score(
    total_screen_time_ms: i64,
    unlock_count: i64,
    earned_minutes: i64,
    daily_goal_minutes: i64,
) -> i64 {
    raw_score(total_screen_time_ms, unlock_count, earned_minutes, daily_goal_minutes)
        .clamp(0.0, 100.0)
        .round() as i64
}

/// 1-5 discretization of a clamped score for compact UI indicators.
pub fn orb_level(score: i64) -> i64 {
    match score {
        s if s >= 80 => 5,
        s if s >= 60 => 4,
        s if s >= 40 => 3,
        s if s >= 20 => 2,
        _ => 1,
    }
}
