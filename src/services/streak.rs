use chrono::{DateTime, Utc};

/// Hours since the last check-in that keep a streak alive.
pub const CONTINUE_AFTER_HOURS: i64 = 24;
/// Hours after which the streak is considered broken.
pub const RESET_AFTER_HOURS: i64 = 48;

pub const WEEKLY_MILESTONE_COINS: i64 = 100;
pub const MONTHLY_MILESTONE_COINS: i64 = 500;

/// Transition derived on each evaluation; never stored. Evaluation is lazy,
/// so a user who never comes back keeps their stale streak value in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    NoOp,
    Continue,
    Reset,
}

/// Classify the wall-clock delta since the last streak update.
pub fn evaluate(last_update: DateTime<Utc>, now: DateTime<Utc>) -> StreakTransition {
    let elapsed_hours = (now - last_update).num_hours();

    if elapsed_hours < CONTINUE_AFTER_HOURS {
        StreakTransition::NoOp
    } else if elapsed_hours < RESET_AFTER_HOURS {
        StreakTransition::Continue
    } else {
        StreakTransition::Reset
    }
}

pub fn apply(current_streak: i32, transition: StreakTransition) -> i32 {
    match transition {
        StreakTransition::NoOp => current_streak,
        StreakTransition::Continue => current_streak + 1,
        StreakTransition::Reset => 1,
    }
}

/// Coins granted when a streak reaches a milestone day. Every 7th
/// consecutive day pays 100, every 30th pays 500; a day divisible by both
/// pays both.
pub fn milestone_bonus(streak: i32) -> i64 {
    if streak <= 0 {
        return 0;
    }

    let mut bonus = 0;
    if streak % 7 == 0 {
        bonus += WEEKLY_MILESTONE_COINS;
    }
    if streak % 30 == 0 {
        bonus += MONTHLY_MILESTONE_COINS;
    }
    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn hours_ago(now: DateTime<Utc>, h: i64) -> DateTime<Utc> {
        now - Duration::hours(h)
    }

    #[test]
    fn test_under_a_day_is_noop() {
        let now = Utc::now();
        assert_eq!(evaluate(hours_ago(now, 10), now), StreakTransition::NoOp);
        assert_eq!(evaluate(hours_ago(now, 0), now), StreakTransition::NoOp);
        assert_eq!(evaluate(hours_ago(now, 23), now), StreakTransition::NoOp);
    }

    #[test]
    fn test_between_one_and_two_days_continues() {
        let now = Utc::now();
        assert_eq!(evaluate(hours_ago(now, 24), now), StreakTransition::Continue);
        assert_eq!(evaluate(hours_ago(now, 30), now), StreakTransition::Continue);
        assert_eq!(evaluate(hours_ago(now, 47), now), StreakTransition::Continue);
    }

    #[test]
    fn test_two_days_or_more_resets() {
        let now = Utc::now();
        assert_eq!(evaluate(hours_ago(now, 48), now), StreakTransition::Reset);
        assert_eq!(evaluate(hours_ago(now, 72), now), StreakTransition::Reset);
        assert_eq!(evaluate(hours_ago(now, 24 * 365), now), StreakTransition::Reset);
    }

    #[test]
    fn test_clock_skew_is_noop() {
        // last_update in the future relative to now
        let now = Utc::now();
        assert_eq!(evaluate(now + Duration::hours(2), now), StreakTransition::NoOp);
    }

    #[test]
    fn test_apply_transitions() {
        assert_eq!(apply(5, StreakTransition::NoOp), 5);
        assert_eq!(apply(5, StreakTransition::Continue), 6);
        assert_eq!(apply(5, StreakTransition::Reset), 1);
    }

    #[test]
    fn test_milestone_bonuses() {
        assert_eq!(milestone_bonus(1), 0);
        assert_eq!(milestone_bonus(6), 0);
        assert_eq!(milestone_bonus(7), 100);
        assert_eq!(milestone_bonus(14), 100);
        assert_eq!(milestone_bonus(30), 500);
        assert_eq!(milestone_bonus(35), 100);
        // day 210 is both a weekly and a monthly milestone
        assert_eq!(milestone_bonus(210), 600);
        assert_eq!(milestone_bonus(0), 0);
        assert_eq!(milestone_bonus(-7), 0);
    }
}
