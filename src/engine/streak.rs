//! Consecutive-day streak bookkeeping.
//!
//! Dates are calendar days; times of day never matter.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: u32,
    pub last_activity: Option<NaiveDate>,
}

fn is_day_before(last: NaiveDate, today: NaiveDate) -> bool {
    today.pred_opt() == Some(last)
}

/// Apply a lesson completion on `today`.
pub fn record_activity(last: Option<NaiveDate>, today: NaiveDate, current: u32) -> StreakUpdate {
    let streak = match last {
        Some(d) if d == today => {
            return StreakUpdate {
                streak: current,
                last_activity: last,
            };
        }
        Some(d) if is_day_before(d, today) => current.saturating_add(1),
        _ => 1,
    };
    StreakUpdate {
        streak,
        last_activity: Some(today),
    }
}

/// Session-start check: a streak whose last activity is neither today nor
/// yesterday has lapsed and drops to zero. The last activity date is kept.
pub fn check_idle(last: Option<NaiveDate>, today: NaiveDate, current: u32) -> u32 {
    match last {
        Some(d) if d != today && !is_day_before(d, today) => 0,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn first_ever_activity_starts_at_one() {
        let update = record_activity(None, day(10), 0);
        assert_eq!(update.streak, 1);
        assert_eq!(update.last_activity, Some(day(10)));
    }

    #[test]
    fn yesterday_extends_streak() {
        let update = record_activity(Some(day(9)), day(10), 4);
        assert_eq!(update.streak, 5);
        assert_eq!(update.last_activity, Some(day(10)));
    }

    #[test]
    fn same_day_leaves_streak_alone() {
        let update = record_activity(Some(day(10)), day(10), 4);
        assert_eq!(update.streak, 4);
        assert_eq!(update.last_activity, Some(day(10)));
    }

    #[test]
    fn gap_resets_to_one() {
        let update = record_activity(Some(day(7)), day(10), 9);
        assert_eq!(update.streak, 1);
        assert_eq!(update.last_activity, Some(day(10)));
    }

    #[test]
    fn month_boundary_counts_as_consecutive() {
        let feb_end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(record_activity(Some(feb_end), day(1), 2).streak, 3);
    }

    #[test]
    fn idle_check_resets_lapsed_streak() {
        assert_eq!(check_idle(Some(day(7)), day(10), 6), 0);
        assert_eq!(check_idle(Some(day(9)), day(10), 6), 6);
        assert_eq!(check_idle(Some(day(10)), day(10), 6), 6);
        assert_eq!(check_idle(None, day(10), 0), 0);
    }

    #[test]
    fn completion_after_idle_reset_starts_fresh() {
        let last = Some(day(1));
        let streak = check_idle(last, day(10), 5);
        assert_eq!(streak, 0);
        assert_eq!(record_activity(last, day(10), streak).streak, 1);
    }
}
