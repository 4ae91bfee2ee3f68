//! Completion evaluation.
//!
//! A task is done when its last completion falls inside the current
//! occurrence of its period's window. Tasks with `continue_days > 0` use a
//! plain calendar-day count instead and ignore period boundaries entirely.

use chrono::{DateTime, TimeZone, Utc};

use crate::period::{window_for, Period};
use crate::task::Task;

/// Whole calendar days between `earlier` and `later`, counted in `later`'s
/// time zone. Midnights are the unit, so 23:59 -> 00:01 is one day.
pub fn elapsed_days<Tz: TimeZone>(earlier: &DateTime<Utc>, later: &DateTime<Tz>) -> i64 {
    let earlier_date = earlier.with_timezone(&later.timezone()).date_naive();
    (later.date_naive() - earlier_date).num_days()
}

/// Whether `task` counts as done at `reference`.
pub fn is_done<Tz: TimeZone>(task: &Task, period: &Period, reference: &DateTime<Tz>) -> bool {
    let Some(last_done) = task.last_done else {
        return false;
    };

    if task.continue_days > 0 {
        return elapsed_days(&last_done, reference) <= i64::from(task.continue_days);
    }

    window_for(period, reference).contains(&last_done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
    }

    fn night() -> Period {
        Period::new("night", 19, 4, "Night", "")
    }

    fn morning() -> Period {
        Period::new("morning", 4, 12, "Morning", "")
    }

    fn done_at(when: DateTime<Utc>) -> Task {
        let mut task = Task::new(1, "night", "Bath", 0);
        task.last_done = Some(when);
        task
    }

    #[test]
    fn never_completed_is_not_done() {
        let task = Task::new(1, "night", "Bath", 0);
        assert!(!is_done(&task, &night(), &at(10, 20, 0)));
    }

    #[test]
    fn completion_at_window_start_is_done() {
        let task = done_at(at(10, 19, 0));
        assert!(is_done(&task, &night(), &at(10, 22, 0)));
    }

    #[test]
    fn completion_at_window_end_is_not_done() {
        let task = done_at(at(11, 4, 0));
        // Reference 03:00 on the 11th: window is [10th 19:00, 11th 04:00).
        assert!(!is_done(&task, &night(), &at(11, 3, 0)));
    }

    #[test]
    fn evening_completion_still_counts_after_midnight() {
        let task = done_at(at(9, 20, 0));
        assert!(is_done(&task, &night(), &at(10, 2, 0)));
    }

    #[test]
    fn previous_occurrence_does_not_count() {
        let task = done_at(at(9, 20, 0));
        assert!(!is_done(&task, &night(), &at(10, 20, 0)));
    }

    #[test]
    fn morning_completion_resets_next_day() {
        let task = done_at(at(10, 7, 0));
        assert!(is_done(&task, &morning(), &at(10, 11, 0)));
        assert!(!is_done(&task, &morning(), &at(11, 7, 0)));
    }

    #[test]
    fn continuation_counts_calendar_days() {
        let mut task = done_at(at(10, 23, 0));
        task.continue_days = 2;
        assert!(is_done(&task, &morning(), &at(12, 0, 1)));
        assert!(!is_done(&task, &morning(), &at(13, 0, 1)));
    }

    #[test]
    fn continuation_ignores_period_window() {
        let mut task = done_at(at(10, 8, 0));
        task.continue_days = 1;
        // Outside the morning window but within one calendar day.
        assert!(is_done(&task, &morning(), &at(11, 18, 0)));
    }

    #[test]
    fn one_minute_across_midnight_is_one_day() {
        assert_eq!(elapsed_days(&at(10, 23, 59), &at(11, 0, 1)), 1);
        assert_eq!(elapsed_days(&at(10, 0, 0), &at(10, 23, 59)), 0);
    }

    #[test]
    fn elapsed_days_uses_reference_zone_midnights() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 14:30 UTC on the 10th is 23:30 on the 10th in Tokyo.
        let done = at(10, 14, 30);
        let reference = tokyo.with_ymd_and_hms(2025, 6, 11, 0, 30, 0).unwrap();
        assert_eq!(elapsed_days(&done, &reference), 1);
    }
}
