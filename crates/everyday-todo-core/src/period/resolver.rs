//! Period resolution and window computation.
//!
//! Everything here is a pure function of the registry and a clock reading,
//! so the active period is recomputed on every tick instead of cached.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use super::{Period, PeriodRegistry};

/// One concrete occurrence of a period: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> Window<Tz> {
    /// Half-open membership: `start` is inside, `end` is not.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        let start = self.start.with_timezone(&Utc);
        let end = self.end.with_timezone(&Utc);
        *instant >= start && *instant < end
    }
}

/// First period (in registry order) whose range contains `hour`.
/// Falls back to the first registered period when nothing matches.
pub fn resolve_hour(registry: &PeriodRegistry, hour: u32) -> &Period {
    registry
        .iter()
        .find(|p| p.contains_hour(hour))
        .unwrap_or_else(|| registry.first())
}

/// Period containing `clock_time`'s hour of day.
pub fn resolve_period<'a, Tz: TimeZone>(
    registry: &'a PeriodRegistry,
    clock_time: &DateTime<Tz>,
) -> &'a Period {
    resolve_hour(registry, clock_time.hour())
}

/// The occurrence of `period` anchored to `reference`'s calendar date.
///
/// For a wrapping period the occurrence started yesterday when the reference
/// hour is before `end_hour`, and otherwise runs from today into tomorrow.
pub fn window_for<Tz: TimeZone>(period: &Period, reference: &DateTime<Tz>) -> Window<Tz> {
    let tz = reference.timezone();
    let today = reference.date_naive();

    let (start_date, end_date) = if !period.wraps() {
        (today, today)
    } else if reference.hour() < u32::from(period.end_hour) {
        (today.pred_opt().unwrap_or(today), today)
    } else {
        (today, today.succ_opt().unwrap_or(today))
    };

    Window {
        start: local_instant(&tz, start_date, period.start_hour),
        end: local_instant(&tz, end_date, period.end_hour),
    }
}

/// `date` at `hour:00:00` local time.
///
/// Ambiguous wall times (DST fall-back) take the earlier instant; missing
/// wall times (DST spring-forward) are read as UTC.
pub(crate) fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u8) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(u32::from(hour), 0, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{AFTER_SCHOOL, MORNING, NIGHT};
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
    }

    fn focus_block() -> Period {
        Period::new("focus", 8, 10, "Focus", "")
    }

    fn late() -> Period {
        Period::new("late", 19, 4, "Late", "")
    }

    #[test]
    fn non_wrapping_range_is_half_open() {
        let registry =
            PeriodRegistry::new(vec![focus_block(), Period::new("rest", 10, 8, "Rest", "")])
                .unwrap();
        assert_eq!(resolve_hour(&registry, 8).id, "focus");
        assert_eq!(resolve_hour(&registry, 9).id, "focus");
        assert_eq!(resolve_hour(&registry, 7).id, "rest");
        assert_eq!(resolve_hour(&registry, 10).id, "rest");
    }

    #[test]
    fn wrapping_range_covers_both_sides_of_midnight() {
        let registry =
            PeriodRegistry::new(vec![late(), Period::new("day", 4, 19, "Day", "")]).unwrap();
        for hour in (19..24).chain(0..4) {
            assert_eq!(resolve_hour(&registry, hour).id, "late", "hour {hour}");
        }
        for hour in 4..19 {
            assert_eq!(resolve_hour(&registry, hour).id, "day", "hour {hour}");
        }
    }

    #[test]
    fn unmatched_hour_falls_back_to_first_period() {
        let registry = PeriodRegistry::new(vec![
            Period::new("a", 6, 9, "A", ""),
            Period::new("b", 12, 14, "B", ""),
        ])
        .unwrap();
        assert_eq!(resolve_hour(&registry, 3).id, "a");
        assert_eq!(resolve_hour(&registry, 13).id, "b");
    }

    #[test]
    fn overlapping_periods_take_first_match() {
        let registry = PeriodRegistry::new(vec![
            Period::new("wide", 0, 12, "Wide", ""),
            Period::new("narrow", 8, 10, "Narrow", ""),
        ])
        .unwrap();
        assert_eq!(resolve_hour(&registry, 9).id, "wide");
    }

    #[test]
    fn default_registry_resolves_by_clock() {
        let registry = PeriodRegistry::default();
        assert_eq!(resolve_period(&registry, &at(10, 4, 0)).id, MORNING);
        assert_eq!(resolve_period(&registry, &at(10, 11, 59)).id, MORNING);
        assert_eq!(resolve_period(&registry, &at(10, 12, 0)).id, AFTER_SCHOOL);
        assert_eq!(resolve_period(&registry, &at(10, 19, 0)).id, NIGHT);
        assert_eq!(resolve_period(&registry, &at(10, 3, 59)).id, NIGHT);
    }

    #[test]
    fn window_for_non_wrapping_stays_on_reference_date() {
        let window = window_for(&focus_block(), &at(10, 9, 30));
        assert_eq!(window.start, at(10, 8, 0));
        assert_eq!(window.end, at(10, 10, 0));
    }

    #[test]
    fn window_for_wrapping_after_midnight_starts_previous_day() {
        let window = window_for(&late(), &at(10, 2, 0));
        assert_eq!(window.start, at(9, 19, 0));
        assert_eq!(window.end, at(10, 4, 0));
    }

    #[test]
    fn window_for_wrapping_in_evening_ends_next_day() {
        let window = window_for(&late(), &at(10, 20, 0));
        assert_eq!(window.start, at(10, 19, 0));
        assert_eq!(window.end, at(11, 4, 0));
    }

    #[test]
    fn window_for_crosses_month_boundary() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).unwrap();
        let window = window_for(&late(), &reference);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2025, 2, 28, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn window_contains_start_but_not_end() {
        let window = window_for(&focus_block(), &at(10, 9, 0));
        assert!(window.contains(&at(10, 8, 0)));
        assert!(window.contains(&at(10, 9, 59)));
        assert!(!window.contains(&at(10, 10, 0)));
        assert!(!window.contains(&at(10, 7, 59)));
    }

    #[test]
    fn window_uses_reference_time_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2025-03-10 01:00 in Tokyo is still the 9th in UTC.
        let reference = tokyo.with_ymd_and_hms(2025, 3, 10, 1, 0, 0).unwrap();
        let window = window_for(&late(), &reference);
        assert_eq!(
            window.start,
            tokyo.with_ymd_and_hms(2025, 3, 9, 19, 0, 0).unwrap()
        );
        assert_eq!(window.end, tokyo.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap());
    }

    proptest! {
        #[test]
        fn window_always_contains_a_reference_inside_the_period(
            start in 0u8..24,
            end in 0u8..24,
            day in 1u32..28,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            prop_assume!(start != end);
            let period = Period::new("p", start, end, "P", "");
            let reference = at(day, hour, minute);
            prop_assume!(period.contains_hour(hour));

            let window = window_for(&period, &reference);
            prop_assert!(window.contains(&reference));
            prop_assert!(window.start < window.end);
        }
    }
}
