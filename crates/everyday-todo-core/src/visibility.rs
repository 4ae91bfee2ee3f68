//! Weekday visibility.

use chrono::{DateTime, Datelike, TimeZone};

use crate::task::Task;

/// Weekday index with Sunday = 0 ... Saturday = 6.
pub fn weekday_index<Tz: TimeZone>(time: &DateTime<Tz>) -> u8 {
    // num_days_from_sunday is always 0..=6
    time.weekday().num_days_from_sunday() as u8
}

/// Empty `days_of_week` predates weekday filtering and means every day.
pub fn is_visible_today(task: &Task, today_weekday: u8) -> bool {
    task.days_of_week.is_empty() || task.days_of_week.contains(&today_weekday)
}

/// Short English day names, indexed like [`weekday_index`].
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Render a weekday set as `Mon,Tue,...`, or `every day` for all/none.
pub fn describe_days(days: &[u8]) -> String {
    if days.is_empty() || days.len() == DAY_NAMES.len() {
        return "every day".to_string();
    }
    days.iter()
        .filter_map(|d| DAY_NAMES.get(usize::from(*d)))
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}
