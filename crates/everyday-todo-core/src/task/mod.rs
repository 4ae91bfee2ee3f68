//! Recurring tasks.
//!
//! Tasks are grouped per period in a single `todos` document. The JSON shape
//! uses camelCase names and epoch-millisecond `lastDone` values so exported
//! bundles read the same as the documents written by earlier versions.

pub mod one_time;
pub mod store;

pub use one_time::{OneTimeStore, OneTimeTask};
pub use store::{TaskLists, TaskStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Every weekday, Sunday (0) through Saturday (6).
pub const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// A recurring task belonging to one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Creation timestamp in milliseconds; unique across periods.
    pub id: i64,
    pub text: String,
    /// Filled from the owning bucket on load.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub period_id: String,
    #[serde(default)]
    pub order: u32,
    /// Empty means every day.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// Extra calendar days a completion stays valid. 0 disables.
    #[serde(default)]
    pub continue_days: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_done: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: i64, period_id: impl Into<String>, text: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            text: text.into(),
            period_id: period_id.into(),
            order,
            days_of_week: ALL_DAYS.to_vec(),
            continue_days: 0,
            last_done: None,
        }
    }

    /// Apply a validated patch.
    pub fn apply(&mut self, patch: TaskPatch) -> Result<(), ValidationError> {
        let patch = patch.validated()?;
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(days) = patch.days_of_week {
            self.days_of_week = days;
        }
        if let Some(days) = patch.continue_days {
            self.continue_days = days;
        }
        if let Some(last_done) = patch.last_done {
            self.last_done = last_done;
        }
        Ok(())
    }
}

/// Partial update for a [`Task`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub order: Option<u32>,
    pub days_of_week: Option<Vec<u8>>,
    pub continue_days: Option<u32>,
    /// `Some(None)` clears the completion.
    pub last_done: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn days_of_week(days: Vec<u8>) -> Self {
        Self { days_of_week: Some(days), ..Self::default() }
    }

    pub fn continue_days(days: u32) -> Self {
        Self { continue_days: Some(days), ..Self::default() }
    }

    pub fn last_done(at: Option<DateTime<Utc>>) -> Self {
        Self { last_done: Some(at), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Normalize text and weekday fields, rejecting values the schema forbids.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        if let Some(text) = self.text.take() {
            self.text = Some(normalize_text(&text)?);
        }
        if let Some(days) = self.days_of_week.take() {
            self.days_of_week = Some(normalize_days(days)?);
        }
        Ok(self)
    }
}

/// Trimmed, non-empty task text.
pub fn normalize_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("task text".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Sorted, de-duplicated weekday set with at least one day.
pub fn normalize_days(mut days: Vec<u8>) -> Result<Vec<u8>, ValidationError> {
    if let Some(bad) = days.iter().find(|d| **d > 6) {
        return Err(ValidationError::InvalidValue {
            field: "daysOfWeek".to_string(),
            message: format!("weekday {bad} is outside 0-6"),
        });
    }
    days.sort_unstable();
    days.dedup();
    if days.is_empty() {
        return Err(ValidationError::Empty(
            "daysOfWeek (select at least one day)".to_string(),
        ));
    }
    Ok(days)
}
