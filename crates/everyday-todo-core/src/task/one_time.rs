//! One-off tasks that apply to an inclusive date range instead of recurring.
//!
//! Expired tasks (end date before today) are swept by
//! [`OneTimeStore::cleanup_expired`] on startup.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::normalize_text;
use crate::error::{Result, ValidationError};
use crate::storage::{keys, Database};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeTask {
    pub id: i64,
    pub text: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub done_at: Option<DateTime<Utc>>,
}

impl OneTimeTask {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }
}

/// CRUD over the `one_time_todos` document.
pub struct OneTimeStore<'a> {
    db: &'a Database,
}

impl<'a> OneTimeStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All one-time tasks, earliest start first.
    pub fn list(&self) -> Vec<OneTimeTask> {
        let mut tasks: Vec<OneTimeTask> = self.db.load_document(keys::ONE_TIME_TODOS);
        tasks.sort_by_key(|t| (t.start_date, t.id));
        tasks
    }

    pub fn save(&self, tasks: &[OneTimeTask]) -> Result<()> {
        self.db.save_document(keys::ONE_TIME_TODOS, tasks)
    }

    pub fn add(
        &self,
        text: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<OneTimeTask> {
        let text = normalize_text(text)?;
        if end_date < start_date {
            return Err(ValidationError::InvalidValue {
                field: "endDate".to_string(),
                message: format!("{end_date} is before {start_date}"),
            }
            .into());
        }

        let mut tasks = self.list();
        let now_ms = now.timestamp_millis();
        let id = match tasks.iter().map(|t| t.id).max() {
            Some(max) if max >= now_ms => max + 1,
            _ => now_ms,
        };
        let task = OneTimeTask {
            id,
            text,
            start_date,
            end_date,
            done_at: None,
        };
        tasks.push(task.clone());
        self.save(&tasks)?;
        Ok(task)
    }

    /// Tasks whose date range includes `date`.
    pub fn active_on(&self, date: NaiveDate) -> Vec<OneTimeTask> {
        self.list()
            .into_iter()
            .filter(|t| t.is_active_on(date))
            .collect()
    }

    /// Flip the done flag. Returns the updated task, or `None` if absent.
    pub fn toggle(&self, id: i64, now: DateTime<Utc>) -> Result<Option<OneTimeTask>> {
        let mut tasks = self.list();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.done_at = match task.done_at {
            Some(_) => None,
            None => Some(now),
        };
        let updated = task.clone();
        self.save(&tasks)?;
        Ok(Some(updated))
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut tasks = self.list();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.save(&tasks)?;
        Ok(true)
    }

    /// Drop tasks whose end date is before `today`. Returns how many.
    pub fn cleanup_expired(&self, today: NaiveDate) -> Result<usize> {
        let mut tasks = self.list();
        let before = tasks.len();
        tasks.retain(|t| !t.is_expired(today));
        let removed = before - tasks.len();
        if removed > 0 {
            self.save(&tasks)?;
            tracing::info!(removed, "removed expired one-time tasks");
        }
        Ok(removed)
    }
}
