//! Full-state export and import.
//!
//! A bundle is `{ version, exportedAt, todos, oneTimeTodos, logs, config,
//! timeRanges }`. Import checks the shape of every present field first and
//! collects all problems; nothing is written unless the whole bundle is
//! acceptable. Absent fields leave the corresponding document untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity_log::{LogEntry, LOG_CAPACITY};
use crate::error::ImportError;
use crate::period::PeriodRegistry;
use crate::storage::Config;
use crate::task::{OneTimeTask, TaskLists};

/// Written into every export.
pub const BUNDLE_VERSION: &str = "3.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub todos: TaskLists,
    pub one_time_todos: Vec<OneTimeTask>,
    pub logs: Vec<LogEntry>,
    pub config: Config,
    pub time_ranges: PeriodRegistry,
}

/// A validated import, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub version: Option<String>,
    pub todos: Option<TaskLists>,
    pub one_time_todos: Option<Vec<OneTimeTask>>,
    pub logs: Option<Vec<LogEntry>>,
    pub config: Option<Config>,
    pub time_ranges: Option<PeriodRegistry>,
}

/// Counts reported by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub version: Option<String>,
    pub tasks: Option<usize>,
    pub one_time_tasks: Option<usize>,
    pub logs: Option<usize>,
    pub periods: Option<usize>,
    pub config: bool,
}

#[derive(Clone, Copy)]
enum Shape {
    Object,
    Array,
}

impl ImportPlan {
    /// Parse and validate bundle text.
    ///
    /// # Errors
    /// [`ImportError::Parse`] for malformed JSON, [`ImportError::Invalid`]
    /// listing every field with the wrong shape or contents.
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        let root: Value = serde_json::from_str(json.trim())
            .map_err(|e| ImportError::Parse(e.to_string()))?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, ImportError> {
        let Value::Object(mut fields) = root else {
            return Err(ImportError::Invalid(vec![
                "bundle must be a JSON object".to_string(),
            ]));
        };

        let mut errors = Vec::new();
        let mut plan = ImportPlan {
            version: fields
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
            ..Self::default()
        };

        plan.todos = take_field(&mut fields, "todos", Shape::Object, &mut errors);
        plan.one_time_todos = take_field(&mut fields, "oneTimeTodos", Shape::Array, &mut errors);
        plan.logs = take_field(&mut fields, "logs", Shape::Array, &mut errors);
        plan.config = take_field(&mut fields, "config", Shape::Object, &mut errors);
        plan.time_ranges = take_field(&mut fields, "timeRanges", Shape::Object, &mut errors);

        if errors.is_empty() {
            Ok(plan)
        } else {
            Err(ImportError::Invalid(errors))
        }
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            version: self.version.clone(),
            tasks: self.todos.as_ref().map(|t| t.values().map(Vec::len).sum()),
            one_time_tasks: self.one_time_todos.as_ref().map(Vec::len),
            logs: self.logs.as_ref().map(Vec::len),
            periods: self.time_ranges.as_ref().map(PeriodRegistry::len),
            config: self.config.is_some(),
        }
    }

    /// Logs as they will be stored (newest [`LOG_CAPACITY`] only).
    pub(crate) fn capped_logs(&self) -> Option<&[LogEntry]> {
        self.logs.as_deref().map(|logs| {
            let start = logs.len().saturating_sub(LOG_CAPACITY);
            &logs[start..]
        })
    }
}

/// Remove `name` from `fields`, check its JSON shape, then decode it.
/// `null` is treated as absent.
fn take_field<T>(
    fields: &mut serde_json::Map<String, Value>,
    name: &str,
    shape: Shape,
    errors: &mut Vec<String>,
) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let value = match fields.remove(name) {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let shape_ok = match shape {
        Shape::Object => value.is_object(),
        Shape::Array => value.is_array(),
    };
    if !shape_ok {
        let expected = match shape {
            Shape::Object => "an object",
            Shape::Array => "an array",
        };
        errors.push(format!("{name} must be {expected}"));
        return None;
    }

    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            errors.push(format!("{name}: {e}"));
            None
        }
    }
}
