//! The tracker ties periods, tasks, the log and the config together into the
//! user-facing actions: board view, toggle, reorder, registry edits, export,
//! import and reset.
//!
//! Clock readings are always passed in, so callers decide the time zone and
//! tests can pin "now".

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::activity_log::{ActivityLog, LogAction};
use crate::bundle::{ExportBundle, ImportPlan, ImportSummary, BUNDLE_VERSION};
use crate::completion::is_done;
use crate::error::{Result, ValidationError};
use crate::notify;
use crate::period::{self, resolve_period, Period, PeriodRegistry};
use crate::storage::{data_dir, keys, Config, Database};
use crate::task::{OneTimeStore, OneTimeTask, Task, TaskPatch, TaskStore};
use crate::visibility::{is_visible_today, weekday_index};

/// Which tasks the board includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardScope {
    /// Only tasks of the period containing "now".
    #[default]
    CurrentPeriod,
    /// Tasks of every registered period, each judged by its own window.
    AllPeriods,
}

/// One row of the board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    #[serde(flatten)]
    pub task: Task,
    pub period_label: String,
    pub done: bool,
}

/// What the main screen shows at a given instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub period_id: String,
    pub label: String,
    pub greeting: String,
    pub weekday: u8,
    pub unchecked: Vec<BoardItem>,
    pub checked: Vec<BoardItem>,
    pub one_time: Vec<OneTimeTask>,
}

impl Board {
    /// Everything visible is done.
    pub fn all_done(&self) -> bool {
        self.unchecked.is_empty() && !self.checked.is_empty()
    }
}

/// Result of [`Tracker::toggle`]. The notification has not been sent yet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub task: Task,
    pub action: LogAction,
    pub message: String,
}

/// What startup housekeeping did.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupReport {
    pub seeded: bool,
    pub expired_removed: usize,
}

pub struct Tracker {
    db: Database,
    config_path: PathBuf,
    registry: PeriodRegistry,
}

impl Tracker {
    /// Open the tracker in the default data directory.
    pub fn open() -> Result<Self> {
        Self::open_in(&data_dir()?)
    }

    /// Open the tracker with its store and config inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db = Database::open_at(&dir.join("everyday-todo.db"))?;
        Ok(Self::with_database(db, dir.join("config.toml")))
    }

    pub fn with_database(db: Database, config_path: PathBuf) -> Self {
        let registry = load_registry(&db);
        Self {
            db,
            config_path,
            registry,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn registry(&self) -> &PeriodRegistry {
        &self.registry
    }

    pub fn tasks(&self) -> TaskStore<'_> {
        TaskStore::new(&self.db, &self.registry)
    }

    pub fn one_time(&self) -> OneTimeStore<'_> {
        OneTimeStore::new(&self.db)
    }

    pub fn log(&self) -> ActivityLog<'_> {
        ActivityLog::new(&self.db)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Current config; falls back to defaults if the file is unreadable.
    pub fn config(&self) -> Config {
        Config::load_or_default_from(&self.config_path)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save_to(&self.config_path)
    }

    /// Period containing `now`.
    pub fn current_period<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> &Period {
        resolve_period(&self.registry, now)
    }

    /// Seed sample tasks on first run and sweep expired one-time tasks.
    pub fn startup<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<StartupReport> {
        let seeded = self.seed_if_first_run(now.with_timezone(&Utc))?;
        let expired_removed = self.one_time().cleanup_expired(now.date_naive())?;
        Ok(StartupReport {
            seeded,
            expired_removed,
        })
    }

    /// Write the sample task set unless the store was initialized before.
    pub fn seed_if_first_run(&self, now: DateTime<Utc>) -> Result<bool> {
        if self.db.kv_get(keys::INITIALIZED)?.is_some() {
            return Ok(false);
        }

        let mut lists = self.tasks().load();
        let mut next_id = now.timestamp_millis();
        for (period_id, samples) in SAMPLE_TASKS {
            if !self.registry.contains(period_id) {
                continue;
            }
            let list = lists.entry(period_id.to_string()).or_default();
            for (text, days) in *samples {
                next_id += 1;
                let order = u32::try_from(list.len()).unwrap_or(u32::MAX);
                let mut task = Task::new(next_id, *period_id, *text, order);
                task.days_of_week = days.to_vec();
                list.push(task);
            }
        }
        self.tasks().save(&lists)?;
        self.db.kv_set(keys::INITIALIZED, "true")?;

        tracing::info!("seeded sample tasks");
        Ok(true)
    }

    /// Build the board at `now`: visible tasks grouped by period in registry
    /// order, sorted by `order` within each period, split by completion.
    pub fn board<Tz: TimeZone>(&self, now: &DateTime<Tz>, scope: BoardScope) -> Board {
        let current = self.current_period(now);
        let weekday = weekday_index(now);

        let lists = self.tasks().load();
        let mut items: Vec<(usize, Task, &Period)> = self
            .registry
            .iter()
            .enumerate()
            .filter(|(_, p)| scope == BoardScope::AllPeriods || p.id == current.id)
            .flat_map(|(rank, p)| {
                let tasks = lists.get(&p.id).cloned().unwrap_or_default();
                tasks.into_iter().map(move |t| (rank, t, p))
            })
            .filter(|(_, task, _)| is_visible_today(task, weekday))
            .collect();
        items.sort_by_key(|(rank, task, _)| (*rank, task.order));

        let (checked, unchecked): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|(_, task, p)| BoardItem {
                done: is_done(&task, p, now),
                period_label: p.label.clone(),
                task,
            })
            .partition(|item| item.done);

        Board {
            period_id: current.id.clone(),
            label: current.label.clone(),
            greeting: current.greeting.clone(),
            weekday,
            unchecked,
            checked,
            one_time: self.one_time().active_on(now.date_naive()),
        }
    }

    /// Check the task if it is not done at `now`, otherwise uncheck it.
    /// The change and its log entry are persisted before returning.
    pub fn toggle<Tz: TimeZone>(&self, id: i64, now: &DateTime<Tz>) -> Result<ToggleOutcome> {
        let tasks = self.tasks();
        let mut task = tasks.find(id).ok_or(ValidationError::TaskNotFound(id))?;
        let period = self
            .registry
            .get(&task.period_id)
            .ok_or_else(|| ValidationError::UnknownPeriod(task.period_id.clone()))?;

        let now_utc = now.with_timezone(&Utc);
        let (action, last_done, message) = if is_done(&task, period, now) {
            (
                LogAction::Uncheck,
                None,
                notify::uncheck_message(&period.label, &task.text),
            )
        } else {
            (
                LogAction::Check,
                Some(now_utc),
                notify::check_message(&period.label, &task.text),
            )
        };

        task.last_done = last_done;
        tasks.update_task(&task.period_id, id, TaskPatch::last_done(last_done))?;
        self.log().add(&task, action, now_utc)?;

        tracing::debug!(id, %action, "task toggled");
        Ok(ToggleOutcome {
            task,
            action,
            message,
        })
    }

    /// Add or replace a period in the registry override.
    pub fn set_period(&mut self, period: Period) -> Result<()> {
        let mut registry = self.registry.clone();
        registry.upsert(period)?;
        self.store_registry(registry)
    }

    /// Remove a period from the registry. Its tasks stay in storage.
    pub fn remove_period(&mut self, id: &str) -> Result<bool> {
        let mut registry = self.registry.clone();
        if !registry.remove(id)? {
            return Ok(false);
        }
        self.store_registry(registry)?;
        Ok(true)
    }

    /// Drop the registry override and return to the default periods.
    pub fn reset_periods(&mut self) -> Result<()> {
        self.db.kv_delete(keys::TIME_RANGES)?;
        self.registry = PeriodRegistry::default();
        Ok(())
    }

    fn store_registry(&mut self, registry: PeriodRegistry) -> Result<()> {
        self.db.save_document(keys::TIME_RANGES, &registry)?;
        self.registry = registry;
        Ok(())
    }

    /// Snapshot of every document.
    pub fn export(&self, now: DateTime<Utc>) -> ExportBundle {
        ExportBundle {
            version: BUNDLE_VERSION.to_string(),
            exported_at: now,
            todos: self.tasks().load(),
            one_time_todos: self.one_time().list(),
            logs: self.log().load(),
            config: self.config(),
            time_ranges: self.registry.clone(),
        }
    }

    /// Validate without writing.
    pub fn validate_import(json: &str) -> Result<ImportSummary> {
        Ok(ImportPlan::parse(json)?.summary())
    }

    /// Validate, then overwrite every document present in the bundle.
    pub fn import(&mut self, json: &str) -> Result<ImportSummary> {
        let plan = ImportPlan::parse(json)?;

        let mut docs: Vec<(&str, String)> = Vec::new();
        if let Some(todos) = &plan.todos {
            docs.push((keys::TODOS, serde_json::to_string(todos)?));
        }
        if let Some(one_time) = &plan.one_time_todos {
            docs.push((keys::ONE_TIME_TODOS, serde_json::to_string(one_time)?));
        }
        if let Some(logs) = plan.capped_logs() {
            docs.push((keys::LOGS, serde_json::to_string(logs)?));
        }
        if let Some(registry) = &plan.time_ranges {
            docs.push((keys::TIME_RANGES, serde_json::to_string(registry)?));
        }
        self.db.write_documents(&docs)?;

        if let Some(config) = &plan.config {
            self.save_config(config)?;
        }
        if let Some(registry) = &plan.time_ranges {
            self.registry = registry.clone();
        }

        let summary = plan.summary();
        tracing::info!(?summary, "bundle imported");
        Ok(summary)
    }

    /// Delete every document and restore the default config and periods.
    pub fn reset_all(&mut self) -> Result<()> {
        self.db.kv_clear()?;
        self.save_config(&Config::default())?;
        self.registry = PeriodRegistry::default();
        tracing::info!("all data reset");
        Ok(())
    }
}

fn load_registry(db: &Database) -> PeriodRegistry {
    db.try_load_document(keys::TIME_RANGES).unwrap_or_default()
}

const EVERY_DAY: &[u8] = &[0, 1, 2, 3, 4, 5, 6];
const WEEKDAYS: &[u8] = &[1, 2, 3, 4, 5];

/// First-run sample tasks per default period.
const SAMPLE_TASKS: &[(&str, &[(&str, &[u8])])] = &[
    (
        period::MORNING,
        &[
            ("Wash your face", EVERY_DAY),
            ("Eat breakfast", EVERY_DAY),
            ("Brush your teeth", EVERY_DAY),
            ("Get dressed", WEEKDAYS),
        ],
    ),
    (
        period::AFTER_SCHOOL,
        &[
            ("Wash hands and gargle", EVERY_DAY),
            ("Do homework", WEEKDAYS),
            ("Prepare for tomorrow", &[0, 1, 2, 3, 4, 5]),
        ],
    ),
    (
        period::NIGHT,
        &[
            ("Take a bath", EVERY_DAY),
            ("Stretch", EVERY_DAY),
            ("Brush your teeth", EVERY_DAY),
            ("Go to bed early", &[0, 1, 2, 3, 4]),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{AFTER_SCHOOL, MORNING, NIGHT};
    use chrono::Duration;

    fn tracker() -> (Tracker, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::with_database(
            Database::open_memory().unwrap(),
            dir.path().join("config.toml"),
        );
        (tracker, dir)
    }

    /// 2025-06-11 is a Wednesday.
    fn wed(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, hour, minute, 0).unwrap()
    }

    #[test]
    fn seeds_once() {
        let (tracker, _dir) = tracker();
        assert!(tracker.seed_if_first_run(wed(8, 0)).unwrap());
        assert!(!tracker.seed_if_first_run(wed(8, 0)).unwrap());
        assert_eq!(tracker.tasks().list_tasks(MORNING).len(), 4);
        assert_eq!(tracker.tasks().list_tasks(NIGHT)[3].days_of_week, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn toggle_checks_then_unchecks() {
        let (tracker, _dir) = tracker();
        let task = tracker.tasks().add_task(MORNING, "Wash face", wed(7, 0)).unwrap();

        let first = tracker.toggle(task.id, &wed(7, 30)).unwrap();
        assert_eq!(first.action, LogAction::Check);
        assert_eq!(first.task.last_done, Some(wed(7, 30)));
        assert!(first.message.contains("Wash face"));

        let second = tracker.toggle(task.id, &wed(8, 0)).unwrap();
        assert_eq!(second.action, LogAction::Uncheck);
        assert!(tracker.tasks().find(task.id).unwrap().last_done.is_none());

        let log = tracker.log().recent(None);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, LogAction::Uncheck);
    }

    #[test]
    fn toggle_after_window_rolls_over_checks_again() {
        let (tracker, _dir) = tracker();
        let task = tracker.tasks().add_task(MORNING, "Wash face", wed(7, 0)).unwrap();
        tracker.toggle(task.id, &wed(7, 30)).unwrap();
        let next_day = wed(7, 30) + Duration::days(1);
        assert_eq!(tracker.toggle(task.id, &next_day).unwrap().action, LogAction::Check);
    }

    #[test]
    fn toggle_unknown_task_fails() {
        let (tracker, _dir) = tracker();
        assert!(tracker.toggle(12345, &wed(7, 0)).is_err());
    }

    #[test]
    fn board_splits_by_completion_and_weekday() {
        let (tracker, _dir) = tracker();
        let store = tracker.tasks();
        let a = store.add_task(MORNING, "A", wed(6, 0)).unwrap();
        let b = store.add_task(MORNING, "B", wed(6, 0)).unwrap();
        let weekend = store.add_task(MORNING, "Weekend", wed(6, 0)).unwrap();
        store
            .update_task(MORNING, weekend.id, TaskPatch::days_of_week(vec![0, 6]))
            .unwrap();
        store.add_task(NIGHT, "Night", wed(6, 0)).unwrap();
        tracker.toggle(b.id, &wed(6, 30)).unwrap();

        let board = tracker.board(&wed(9, 0), BoardScope::CurrentPeriod);
        assert_eq!(board.period_id, MORNING);
        assert_eq!(board.weekday, 3);
        let unchecked: Vec<_> = board.unchecked.iter().map(|i| i.task.id).collect();
        let checked: Vec<_> = board.checked.iter().map(|i| i.task.id).collect();
        assert_eq!(unchecked, vec![a.id]);
        assert_eq!(checked, vec![b.id]);

        let all = tracker.board(&wed(9, 0), BoardScope::AllPeriods);
        assert_eq!(all.unchecked.len(), 2);
    }

    #[test]
    fn all_periods_board_keeps_each_period_together() {
        let (tracker, _dir) = tracker();
        let store = tracker.tasks();
        let bath = store.add_task(NIGHT, "Bath", wed(6, 0)).unwrap();
        let wash = store.add_task(MORNING, "Wash", wed(6, 0)).unwrap();
        let breakfast = store.add_task(MORNING, "Breakfast", wed(6, 0)).unwrap();
        let homework = store.add_task(AFTER_SCHOOL, "Homework", wed(6, 0)).unwrap();

        let board = tracker.board(&wed(9, 0), BoardScope::AllPeriods);
        let order: Vec<_> = board.unchecked.iter().map(|i| i.task.id).collect();
        assert_eq!(order, vec![wash.id, breakfast.id, homework.id, bath.id]);
    }

    #[test]
    fn night_board_after_midnight_keeps_evening_checks() {
        let (tracker, _dir) = tracker();
        let task = tracker.tasks().add_task(NIGHT, "Bath", wed(18, 0)).unwrap();
        tracker.toggle(task.id, &wed(21, 0)).unwrap();

        let after_midnight = wed(2, 0) + Duration::days(1);
        let board = tracker.board(&after_midnight, BoardScope::CurrentPeriod);
        assert_eq!(board.period_id, NIGHT);
        assert_eq!(board.checked.len(), 1);
        assert!(board.all_done());
    }

    #[test]
    fn period_override_persists() {
        let (mut tracker, _dir) = tracker();
        tracker
            .set_period(Period::new(MORNING, 6, 12, "Morning", "Hi"))
            .unwrap();
        let reloaded = load_registry(tracker.database());
        assert_eq!(reloaded.get(MORNING).unwrap().start_hour, 6);

        tracker.reset_periods().unwrap();
        assert_eq!(tracker.registry().get(MORNING).unwrap().start_hour, 4);
        assert!(tracker.database().kv_get(keys::TIME_RANGES).unwrap().is_none());
    }

    #[test]
    fn malformed_registry_falls_back_to_defaults() {
        let db = Database::open_memory().unwrap();
        db.kv_set(keys::TIME_RANGES, r#"{"x":{"start":1,"end":1}}"#)
            .unwrap();
        assert_eq!(load_registry(&db), PeriodRegistry::default());
    }

    #[test]
    fn reset_all_clears_everything() {
        let (mut tracker, _dir) = tracker();
        tracker.seed_if_first_run(wed(8, 0)).unwrap();
        let mut config = tracker.config();
        config.notifications.username = "Helper".to_string();
        tracker.save_config(&config).unwrap();

        tracker.reset_all().unwrap();
        assert!(tracker.tasks().list_tasks(MORNING).is_empty());
        assert_eq!(tracker.config(), Config::default());
        assert!(tracker.seed_if_first_run(wed(8, 0)).unwrap());
    }

    #[test]
    fn import_keeps_flat_webhook_settings() {
        let (mut tracker, _dir) = tracker();
        let summary = tracker
            .import(
                r#"{"config":{"discordWebhookUrl":"https://discord.com/api/webhooks/1/abc","discordUsername":"Kid"}}"#,
            )
            .unwrap();
        assert!(summary.config);
        let config = tracker.config();
        assert_eq!(
            config.notifications.webhook_url,
            "https://discord.com/api/webhooks/1/abc"
        );
        assert_eq!(config.notifications.username, "Kid");
    }

    #[test]
    fn failed_import_writes_nothing() {
        let (mut tracker, _dir) = tracker();
        tracker.tasks().add_task(MORNING, "Keep me", wed(8, 0)).unwrap();
        let err = tracker
            .import(r#"{"todos":{"morning":[]},"logs":"broken"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("logs must be an array"));
        assert_eq!(tracker.tasks().list_tasks(MORNING).len(), 1);
    }
}
