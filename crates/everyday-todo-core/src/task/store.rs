//! Per-period task lists over the `todos` document.
//!
//! Every mutation is a whole-document read-modify-write.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::{normalize_text, Task, TaskPatch};
use crate::error::{Result, ValidationError};
use crate::period::PeriodRegistry;
use crate::storage::{keys, Database};

/// Task lists keyed by period id, in registry order.
pub type TaskLists = IndexMap<String, Vec<Task>>;

/// CRUD over recurring tasks.
pub struct TaskStore<'a> {
    db: &'a Database,
    registry: &'a PeriodRegistry,
}

impl<'a> TaskStore<'a> {
    pub fn new(db: &'a Database, registry: &'a PeriodRegistry) -> Self {
        Self { db, registry }
    }

    /// Load all lists. Every registered period gets a (possibly empty) list;
    /// lists for periods no longer registered are kept so no data is lost.
    pub fn load(&self) -> TaskLists {
        let stored: TaskLists = self.db.load_document(keys::TODOS);
        normalize(self.registry, stored)
    }

    pub fn save(&self, lists: &TaskLists) -> Result<()> {
        self.db.save_document(keys::TODOS, lists)
    }

    /// Append a task to `period_id`'s list.
    pub fn add_task(&self, period_id: &str, text: &str, now: DateTime<Utc>) -> Result<Task> {
        if !self.registry.contains(period_id) {
            return Err(ValidationError::UnknownPeriod(period_id.to_string()).into());
        }
        let text = normalize_text(text)?;

        let mut lists = self.load();
        let id = next_id(now, &lists);
        let list = lists.entry(period_id.to_string()).or_default();
        let order = u32::try_from(list.len()).unwrap_or(u32::MAX);
        let task = Task::new(id, period_id, text, order);
        list.push(task.clone());
        self.save(&lists)?;

        tracing::debug!(id, period = period_id, "task added");
        Ok(task)
    }

    /// Merge `patch` into a task. Returns `false` when the task is absent.
    pub fn update_task(&self, period_id: &str, id: i64, patch: TaskPatch) -> Result<bool> {
        let patch = patch.validated()?;
        let mut lists = self.load();
        let Some(task) = lists
            .get_mut(period_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == id))
        else {
            return Ok(false);
        };
        task.apply(patch)?;
        self.save(&lists)?;

        tracing::debug!(id, period = period_id, "task updated");
        Ok(true)
    }

    /// Remove a task. Returns `false` when the task is absent.
    pub fn delete_task(&self, period_id: &str, id: i64) -> Result<bool> {
        let mut lists = self.load();
        let Some(list) = lists.get_mut(period_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|t| t.id != id);
        if list.len() == before {
            return Ok(false);
        }
        self.save(&lists)?;

        tracing::debug!(id, period = period_id, "task deleted");
        Ok(true)
    }

    /// Replace `period_id`'s list with `ordered`, rewriting `order` by index.
    pub fn reorder(&self, period_id: &str, ordered: Vec<Task>) -> Result<()> {
        let mut lists = self.load();
        let list = lists.entry(period_id.to_string()).or_default();
        *list = ordered;
        renumber(period_id, list);
        self.save(&lists)
    }

    /// Move `dragged` to `target`'s position. Both tasks must be in the same
    /// period; otherwise nothing changes and `false` is returned.
    pub fn move_task(&self, dragged: i64, target: i64) -> Result<bool> {
        if dragged == target {
            return Ok(false);
        }
        let (Some(from), Some(to)) = (self.find(dragged), self.find(target)) else {
            return Ok(false);
        };
        if from.period_id != to.period_id {
            return Ok(false);
        }

        let mut list = self.list_tasks(&from.period_id);
        let (Some(from_index), Some(to_index)) = (
            list.iter().position(|t| t.id == dragged),
            list.iter().position(|t| t.id == target),
        ) else {
            return Ok(false);
        };
        let item = list.remove(from_index);
        list.insert(to_index, item);
        self.reorder(&from.period_id, list)?;
        Ok(true)
    }

    /// Tasks of one period sorted by `order` (ties keep stored order).
    pub fn list_tasks(&self, period_id: &str) -> Vec<Task> {
        let mut list = self.load().shift_remove(period_id).unwrap_or_default();
        list.sort_by_key(|t| t.order);
        list
    }

    /// Find a task in any period.
    pub fn find(&self, id: i64) -> Option<Task> {
        self.load()
            .into_values()
            .flatten()
            .find(|t| t.id == id)
    }
}

/// Fill `period_id` from the owning bucket and add missing buckets.
pub(crate) fn normalize(registry: &PeriodRegistry, stored: TaskLists) -> TaskLists {
    let mut lists: TaskLists = registry.ids().map(|id| (id.to_string(), Vec::new())).collect();
    for (period_id, mut tasks) in stored {
        for task in &mut tasks {
            task.period_id.clone_from(&period_id);
        }
        lists.insert(period_id, tasks);
    }
    lists
}

fn renumber(period_id: &str, list: &mut [Task]) {
    for (index, task) in list.iter_mut().enumerate() {
        task.order = u32::try_from(index).unwrap_or(u32::MAX);
        task.period_id = period_id.to_string();
    }
}

/// Creation timestamp, bumped past the largest existing id so two tasks
/// created in the same millisecond stay distinct.
fn next_id(now: DateTime<Utc>, lists: &TaskLists) -> i64 {
    let max_id = lists.values().flatten().map(|t| t.id).max();
    match max_id {
        Some(max) if max >= now.timestamp_millis() => max + 1,
        _ => now.timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{AFTER_SCHOOL, MORNING, NIGHT};

    fn setup() -> (Database, PeriodRegistry) {
        (Database::open_memory().unwrap(), PeriodRegistry::default())
    }

    #[test]
    fn add_assigns_append_order_and_defaults() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let now = Utc::now();
        let a = store.add_task(MORNING, "Wash face", now).unwrap();
        let b = store.add_task(MORNING, "Breakfast", now).unwrap();
        assert_eq!(a.order, 0);
        assert_eq!(b.order, 1);
        assert_ne!(a.id, b.id);
        assert_eq!(b.days_of_week.len(), 7);
        assert_eq!(b.continue_days, 0);
    }

    #[test]
    fn add_rejects_unknown_period_and_blank_text() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        assert!(store.add_task("lunch", "Eat", Utc::now()).is_err());
        assert!(store.add_task(NIGHT, "  ", Utc::now()).is_err());
    }

    #[test]
    fn load_includes_every_registered_period() {
        let (db, registry) = setup();
        let lists = TaskStore::new(&db, &registry).load();
        let ids: Vec<_> = lists.keys().map(String::as_str).collect();
        assert_eq!(ids, vec![MORNING, AFTER_SCHOOL, NIGHT]);
    }

    #[test]
    fn update_and_delete_report_missing_tasks() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let task = store.add_task(NIGHT, "Bath", Utc::now()).unwrap();

        assert!(store
            .update_task(NIGHT, task.id, TaskPatch::continue_days(3))
            .unwrap());
        assert_eq!(store.find(task.id).unwrap().continue_days, 3);
        assert!(!store
            .update_task(MORNING, task.id, TaskPatch::continue_days(1))
            .unwrap());

        assert!(store.delete_task(NIGHT, task.id).unwrap());
        assert!(!store.delete_task(NIGHT, task.id).unwrap());
        assert!(store.find(task.id).is_none());
    }

    #[test]
    fn update_rejects_empty_weekdays_without_writing() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let task = store.add_task(MORNING, "Dress", Utc::now()).unwrap();
        assert!(store
            .update_task(MORNING, task.id, TaskPatch::days_of_week(vec![]))
            .is_err());
        assert_eq!(store.find(task.id).unwrap().days_of_week.len(), 7);
    }

    #[test]
    fn move_task_reorders_within_period() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let now = Utc::now();
        let a = store.add_task(MORNING, "A", now).unwrap();
        store.add_task(MORNING, "B", now).unwrap();
        let c = store.add_task(MORNING, "C", now).unwrap();

        assert!(store.move_task(c.id, a.id).unwrap());
        let texts: Vec<_> = store
            .list_tasks(MORNING)
            .into_iter()
            .map(|t| (t.text, t.order))
            .collect();
        assert_eq!(
            texts,
            vec![("C".to_string(), 0), ("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn move_task_ignores_cross_period_moves() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let now = Utc::now();
        let a = store.add_task(MORNING, "A", now).unwrap();
        let b = store.add_task(NIGHT, "B", now).unwrap();
        assert!(!store.move_task(a.id, b.id).unwrap());
        assert_eq!(store.find(a.id).unwrap().period_id, MORNING);
    }

    #[test]
    fn reorder_rewrites_order_by_index() {
        let (db, registry) = setup();
        let store = TaskStore::new(&db, &registry);
        let now = Utc::now();
        store.add_task(NIGHT, "A", now).unwrap();
        store.add_task(NIGHT, "B", now).unwrap();
        let mut list = store.list_tasks(NIGHT);
        list.reverse();
        store.reorder(NIGHT, list).unwrap();
        let listed = store.list_tasks(NIGHT);
        assert_eq!(listed[0].text, "B");
        assert_eq!(listed[0].order, 0);
        assert_eq!(listed[1].order, 1);
    }

    #[test]
    fn tasks_in_unregistered_periods_survive_load() {
        let (db, registry) = setup();
        db.kv_set(keys::TODOS, r#"{"lunch":[{"id":5,"text":"Eat","order":0}]}"#)
            .unwrap();
        let lists = TaskStore::new(&db, &registry).load();
        assert_eq!(lists["lunch"][0].period_id, "lunch");
        assert_eq!(lists.len(), 4);
    }
}
