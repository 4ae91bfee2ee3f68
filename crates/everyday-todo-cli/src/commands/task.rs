//! Recurring task commands.

use chrono::{Local, Utc};
use clap::Subcommand;
use everyday_todo_core::visibility::describe_days;
use everyday_todo_core::{TaskPatch, Tracker, ValidationError};

use super::now::parse_instant;
use super::{open_tracker, print_json, send_notification, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a period
    Add {
        /// Period ID (e.g. "morning", "afterSchool", "night")
        period: String,
        /// Task text
        text: String,
        /// Comma-separated weekdays, Sunday = 0
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        /// Extra days a completion stays valid
        #[arg(long)]
        continue_days: Option<u32>,
    },
    /// List tasks
    List {
        /// Only this period
        #[arg(long)]
        period: Option<String>,
        /// Human-readable output
        #[arg(long)]
        text: bool,
    },
    /// Update a task
    Update {
        /// Task ID
        id: i64,
        /// New text
        #[arg(long)]
        text: Option<String>,
        /// Comma-separated weekdays, Sunday = 0
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        /// Extra days a completion stays valid (0 disables)
        #[arg(long)]
        continue_days: Option<u32>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
    /// Check the task, or uncheck it if already done
    Toggle {
        /// Task ID
        id: i64,
        /// Toggle at this RFC 3339 instant instead of the local clock
        #[arg(long, value_parser = parse_instant)]
        at: Option<chrono::DateTime<chrono::FixedOffset>>,
        /// Skip the webhook notification
        #[arg(long)]
        quiet: bool,
    },
    /// Move a task to another task's position in the same period
    Move {
        /// Task to move
        id: i64,
        /// Task whose position it takes
        target: i64,
    },
}

fn period_of(tracker: &Tracker, id: i64) -> Result<String, ValidationError> {
    tracker
        .tasks()
        .find(id)
        .map(|t| t.period_id)
        .ok_or(ValidationError::TaskNotFound(id))
}

pub fn run(action: TaskAction) -> CmdResult {
    let tracker = open_tracker()?;
    let store = tracker.tasks();

    match action {
        TaskAction::Add {
            period,
            text,
            days,
            continue_days,
        } => {
            let patch = TaskPatch {
                days_of_week: days,
                continue_days,
                ..TaskPatch::default()
            }
            .validated()?;
            let task = store.add_task(&period, &text, Utc::now())?;
            if !patch.is_empty() {
                store.update_task(&period, task.id, patch)?;
            }
            let task = store.find(task.id).unwrap_or(task);
            print_json(&task)?;
        }
        TaskAction::List { period, text } => {
            let periods: Vec<String> = match period {
                Some(p) => vec![p],
                None => tracker.registry().ids().map(str::to_string).collect(),
            };
            if text {
                for period_id in &periods {
                    let label = tracker
                        .registry()
                        .get(period_id)
                        .map_or(period_id.as_str(), |p| p.label.as_str());
                    println!("{label}:");
                    for task in store.list_tasks(period_id) {
                        let continues = if task.continue_days > 0 {
                            format!(", +{}d", task.continue_days)
                        } else {
                            String::new()
                        };
                        println!(
                            "  {:<14} {}  [{}{continues}]",
                            task.id,
                            task.text,
                            describe_days(&task.days_of_week)
                        );
                    }
                }
            } else {
                let lists: Vec<_> = periods
                    .iter()
                    .flat_map(|p| store.list_tasks(p))
                    .collect();
                print_json(&lists)?;
            }
        }
        TaskAction::Update {
            id,
            text,
            days,
            continue_days,
        } => {
            let patch = TaskPatch {
                text,
                days_of_week: days,
                continue_days,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            let period = period_of(&tracker, id)?;
            store.update_task(&period, id, patch)?;
            if let Some(task) = store.find(id) {
                print_json(&task)?;
            }
        }
        TaskAction::Delete { id } => {
            let period = period_of(&tracker, id)?;
            store.delete_task(&period, id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Toggle { id, at, quiet } => {
            let outcome = match at {
                Some(at) => tracker.toggle(id, &at)?,
                None => tracker.toggle(id, &Local::now())?,
            };
            print_json(&outcome)?;
            if !quiet {
                send_notification(&tracker, &outcome.message);
            }
        }
        TaskAction::Move { id, target } => {
            if store.move_task(id, target)? {
                let period = period_of(&tracker, id)?;
                print_json(&store.list_tasks(&period))?;
            } else {
                return Err(format!("cannot move {id} onto {target}").into());
            }
        }
    }
    Ok(())
}
