use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum OnceAction {
    /// Add a one-time task for an inclusive date range
    Add {
        /// Task text
        text: String,
        /// First day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD), defaults to the start day
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List one-time tasks
    List {
        /// Only tasks active today
        #[arg(long)]
        today: bool,
    },
    /// Mark done, or not done if already done
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Delete a one-time task
    Delete {
        /// Task ID
        id: i64,
    },
    /// Remove tasks whose range ended before today
    Cleanup,
}

pub fn run(action: OnceAction) -> CmdResult {
    let tracker = open_tracker()?;
    let store = tracker.one_time();
    let today = Local::now().date_naive();

    match action {
        OnceAction::Add { text, start, end } => {
            let start = start.unwrap_or(today);
            let end = end.unwrap_or(start);
            let task = store.add(&text, start, end, Utc::now())?;
            print_json(&task)?;
        }
        OnceAction::List { today: only_today } => {
            let tasks = if only_today {
                store.active_on(today)
            } else {
                store.list()
            };
            print_json(&tasks)?;
        }
        OnceAction::Toggle { id } => match store.toggle(id, Utc::now())? {
            Some(task) => print_json(&task)?,
            None => return Err(format!("one-time task not found: {id}").into()),
        },
        OnceAction::Delete { id } => {
            if !store.delete(id)? {
                return Err(format!("one-time task not found: {id}").into());
            }
            println!("One-time task deleted: {id}");
        }
        OnceAction::Cleanup => {
            let removed = store.cleanup_expired(today)?;
            println!("{}", serde_json::json!({ "removed": removed }));
        }
    }
    Ok(())
}
