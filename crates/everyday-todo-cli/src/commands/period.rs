use chrono::Local;
use clap::Subcommand;
use everyday_todo_core::Period;
use serde_json::json;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum PeriodAction {
    /// List periods in resolution order and show which one is current
    List,
    /// Add a period or change an existing one
    Set {
        /// Period ID
        id: String,
        /// Start hour (0-23, inclusive)
        #[arg(long)]
        start: u8,
        /// End hour (0-23, exclusive); below start wraps past midnight
        #[arg(long)]
        end: u8,
        /// Display label
        #[arg(long)]
        label: Option<String>,
        /// Greeting shown while the period is current
        #[arg(long)]
        greeting: Option<String>,
    },
    /// Remove a period (its tasks are kept in storage)
    Remove {
        /// Period ID
        id: String,
    },
    /// Restore the default periods
    Reset,
}

pub fn run(action: PeriodAction) -> CmdResult {
    let mut tracker = open_tracker()?;

    match action {
        PeriodAction::List => {
            let current = tracker.current_period(&Local::now()).id.clone();
            print_json(&json!({
                "current": current,
                "periods": tracker.registry(),
            }))?;
        }
        PeriodAction::Set {
            id,
            start,
            end,
            label,
            greeting,
        } => {
            let existing = tracker.registry().get(&id).cloned();
            let label = label
                .or_else(|| existing.as_ref().map(|p| p.label.clone()))
                .unwrap_or_else(|| id.clone());
            let greeting = greeting
                .or_else(|| existing.map(|p| p.greeting))
                .unwrap_or_default();
            tracker.set_period(Period::new(id, start, end, label, greeting))?;
            print_json(tracker.registry())?;
        }
        PeriodAction::Remove { id } => {
            if !tracker.remove_period(&id)? {
                return Err(format!("unknown period: {id}").into());
            }
            println!("Period removed: {id}");
        }
        PeriodAction::Reset => {
            tracker.reset_periods()?;
            println!("periods reset to defaults");
        }
    }
    Ok(())
}
