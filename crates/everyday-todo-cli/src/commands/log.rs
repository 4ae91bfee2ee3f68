use std::fmt::Write as _;

use chrono::Local;
use clap::Subcommand;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum LogCommand {
    /// Show recent check/uncheck entries, newest first
    List {
        /// Maximum number of entries
        #[arg(long)]
        limit: Option<usize>,
        /// Human-readable output
        #[arg(long)]
        text: bool,
    },
    /// Delete the whole log
    Clear,
}

pub fn run(action: LogCommand) -> CmdResult {
    let tracker = open_tracker()?;
    let log = tracker.log();

    match action {
        LogCommand::List { limit, text } => {
            let entries = log.recent(limit);
            if !text {
                return print_json(&entries);
            }
            let format = tracker.config().display.date_format;
            let mut out = String::new();
            for entry in entries {
                let label = tracker
                    .registry()
                    .get(&entry.period)
                    .map_or(entry.period.as_str(), |p| p.label.as_str());
                writeln!(
                    out,
                    "{}  {:<7}  {}  ({label})",
                    entry.timestamp.with_timezone(&Local).format(&format),
                    entry.action,
                    entry.todo_text
                )?;
            }
            print!("{out}");
        }
        LogCommand::Clear => {
            log.clear()?;
            println!("log cleared");
        }
    }
    Ok(())
}
