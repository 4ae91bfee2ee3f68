use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use clap::Args;
use everyday_todo_core::{Board, BoardScope, Config};

use super::{open_tracker, print_json, CmdResult};

#[derive(Args)]
pub struct NowArgs {
    /// Only tasks of the current period
    #[arg(long)]
    pub current: bool,
    /// Evaluate at this RFC 3339 instant instead of the local clock
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<FixedOffset>>,
    /// Print a human-readable board instead of JSON
    #[arg(long)]
    pub text: bool,
}

pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid RFC 3339 time '{s}': {e}"))
}

pub fn scope(current: bool) -> BoardScope {
    if current {
        BoardScope::CurrentPeriod
    } else {
        BoardScope::AllPeriods
    }
}

pub fn run(args: NowArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let scope = scope(args.current);
    match args.at {
        Some(at) => show(&tracker.board(&at, scope), &at, args.text, &tracker.config()),
        None => {
            let now = Local::now();
            show(&tracker.board(&now, scope), &now, args.text, &tracker.config())
        }
    }
}

fn show<Tz: TimeZone>(board: &Board, now: &DateTime<Tz>, text: bool, config: &Config) -> CmdResult
where
    Tz::Offset: std::fmt::Display,
{
    if text {
        print!("{}", render(board, now, config)?);
        Ok(())
    } else {
        print_json(board)
    }
}

/// Plain-text board. Fails if the configured date format cannot be rendered.
pub fn render<Tz: TimeZone>(
    board: &Board,
    now: &DateTime<Tz>,
    config: &Config,
) -> Result<String, std::fmt::Error>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    writeln!(out, "{} ({})", board.greeting, board.label)?;
    writeln!(out, "{}", now.format(&config.display.date_format))?;
    out.push('\n');

    if board.unchecked.is_empty() && board.checked.is_empty() {
        out.push_str("No tasks for today.\n");
    } else if board.all_done() {
        out.push_str("All done!\n");
    }

    for item in &board.unchecked {
        writeln!(
            out,
            "[ ] {:<14} {}  ({})",
            item.task.id,
            item.task.text,
            item.period_label
        )?;
    }
    if config.display.show_checked {
        for item in &board.checked {
            writeln!(
                out,
                "[x] {:<14} {}  ({})",
                item.task.id,
                item.task.text,
                item.period_label
            )?;
        }
    }

    if !board.one_time.is_empty() {
        out.push_str("\nOne-time:\n");
        for task in &board.one_time {
            let mark = if task.is_done() { "x" } else { " " };
            writeln!(
                out,
                "[{mark}] {:<14} {}  ({} - {})",
                task.id, task.text, task.start_date, task.end_date
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_board() -> Board {
        Board {
            period_id: "morning".to_string(),
            label: "Morning".to_string(),
            greeting: "Good morning".to_string(),
            weekday: 3,
            unchecked: Vec::new(),
            checked: Vec::new(),
            one_time: Vec::new(),
        }
    }

    #[test]
    fn render_includes_formatted_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 9, 30, 0).unwrap();
        let text = render(&empty_board(), &now, &Config::default()).unwrap();
        assert!(text.contains("2025/06/11 09:30:00"), "{text}");
        assert!(text.contains("No tasks for today."));
    }

    #[test]
    fn render_reports_unrenderable_date_format() {
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 9, 30, 0).unwrap();
        let mut config = Config::default();
        config.display.date_format = "%Q".to_string();
        assert!(render(&empty_board(), &now, &config).is_err());
    }
}
