use std::time::Duration;

use chrono::{Local, Timelike};
use clap::Args;
use everyday_todo_core::{BoardScope, Tracker};

use super::{block_on, now, open_tracker, CmdResult};

#[derive(Args)]
pub struct WatchArgs {
    /// Only tasks of the current period
    #[arg(long)]
    pub current: bool,
    /// Seconds between clock checks
    #[arg(long, default_value = "1")]
    pub interval: u64,
}

pub fn run(args: WatchArgs) -> CmdResult {
    let tracker = open_tracker()?;
    let scope = now::scope(args.current);
    let period = Duration::from_secs(args.interval.max(1));
    block_on(watch(tracker, scope, period))?
}

/// Re-render whenever the current period or the hour changes.
async fn watch(tracker: Tracker, scope: BoardScope, period: Duration) -> CmdResult {
    let mut ticker = tokio::time::interval(period);
    let mut shown: Option<(String, u32)> = None;
    loop {
        ticker.tick().await;
        let clock = Local::now();
        let key = (tracker.current_period(&clock).id.clone(), clock.hour());
        if shown.as_ref() == Some(&key) {
            continue;
        }
        tracing::debug!(period = %key.0, hour = key.1, "re-rendering board");
        let board = tracker.board(&clock, scope);
        let text = now::render(&board, &clock, &tracker.config())?;
        print!("\x1b[2J\x1b[H{text}");
        shown = Some(key);
    }
}
