pub mod config;
pub mod data;
pub mod log;
pub mod notify;
pub mod now;
pub mod once;
pub mod period;
pub mod task;
pub mod watch;

use chrono::Local;
use everyday_todo_core::{DiscordWebhook, Notifier, Tracker};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the tracker and run startup housekeeping (first-run seeding and
/// expired one-time task cleanup).
pub fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    let tracker = Tracker::open()?;
    let report = tracker.startup(&Local::now())?;
    if report.seeded || report.expired_removed > 0 {
        tracing::debug!(?report, "startup housekeeping");
    }
    Ok(tracker)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run a future to completion on a single-threaded runtime.
pub fn block_on<F: std::future::Future>(fut: F) -> Result<F::Output, Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(fut))
}

/// Send `message` through the configured webhook. Failures are reported on
/// stderr; local state is already saved.
pub fn send_notification(tracker: &Tracker, message: &str) {
    let webhook = DiscordWebhook::from_config(&tracker.config());
    if !webhook.is_configured() {
        return;
    }
    match block_on(webhook.send(message)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("notification failed: {e}"),
        Err(e) => eprintln!("notification failed: {e}"),
    }
}
