use clap::Subcommand;
use everyday_todo_core::notify::TEST_MESSAGE;
use everyday_todo_core::{DiscordWebhook, Notifier};

use super::{block_on, open_tracker, CmdResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Send a test message to the configured webhook
    Test,
}

pub fn run(action: NotifyAction) -> CmdResult {
    let tracker = open_tracker()?;

    match action {
        NotifyAction::Test => {
            let webhook = DiscordWebhook::from_config(&tracker.config());
            block_on(webhook.send(TEST_MESSAGE))??;
            println!("test message sent via {}", webhook.name());
        }
    }
    Ok(())
}
