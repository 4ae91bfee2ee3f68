use clap::Subcommand;
use everyday_todo_core::Config;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "notifications.username", "display.show_checked")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    let tracker = open_tracker()?;

    match action {
        ConfigAction::Get { key } => match tracker.config().get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = tracker.config();
            config.set(&key, &value)?;
            tracker.save_config(&config)?;
            println!("ok");
        }
        ConfigAction::List => print_json(&tracker.config())?,
        ConfigAction::Reset => {
            tracker.save_config(&Config::default())?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
