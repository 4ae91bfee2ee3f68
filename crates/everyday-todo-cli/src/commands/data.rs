//! Export, import and reset.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Subcommand;
use everyday_todo_core::Tracker;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write every document as one JSON bundle
    Export {
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace stored documents with those present in a bundle
    Import {
        /// Bundle file, or "-" for stdin
        file: PathBuf,
    },
    /// Check a bundle without writing anything
    Validate {
        /// Bundle file, or "-" for stdin
        file: PathBuf,
    },
    /// Delete all tasks, logs and periods and restore the default config
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn read_bundle(file: &Path) -> std::io::Result<String> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

pub fn run(action: DataAction) -> CmdResult {
    match action {
        DataAction::Export { output } => {
            let tracker = open_tracker()?;
            let json = serde_json::to_string_pretty(&tracker.export(Utc::now()))?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        DataAction::Import { file } => {
            let json = read_bundle(&file)?;
            let mut tracker = open_tracker()?;
            let summary = tracker.import(&json)?;
            print_json(&summary)?;
        }
        DataAction::Validate { file } => {
            let json = read_bundle(&file)?;
            print_json(&Tracker::validate_import(&json)?)?;
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset without --yes".into());
            }
            let mut tracker = open_tracker()?;
            tracker.reset_all()?;
            println!("all data reset");
        }
    }
    Ok(())
}
