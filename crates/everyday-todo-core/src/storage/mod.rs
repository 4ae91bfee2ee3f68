mod config;
pub mod database;

pub use config::{check_date_format, Config, DisplayConfig, NotificationsConfig, DEFAULT_USERNAME};
pub use database::Database;

use std::path::PathBuf;

use crate::error::StorageError;

/// Keys of the independently stored documents.
pub mod keys {
    /// Recurring tasks, one list per period id.
    pub const TODOS: &str = "todos";
    /// Date-ranged, non-recurring tasks.
    pub const ONE_TIME_TODOS: &str = "one_time_todos";
    /// Capped check/uncheck log.
    pub const LOGS: &str = "logs";
    /// Period registry override.
    pub const TIME_RANGES: &str = "time_ranges";
    /// Set once sample tasks have been written.
    pub const INITIALIZED: &str = "initialized";

    pub const ALL: [&str; 5] = [TODOS, ONE_TIME_TODOS, LOGS, TIME_RANGES, INITIALIZED];
}

/// Returns the data directory, creating it if needed.
///
/// `EVERYDAY_TODO_HOME` overrides the location outright. Otherwise this is
/// `~/.config/everyday-todo[-dev]/`, with `EVERYDAY_TODO_ENV=dev` selecting
/// the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("EVERYDAY_TODO_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("EVERYDAY_TODO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("everyday-todo-dev")
            } else {
                base_dir.join("everyday-todo")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
