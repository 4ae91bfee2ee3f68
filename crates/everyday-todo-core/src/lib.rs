//! # Everyday Todo Core Library
//!
//! Core logic for a personal recurring-task tracker. Tasks belong to
//! time-of-day periods (morning, after school, night by default) and count as
//! done only inside the current occurrence of their period's window, or for a
//! fixed number of calendar days when continuation is set.
//!
//! The CLI is a thin layer over this library; every user action lives here.
//!
//! ## Architecture
//!
//! - **Periods**: ordered registry of hour ranges, possibly wrapping past
//!   midnight, plus pure resolution and window functions
//! - **Completion / Visibility**: pure predicates over a task and a clock reading
//! - **Storage**: SQLite key-value store of whole JSON documents and a
//!   TOML configuration file
//! - **Notify**: webhook notifications sent after local state is saved
//! - **Bundle**: full-state JSON export and validated import
//!
//! ## Key Components
//!
//! - [`Tracker`]: façade implementing the user actions
//! - [`PeriodRegistry`] and [`resolve_period`] / [`window_for`]
//! - [`is_done`] and [`is_visible_today`]
//! - [`Database`]: document persistence
//! - [`Config`]: application configuration management

pub mod activity_log;
pub mod bundle;
pub mod completion;
pub mod error;
pub mod notify;
pub mod period;
pub mod storage;
pub mod task;
pub mod tracker;
pub mod visibility;

pub use activity_log::{ActivityLog, LogAction, LogEntry};
pub use bundle::{ExportBundle, ImportPlan, ImportSummary};
pub use completion::{elapsed_days, is_done};
pub use error::{ConfigError, CoreError, ImportError, NotifyError, StorageError, ValidationError};
pub use notify::{DiscordWebhook, Notifier};
pub use period::{resolve_hour, resolve_period, window_for, Period, PeriodRegistry, Window};
pub use storage::{Config, Database};
pub use task::{OneTimeTask, Task, TaskPatch};
pub use tracker::{Board, BoardItem, BoardScope, StartupReport, ToggleOutcome, Tracker};
pub use visibility::{is_visible_today, weekday_index};
