//! Core error types for everyday-todo-core.
//!
//! This module defines the error hierarchy using thiserror. Storage parse
//! failures are usually recovered by the callers (falling back to a default
//! document), so most of these only surface for writes, imports and the
//! webhook.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for everyday-todo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Webhook notification errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Bundle import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the document store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Unknown period id
    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    /// Empty text or collection
    #[error("Empty value: {0}")]
    Empty(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Task not found
    #[error("Task not found: {0}")]
    TaskNotFound(i64),
}

/// Webhook notification errors. Never retried.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No webhook URL configured
    #[error("webhook URL not configured")]
    NotConfigured,

    /// Webhook URL failed to parse
    #[error("invalid webhook URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Non-success HTTP status
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network-level failure
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Bundle import errors. Nothing is written when any of these is returned.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Input was not valid JSON
    #[error("malformed JSON: {0}")]
    Parse(String),

    /// One or more top-level fields had the wrong shape
    #[error("bundle validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
