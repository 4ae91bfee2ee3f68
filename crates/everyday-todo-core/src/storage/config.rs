//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Webhook notification target and display name
//! - Display options for the board
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, CoreError, Result};

/// Name posted with webhook messages when none is configured.
pub const DEFAULT_USERNAME: &str = "Todo Bot";

/// Webhook notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Discord-compatible webhook URL. Empty disables notifications.
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Board display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// List tasks that are already done under the open ones.
    #[serde(default = "default_true")]
    pub show_checked: bool,
    /// `chrono` format string for log timestamps.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`. Also reads the flat
/// `{ discordWebhookUrl, discordUsername }` object older exports carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigRepr")]
pub struct Config {
    pub notifications: NotificationsConfig,
    pub display: DisplayConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigRepr {
    Legacy(LegacyConfig),
    Sections(ConfigSections),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LegacyConfig {
    #[serde(default)]
    discord_webhook_url: Option<String>,
    #[serde(default)]
    discord_username: Option<String>,
}

#[derive(Deserialize)]
struct ConfigSections {
    #[serde(default)]
    notifications: NotificationsConfig,
    #[serde(default)]
    display: DisplayConfig,
}

impl TryFrom<ConfigRepr> for Config {
    type Error = String;

    fn try_from(repr: ConfigRepr) -> std::result::Result<Self, Self::Error> {
        let config = match repr {
            ConfigRepr::Legacy(legacy) => Config {
                notifications: NotificationsConfig {
                    webhook_url: legacy.discord_webhook_url.unwrap_or_default(),
                    username: legacy.discord_username.unwrap_or_else(default_username),
                    enabled: true,
                },
                display: DisplayConfig::default(),
            },
            ConfigRepr::Sections(sections) => Config {
                notifications: sections.notifications,
                display: sections.display,
            },
        };
        check_date_format(&config.display.date_format)?;
        Ok(config)
    }
}

/// Reject strftime strings `chrono` cannot render.
pub fn check_date_format(format: &str) -> std::result::Result<(), String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("'{format}' is not a valid date format"));
    }
    Ok(())
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}
fn default_true() -> bool {
    true
}
fn default_date_format() -> String {
    "%Y/%m/%d %H:%M:%S".to_string()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: default_username(),
            enabled: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_checked: true,
            date_format: default_date_format(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Load from `path`, writing defaults there when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from `path`, returning defaults on any error.
    pub fn load_or_default_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, preserving the field's type.
    /// The caller persists the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        if key == "notifications.webhook_url" && !value.is_empty() {
            url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        }
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Configured username, or [`DEFAULT_USERNAME`] when blank.
    pub fn username(&self) -> &str {
        let name = self.notifications.username.trim();
        if name.is_empty() {
            DEFAULT_USERNAME
        } else {
            name
        }
    }
}
