//! Discord webhook notifier -- posts `{ username, content }` as JSON.

use reqwest::Client;
use serde_json::json;

use super::Notifier;
use crate::error::NotifyError;
use crate::storage::Config;

pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
    username: String,
    enabled: bool,
}

impl DiscordWebhook {
    pub fn new(webhook_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
            username: username.into(),
            enabled: true,
        }
    }

    /// Build from the `[notifications]` config section.
    pub fn from_config(config: &Config) -> Self {
        let mut webhook = Self::new(config.notifications.webhook_url.trim(), config.username());
        webhook.enabled = config.notifications.enabled;
        webhook
    }
}

impl Notifier for DiscordWebhook {
    fn name(&self) -> &str {
        "discord"
    }

    fn is_configured(&self) -> bool {
        self.enabled && !self.webhook_url.is_empty()
    }

    async fn send(&self, content: &str) -> Result<(), NotifyError> {
        if !self.is_configured() {
            tracing::warn!("webhook URL not configured, skipping notification");
            return Err(NotifyError::NotConfigured);
        }

        let url = url::Url::parse(&self.webhook_url).map_err(|e| NotifyError::InvalidUrl {
            url: self.webhook_url.clone(),
            message: e.to_string(),
        })?;

        let body = json!({ "username": self.username, "content": content });
        let resp = self.client.post(url).json(&body).send().await?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "notification sent");
            Ok(())
        } else {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "notification failed");
            Err(NotifyError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}
