pub mod discord;

pub use discord::DiscordWebhook;

use std::future::Future;

use crate::error::NotifyError;

/// Outbound notification target. Sends are fire-and-forget from the
/// tracker's point of view: local state is already persisted, failures are
/// only reported.
pub trait Notifier {
    /// Unique identifier (e.g. "discord").
    fn name(&self) -> &str;

    /// Whether a target is configured and enabled.
    fn is_configured(&self) -> bool;

    /// Deliver one message. Never retried.
    fn send(&self, content: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Sent by `notify test`.
pub const TEST_MESSAGE: &str = "🧪 Test message\nNotifications from Everyday Todo are working!";

pub fn check_message(period_label: &str, text: &str) -> String {
    format!("✅ **{period_label} todo done**\n{text}")
}

pub fn uncheck_message(period_label: &str, text: &str) -> String {
    format!("⬜ **{period_label} todo unchecked**\n{text}")
}
