//! Outbound alert delivery.

pub mod line;
pub mod log;
pub mod templates;

pub use self::line::LineNotifier;
pub use self::log::LogNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{channel} rejected message with HTTP {status}: {body}")]
    Rejected {
        channel: String,
        status: u16,
        body: String,
    },

    #[error("notifier misconfigured: {0}")]
    Config(String),
}

/// A channel that accepts a plain-text message body.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), NotificationError>;

    fn name(&self) -> &str;
}
