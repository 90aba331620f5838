use async_trait::async_trait;
use tracing::info;

use crate::notifications::{NotificationError, Notifier};

/// Writes messages to the log instead of sending them. Used by `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotificationError> {
        info!(channel = "log", message = %text, "Dry-run notification");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
