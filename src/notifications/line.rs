//! LINE Messaging API broadcast channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::notifications::{NotificationError, Notifier};

pub const DEFAULT_BASE_URL: &str = "https://api.line.me";
const BROADCAST_PATH: &str = "/v2/bot/message/broadcast";

#[derive(Debug, Serialize)]
struct BroadcastRequest<'a> {
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

pub struct LineNotifier {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineNotifier {
    pub fn new(access_token: impl Into<String>) -> Result<Self, NotificationError> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(NotificationError::Config("LINE access token is empty".to_string()));
        }
        Ok(Self {
            base_url: base_url.into(),
            access_token,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), BROADCAST_PATH)
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotificationError> {
        let payload = BroadcastRequest {
            messages: [TextMessage { kind: "text", text }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!(channel = "line", "Notification delivered");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!(channel = "line", status = status.as_u16(), body = %body, "Notification rejected");
        Err(NotificationError::Rejected {
            channel: self.name().to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &str {
        "line"
    }
}
