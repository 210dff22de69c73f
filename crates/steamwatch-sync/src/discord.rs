//! Discord notifier over the REST API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};

use crate::{Notifier, NotifyError, Readiness};

/// Channel types that accept plain text messages.
const TEXT_CHANNEL_TYPES: &[u8] = &[0, 1, 2, 3, 5, 10, 11, 12, 13];

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub token: String,
    pub channel_id: String,
    /// API root, without trailing slash.
    pub base_url: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            base_url: "https://discord.com/api/v10".into(),
        }
    }
}

/// Posts messages to one Discord channel as a bot.
pub struct DiscordNotifier {
    client: reqwest::Client,
    config: DiscordConfig,
    ready: AtomicBool,
    closed: AtomicBool,
}

#[derive(Deserialize)]
struct CurrentUser {
    username: String,
}

#[derive(Deserialize)]
struct Channel {
    #[serde(rename = "type")]
    kind: u8,
}

impl DiscordNotifier {
    /// Start the login handshake in the background.
    ///
    /// The returned [`Readiness`] resolves once the token and destination
    /// channel have been verified. Must be called inside a Tokio runtime.
    pub fn login(mut config: DiscordConfig) -> (Arc<Self>, Readiness) {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let notifier = Arc::new(Self {
            client: reqwest::Client::new(),
            config,
            ready: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        });
        let (signal, readiness) = Readiness::channel();
        let task = Arc::clone(&notifier);
        tokio::spawn(async move {
            let result = task.handshake().await;
            match &result {
                Ok(()) => task.ready.store(true, Ordering::Release),
                Err(e) => warn!(error = %e, "Discord login failed"),
            }
            signal.resolve(result);
        });
        (notifier, readiness)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.config.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.config.token),
            )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NotifyError> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn handshake(&self) -> Result<(), NotifyError> {
        let user: CurrentUser = self
            .get_json("/users/@me")
            .await
            .map_err(|e| NotifyError::Handshake(format!("token rejected: {e}")))?;
        let channel: Channel = self
            .get_json(&format!("/channels/{}", self.config.channel_id))
            .await
            .map_err(|e| NotifyError::Handshake(format!("channel lookup failed: {e}")))?;
        if !TEXT_CHANNEL_TYPES.contains(&channel.kind) {
            return Err(NotifyError::Handshake(format!(
                "channel {} is not text-based (type {})",
                self.config.channel_id, channel.kind
            )));
        }
        info!(bot = %user.username, channel_id = %self.config.channel_id, "Discord bot ready");
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(NotifyError::Closed);
        }
        if !self.ready.load(Ordering::Acquire) {
            return Err(NotifyError::NotReady);
        }
        let path = format!("/channels/{}/messages", self.config.channel_id);
        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "content": message }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Discord session closed");
        }
    }
}
