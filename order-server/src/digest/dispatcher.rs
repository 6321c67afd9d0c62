//! Digest delivery over an outbound messaging channel
//!
//! Delivery never fails loudly: every error is logged and folded into
//! `false`, so a missed message cannot take down the caller.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Default CallMeBot WhatsApp gateway
pub const DEFAULT_API_URL: &str = "https://api.callmebot.com/whatsapp.php";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Messaging channel not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Gateway rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// "Send text to a recipient" capability
#[async_trait::async_trait]
pub trait MessageChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_text(&self, recipient: &Recipient, text: &str) -> Result<(), DispatchError>;
}

/// Who receives the digest, and the credential the gateway wants for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub phone: String,
    pub api_key: String,
}

/// WhatsApp gateway reached with a plain GET
///
/// Query parameters: `phone`, `text`, `apikey`. The api key is never logged.
#[derive(Debug, Clone)]
pub struct HttpMessageChannel {
    http: reqwest::Client,
    api_url: String,
}

impl HttpMessageChannel {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl MessageChannel for HttpMessageChannel {
    fn name(&self) -> &'static str {
        "whatsapp-http"
    }

    async fn send_text(&self, recipient: &Recipient, text: &str) -> Result<(), DispatchError> {
        let resp = self
            .http
            .get(&self.api_url)
            .query(&[
                ("phone", recipient.phone.as_str()),
                ("text", text),
                ("apikey", recipient.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Digest dispatcher (process singleton)
#[derive(Clone)]
pub struct DigestDispatcher {
    channel: Arc<dyn MessageChannel>,
    phone: Option<String>,
    api_key: Option<String>,
}

impl std::fmt::Debug for DigestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestDispatcher")
            .field("channel", &self.channel.name())
            .field("phone", &self.phone)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DigestDispatcher {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        phone: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            channel,
            phone: phone.filter(|v| !v.trim().is_empty()),
            api_key: api_key.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.recipient().is_ok()
    }

    fn recipient(&self) -> Result<Recipient, DispatchError> {
        let phone = self
            .phone
            .clone()
            .ok_or(DispatchError::NotConfigured("WHATSAPP_PHONE is not set"))?;
        let api_key = self
            .api_key
            .clone()
            .ok_or(DispatchError::NotConfigured("WHATSAPP_API_KEY is not set"))?;
        Ok(Recipient { phone, api_key })
    }

    /// Try to deliver `text`. Returns whether the channel accepted it.
    pub async fn send(&self, text: &str) -> bool {
        match self.try_send(text).await {
            Ok(()) => {
                tracing::info!(channel = self.channel.name(), chars = text.chars().count(), "Digest delivered");
                true
            }
            Err(e @ DispatchError::NotConfigured(_)) => {
                tracing::warn!(error = %e, "Digest not sent");
                false
            }
            Err(e) => {
                tracing::error!(channel = self.channel.name(), error = %e, "Digest delivery failed");
                false
            }
        }
    }

    async fn try_send(&self, text: &str) -> Result<(), DispatchError> {
        let recipient = self.recipient()?;
        self.channel.send_text(&recipient, text).await
    }
}
