//! LINE channel adapter
//!
//! Receives events through the webhook and uses the Messaging API for replies
//! and message content downloads

mod api;
pub(crate) mod types;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;

use super::{MessagingChannel, ReplyPart};
use crate::config::LineConfig;
use crate::{Error, Result};

/// LINE Messaging API channel adapter
pub struct LineChannel {
    client: Client,
    access_token: SecretString,
    api_base: String,
    data_api_base: String,
}

impl LineChannel {
    /// Create a channel against custom API bases
    #[must_use]
    pub fn with_base_urls(access_token: SecretString, api_base: &str, data_api_base: &str) -> Self {
        Self {
            client: Client::new(),
            access_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            data_api_base: data_api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a channel from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the channel access token is not configured
    pub fn from_config(config: &LineConfig) -> Result<Self> {
        use secrecy::ExposeSecret;

        let token = config.channel_access_token.as_ref().ok_or_else(|| {
            Error::Config(
                "LINE channel access token required (set LINE_CHANNEL_ACCESS_TOKEN)".to_string(),
            )
        })?;

        Ok(Self::with_base_urls(
            SecretString::from(token.expose_secret().to_string()),
            &config.api_base,
            &config.data_api_base,
        ))
    }
}

#[async_trait]
impl MessagingChannel for LineChannel {
    fn name(&self) -> &'static str {
        "line"
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>> {
        self.get_message_content(message_id).await
    }

    async fn reply(&self, reply_token: &str, parts: &[ReplyPart]) -> Result<()> {
        self.reply_message(reply_token, parts).await
    }
}
