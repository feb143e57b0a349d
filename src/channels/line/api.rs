//! Raw LINE Messaging API calls

use secrecy::ExposeSecret;

use super::types::{LineErrorResponse, LineMessage, MAX_REPLY_MESSAGES, ReplyMessageRequest};
use crate::channels::ReplyPart;
use crate::{Error, Result};

impl super::LineChannel {
    /// Reply to an event using its reply token
    ///
    /// Reply tokens are single-use and expire shortly after the event; a stale or
    /// reused token is rejected by the platform.
    ///
    /// # Errors
    ///
    /// Returns error if the message list is invalid or the API request fails
    pub async fn reply_message(&self, reply_token: &str, parts: &[ReplyPart]) -> Result<()> {
        if reply_token.is_empty() {
            return Err(Error::Channel("empty reply token".to_string()));
        }
        if parts.is_empty() || parts.len() > MAX_REPLY_MESSAGES {
            return Err(Error::Channel(format!(
                "reply must contain 1 to {MAX_REPLY_MESSAGES} messages, got {}",
                parts.len()
            )));
        }

        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let request = ReplyMessageRequest {
            reply_token,
            messages: parts.iter().map(LineMessage::from).collect(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE reply error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<LineErrorResponse>(&body)
                .map_or(body, |e| e.summary());
            return Err(Error::Channel(format!("LINE reply error: {status} - {detail}")));
        }

        tracing::debug!(messages = parts.len(), "LINE reply sent");
        Ok(())
    }

    /// Download the binary content of a user message
    ///
    /// # Errors
    ///
    /// Returns error if the message ID is empty or the API request fails
    pub async fn get_message_content(&self, message_id: &str) -> Result<Vec<u8>> {
        if message_id.is_empty() {
            return Err(Error::Channel("empty message id".to_string()));
        }

        let url = format!("{}/v2/bot/message/{message_id}/content", self.data_api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| Error::Channel(format!("LINE content error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "LINE content error for message {message_id}: {status} - {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Channel(format!("LINE content read error: {e}")))?;

        tracing::debug!(message_id, bytes = bytes.len(), "LINE message content downloaded");
        Ok(bytes.to_vec())
    }
}
