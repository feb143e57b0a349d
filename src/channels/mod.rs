//! Messaging channel adapters
//!
//! The pipeline talks to the messaging platform through the `MessagingChannel` trait.

mod line;

use async_trait::async_trait;

pub use line::LineChannel;

use crate::Result;

/// One part of a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPart {
    /// Plain text message
    Text(String),
    /// Audio message fetched by the platform from a public URL
    Audio {
        /// Fully-qualified HTTPS URL
        url: String,
        /// Length in milliseconds
        duration_ms: u64,
    },
}

/// Messaging platform operations used by the gateway
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &'static str;

    /// Download the binary content of an inbound message
    ///
    /// # Errors
    ///
    /// Returns error if the content cannot be retrieved
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>>;

    /// Reply to an inbound event, consuming its reply token
    ///
    /// # Errors
    ///
    /// Returns error if the reply is rejected
    async fn reply(&self, reply_token: &str, parts: &[ReplyPart]) -> Result<()>;
}
