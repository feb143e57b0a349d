//! LINE Messaging API request/response types

use serde::{Deserialize, Serialize};

use crate::channels::ReplyPart;

/// Maximum message objects per reply
pub(crate) const MAX_REPLY_MESSAGES: usize = 5;

/// Reply request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplyMessageRequest<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<LineMessage<'a>>,
}

/// Outgoing message object
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum LineMessage<'a> {
    Text {
        text: &'a str,
    },
    Audio {
        #[serde(rename = "originalContentUrl")]
        original_content_url: &'a str,
        /// Length in milliseconds
        duration: u64,
    },
}

impl<'a> From<&'a ReplyPart> for LineMessage<'a> {
    fn from(part: &'a ReplyPart) -> Self {
        match part {
            ReplyPart::Text(text) => Self::Text { text },
            ReplyPart::Audio { url, duration_ms } => Self::Audio {
                original_content_url: url,
                duration: *duration_ms,
            },
        }
    }
}

/// Error body returned by the Messaging API
#[derive(Debug, Deserialize)]
pub(crate) struct LineErrorResponse {
    pub message: String,
    #[serde(default)]
    pub details: Vec<LineErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Deserialize)]
pub(crate) struct LineErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
}

impl LineErrorResponse {
    /// Flatten into a single log-friendly line
    pub fn summary(&self) -> String {
        let details: Vec<String> = self
            .details
            .iter()
            .map(|d| {
                format!(
                    "{}: {}",
                    d.property.as_deref().unwrap_or("-"),
                    d.message.as_deref().unwrap_or("-")
                )
            })
            .collect();

        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join(", "))
        }
    }
}
