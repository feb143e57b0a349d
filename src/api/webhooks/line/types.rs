//! LINE webhook types

use serde::Deserialize;

/// Webhook request body
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Bot user ID the events are addressed to
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// Webhook event (simplified)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    /// User sent a message
    Message(MessageEvent),
    /// Follow, unfollow, postback and the rest
    #[serde(other)]
    Unsupported,
}

/// Message event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent when the channel is in standby mode
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: MessageContent,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub timestamp: i64,
    /// "active" or "standby"
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
    #[serde(default)]
    pub delivery_context: Option<DeliveryContext>,
}

/// Message content by type
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text(TextMessage),
    Audio(AudioMessage),
    /// Images, stickers, locations and the rest
    #[serde(other)]
    Unsupported,
}

/// Text message
#[derive(Debug, Deserialize)]
pub struct TextMessage {
    pub id: String,
    pub text: String,
}

/// Audio (voice) message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMessage {
    pub id: String,
    /// Length in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub content_provider: Option<ContentProvider>,
}

/// Where message content is hosted
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProvider {
    /// "line" or "external"
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub original_content_url: Option<String>,
}

/// Event source
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// "user", "group" or "room"
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Delivery metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    pub is_redelivery: bool,
}
