//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use secrecy::SecretString;
use tempfile::TempDir;

use polyglot_gateway::api::{ApiServer, ApiState};
use polyglot_gateway::speech::samples_to_wav;
use polyglot_gateway::{
    Adapters, AudioStore, Error, MessagingChannel, Pipeline, PublicBaseUrl, ReplyPart, Result,
    Synthesizer, Transcriber, Translator, WebhookVerifier,
};

/// Channel secret used to sign test webhooks
pub const CHANNEL_SECRET: &str = "test-channel-secret";

/// Public base URL used by test pipelines
pub const PUBLIC_BASE: &str = "https://bot.example.com";

/// A reply the fake channel received
#[derive(Debug, Clone)]
pub struct SentReply {
    pub reply_token: String,
    pub parts: Vec<ReplyPart>,
}

/// In-memory messaging channel
#[derive(Default)]
pub struct FakeChannel {
    content: Mutex<HashMap<String, Vec<u8>>>,
    replies: Mutex<Vec<SentReply>>,
}

impl FakeChannel {
    /// Serve `bytes` as the content of `message_id`
    #[must_use]
    pub fn with_content(self, message_id: &str, bytes: &[u8]) -> Self {
        self.content
            .lock()
            .unwrap()
            .insert(message_id.to_string(), bytes.to_vec());
        self
    }

    /// Replies sent so far
    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingChannel for FakeChannel {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>> {
        tokio::task::yield_now().await;
        self.content
            .lock()
            .unwrap()
            .get(message_id)
            .cloned()
            .ok_or_else(|| Error::Channel(format!("404 Not Found: no content for {message_id}")))
    }

    async fn reply(&self, reply_token: &str, parts: &[ReplyPart]) -> Result<()> {
        self.replies.lock().unwrap().push(SentReply {
            reply_token: reply_token.to_string(),
            parts: parts.to_vec(),
        });
        Ok(())
    }
}

/// Transcriber that reads the audio bytes as UTF-8 text
#[derive(Default)]
pub struct FakeTranscriber {
    pub fail: bool,
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    fn name(&self) -> &'static str {
        "fake-stt"
    }

    async fn transcribe(&self, audio: &[u8], _file_name: &str) -> Result<String> {
        tokio::task::yield_now().await;
        if self.fail {
            return Err(Error::Stt("Whisper API error 503: service unavailable".to_string()));
        }
        Ok(String::from_utf8_lossy(audio).trim().to_string())
    }
}

/// Dictionary translator into Japanese
#[derive(Default)]
pub struct FakeTranslator {
    pub fail: bool,
}

#[async_trait]
impl Translator for FakeTranslator {
    fn name(&self) -> &'static str {
        "fake-translator"
    }

    async fn translate(&self, text: &str) -> Result<String> {
        tokio::task::yield_now().await;
        if self.fail {
            return Err(Error::Translation {
                code: "401000".to_string(),
                message: "The request is not authorized".to_string(),
            });
        }
        let translated = match text {
            "你好" => "こんにちは",
            "谢谢" => "ありがとう",
            "再见" => "さようなら",
            other => return Ok(format!("[ja] {other}")),
        };
        Ok(translated.to_string())
    }
}

/// Synthesizer producing 100ms of 16 kHz audio per character
#[derive(Default)]
pub struct ToneSynthesizer {
    pub fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl ToneSynthesizer {
    /// Synthesizer whose every request is canceled
    pub fn failing() -> Self {
        Self {
            fail: true,
            spoken: Mutex::default(),
        }
    }

    /// Texts synthesized so far
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for ToneSynthesizer {
    fn name(&self) -> &'static str {
        "tone"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.spoken.lock().unwrap().push(text.to_string());
        tokio::task::yield_now().await;
        if self.fail {
            return Err(Error::SynthesisCanceled {
                reason: "Error".to_string(),
                details: "429 Too Many Requests".to_string(),
            });
        }
        let frames = text.chars().count() * 1600;
        samples_to_wav(&vec![0.1; frames], 16_000)
    }
}

/// A pipeline wired to fakes over a temporary static root
pub struct Harness {
    pub dir: TempDir,
    pub channel: Arc<FakeChannel>,
    pub synthesizer: Arc<ToneSynthesizer>,
    pub pipeline: Arc<Pipeline>,
}

impl Harness {
    /// Build a harness with working fakes
    pub fn new(channel: FakeChannel) -> Self {
        Self::with_adapters(
            channel,
            FakeTranscriber::default(),
            FakeTranslator::default(),
            ToneSynthesizer::default(),
            None,
        )
    }

    /// Build a harness from explicit fakes
    pub fn with_adapters(
        channel: FakeChannel,
        transcriber: FakeTranscriber,
        translator: FakeTranslator,
        synthesizer: ToneSynthesizer,
        failure_reply: Option<&str>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path().join("static"));
        store.ensure_root().unwrap();

        let channel = Arc::new(channel);
        let synthesizer = Arc::new(synthesizer);
        let adapters = Adapters {
            channel: channel.clone(),
            transcriber: Arc::new(transcriber),
            translator: Arc::new(translator),
            synthesizer: synthesizer.clone(),
        };

        let pipeline = Pipeline::new(adapters, store, PublicBaseUrl::parse(PUBLIC_BASE).unwrap())
            .failure_reply(failure_reply.map(ToString::to_string));

        Self {
            dir,
            channel,
            synthesizer,
            pipeline: Arc::new(pipeline),
        }
    }

    /// HTTP router over this harness's pipeline
    pub fn router(&self) -> axum::Router {
        let state = ApiState {
            verifier: verifier(),
            pipeline: self.pipeline.clone(),
        };
        ApiServer::new(state, 0).router()
    }
}

/// Verifier for the test channel secret
pub fn verifier() -> WebhookVerifier {
    WebhookVerifier::new(SecretString::from(CHANNEL_SECRET.to_string()))
}

/// Webhook request signed with the test channel secret
pub fn signed_request(body: &str) -> Request<Body> {
    let signature = verifier().sign(body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/callback")
        .header("content-type", "application/json")
        .header("x-line-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Webhook body with the given events
pub fn payload(events: &[serde_json::Value]) -> String {
    serde_json::json!({
        "destination": "U0123456789abcdef",
        "events": events,
    })
    .to_string()
}

/// Text message event
pub fn text_event(reply_token: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "user", "userId": "U4af4980629" },
        "replyToken": reply_token,
        "message": { "id": "100", "type": "text", "text": text },
    })
}

/// Audio message event
pub fn audio_event(reply_token: &str, message_id: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "source": { "type": "user", "userId": "U4af4980629" },
        "replyToken": reply_token,
        "message": {
            "id": message_id,
            "type": "audio",
            "duration": 2000,
            "contentProvider": { "type": "line" },
        },
    })
}

/// Text of a reply part, panicking on audio
pub fn text_of(part: &ReplyPart) -> &str {
    match part {
        ReplyPart::Text(text) => text,
        ReplyPart::Audio { .. } => panic!("expected text part, got {part:?}"),
    }
}
