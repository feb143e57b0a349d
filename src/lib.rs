//! Polyglot Gateway - voice message translation for LINE
//!
//! A user sends a voice message to the bot; the gateway fetches the audio,
//! transcribes it, translates the transcript, synthesizes the translation as
//! speech, and replies with the transcript, the translation and a playable
//! audio link.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 LINE Messaging API                   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /callback (signed)
//! ┌────────────────────▼────────────────────────────────┐
//! │                Polyglot Gateway                      │
//! │  Webhook │ Pipeline │ Workspaces │ GET /static/...   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Azure services                      │
//! │   Whisper (STT)  │  Translator  │  Speech (TTS)      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod speech;
pub mod storage;
pub mod translate;

pub use channels::{LineChannel, MessagingChannel, ReplyPart};
pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Adapters, Pipeline, PipelineReport, PublicBaseUrl};
pub use security::WebhookVerifier;
pub use speech::{AzureSpeech, AzureWhisper, SynthesizedAudio, Synthesizer, Transcriber};
pub use storage::{AudioStore, RequestWorkspace};
pub use translate::{AzureTranslator, Translator};
