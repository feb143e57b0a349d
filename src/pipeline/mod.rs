//! Voice translation pipeline
//!
//! ```text
//! fetch audio → transcribe → translate → synthesize → reply
//! ```
//!
//! Each run owns a `RequestWorkspace`, so runs can proceed concurrently. Stages
//! run strictly in sequence. Fetch and transcription failures abort the run
//! without a reply; translation and synthesis failures are logged and the reply
//! carries whatever was produced before them.

pub mod reply;

use std::sync::Arc;

use crate::channels::{MessagingChannel, ReplyPart};
use crate::speech::{self, SynthesizedAudio, Synthesizer, Transcriber};
use crate::storage::{AudioStore, RequestWorkspace};
use crate::translate::Translator;
use crate::{Error, Result};

pub use reply::{PublicBaseUrl, compose_reply};

/// External services the pipeline is wired to
#[derive(Clone)]
pub struct Adapters {
    pub channel: Arc<dyn MessagingChannel>,
    pub transcriber: Arc<dyn Transcriber>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

/// What a completed audio run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Workspace ID of the run
    pub request_id: String,
    /// Recognized source-language text
    pub transcript: String,
    /// Target-language text, empty when translation failed
    pub translation: String,
    /// Synthesized reply audio, absent when synthesis was skipped or failed
    pub audio: Option<SynthesizedAudio>,
    /// Parts that were sent
    pub parts: Vec<ReplyPart>,
}

/// Voice translation pipeline
pub struct Pipeline {
    adapters: Adapters,
    store: AudioStore,
    public_base: PublicBaseUrl,
    failure_reply: Option<String>,
}

impl Pipeline {
    /// Create a pipeline
    #[must_use]
    pub const fn new(adapters: Adapters, store: AudioStore, public_base: PublicBaseUrl) -> Self {
        Self {
            adapters,
            store,
            public_base,
            failure_reply: None,
        }
    }

    /// Text sent to the user when a run aborts before a reply is composed
    #[must_use]
    pub fn failure_reply(mut self, text: Option<String>) -> Self {
        self.failure_reply = text;
        self
    }

    /// Audio workspace store
    #[must_use]
    pub const fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Echo a text message back verbatim
    ///
    /// # Errors
    ///
    /// Returns error if the reply is rejected
    pub async fn handle_text(&self, reply_token: &str, text: &str) -> Result<()> {
        tracing::info!(channel = self.adapters.channel.name(), text = %text, "echoing text message");
        self.adapters
            .channel
            .reply(reply_token, &[ReplyPart::Text(text.to_string())])
            .await
    }

    /// Run the full pipeline for a voice message
    ///
    /// # Errors
    ///
    /// Returns error if the audio cannot be fetched, stored or transcribed, or if
    /// the reply is rejected
    pub async fn handle_audio(&self, message_id: &str, reply_token: &str) -> Result<PipelineReport> {
        let workspace = self.store.workspace(message_id)?;
        tracing::info!(message_id, request_id = %workspace.id(), "processing voice message");

        let produced = self.produce(&workspace, message_id).await;
        workspace.remove_input().await;

        let report = match produced {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(request_id = %workspace.id(), error = %e, "voice pipeline aborted");
                self.send_failure_reply(reply_token).await;
                return Err(e);
            }
        };

        self.adapters.channel.reply(reply_token, &report.parts).await?;
        tracing::info!(
            request_id = %report.request_id,
            parts = report.parts.len(),
            "voice reply sent"
        );

        Ok(report)
    }

    /// Fetch, transcribe, translate and synthesize; compose but do not send
    async fn produce(&self, workspace: &RequestWorkspace, message_id: &str) -> Result<PipelineReport> {
        let audio = self.adapters.channel.fetch_content(message_id).await?;
        let input = workspace.persist_input(audio).await?;

        let transcript = speech::transcribe_file(self.adapters.transcriber.as_ref(), &input).await?;
        if transcript.trim().is_empty() {
            return Err(Error::Stt("no speech recognized".to_string()));
        }

        let translation = self.translate(&transcript).await;

        let synthesized = if translation.trim().is_empty() {
            None
        } else {
            self.synthesize(&translation, workspace).await
        };

        let audio_part = match &synthesized {
            Some(audio) => Some((
                self.public_base.static_url(&workspace.output_static_path())?,
                audio.duration_ms,
            )),
            None => None,
        };

        Ok(PipelineReport {
            request_id: workspace.id().to_string(),
            parts: compose_reply(&transcript, &translation, audio_part),
            transcript,
            translation,
            audio: synthesized,
        })
    }

    /// Translation never aborts the run; failures yield an empty translation
    async fn translate(&self, transcript: &str) -> String {
        match self.adapters.translator.translate(transcript).await {
            Ok(text) => text,
            Err(Error::Translation { code, message }) => {
                tracing::error!(
                    provider = self.adapters.translator.name(),
                    code = %code,
                    message = %message,
                    "translation failed"
                );
                String::new()
            }
            Err(e) => {
                tracing::error!(
                    provider = self.adapters.translator.name(),
                    error = %e,
                    "translation failed"
                );
                String::new()
            }
        }
    }

    async fn synthesize(&self, text: &str, workspace: &RequestWorkspace) -> Option<SynthesizedAudio> {
        let output = workspace.output_path();
        match speech::synthesize_to_file(self.adapters.synthesizer.as_ref(), text, &output).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::error!(
                    provider = self.adapters.synthesizer.name(),
                    error = %e,
                    "speech synthesis failed, replying without audio"
                );
                None
            }
        }
    }

    async fn send_failure_reply(&self, reply_token: &str) {
        let Some(text) = &self.failure_reply else {
            return;
        };
        if let Err(e) = self
            .adapters
            .channel
            .reply(reply_token, &[ReplyPart::Text(text.clone())])
            .await
        {
            tracing::warn!(error = %e, "failed to send failure reply");
        }
    }
}
