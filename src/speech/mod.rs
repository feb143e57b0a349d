//! Speech-to-text and text-to-speech
//!
//! Providers implement `Transcriber` / `Synthesizer`; the free functions here
//! move audio between the request workspace and a provider.

mod audio;
mod tts;
mod whisper;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use audio::{samples_to_wav, wav_duration_ms};
pub use tts::{AzureSpeech, build_ssml};
pub use whisper::AzureWhisper;

use crate::{Error, Result};

/// Speech-to-text provider
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Transcribe encoded audio; `file_name` carries the container extension
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String>;
}

/// Text-to-speech provider
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Synthesize text to WAV bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::SynthesisCanceled` if the service cancels synthesis
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Synthesized audio on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// WAV file location
    pub path: PathBuf,
    /// Length in milliseconds
    pub duration_ms: u64,
}

/// Transcribe the audio file at `path`
///
/// # Errors
///
/// Returns error if the file cannot be read or transcription fails
pub async fn transcribe_file(transcriber: &dyn Transcriber, path: &Path) -> Result<String> {
    let audio = tokio::fs::read(path).await.map_err(|e| {
        Error::Storage(format!("failed to read {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio.m4a");

    tracing::debug!(provider = transcriber.name(), path = %path.display(), "transcribing");
    transcriber.transcribe(&audio, file_name).await
}

/// Synthesize `text` to `output`, overwriting it, and measure the result
///
/// # Errors
///
/// Returns error if the text is empty, synthesis is canceled, or the WAV cannot
/// be written or measured
pub async fn synthesize_to_file(
    synthesizer: &dyn Synthesizer,
    text: &str,
    output: &Path,
) -> Result<SynthesizedAudio> {
    if text.trim().is_empty() {
        return Err(Error::Tts("nothing to synthesize".to_string()));
    }

    let audio = synthesizer.synthesize(text).await.inspect_err(|e| {
        if let Error::SynthesisCanceled { reason, details } = e {
            tracing::warn!(
                provider = synthesizer.name(),
                reason = %reason,
                details = %details,
                "speech synthesis canceled"
            );
        }
    })?;

    tokio::fs::write(output, &audio).await.map_err(|e| {
        Error::Storage(format!("failed to write {}: {e}", output.display()))
    })?;

    let wav_path = output.to_path_buf();
    let duration_ms = tokio::task::spawn_blocking(move || wav_duration_ms(&wav_path))
        .await
        .map_err(|e| Error::Audio(format!("duration task failed: {e}")))??;
    tracing::info!(path = %output.display(), duration_ms, "speech synthesis complete");

    Ok(SynthesizedAudio {
        path: output.to_path_buf(),
        duration_ms,
    })
}
