//! Azure OpenAI Whisper transcription

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::Transcriber;
use crate::config::WhisperConfig;
use crate::{Error, Result};

/// Whisper deployment on Azure OpenAI
pub struct AzureWhisper {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    language: String,
    temperature: f32,
}

impl AzureWhisper {
    /// Create a transcriber for a deployment
    ///
    /// # Errors
    ///
    /// Returns error if the resource base or API key is missing
    pub fn new(config: &WhisperConfig) -> Result<Self> {
        let base = config
            .base
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                Error::Config("Azure OpenAI base URL required for Whisper".to_string())
            })?;
        let api_key = config
            .key
            .as_ref()
            .ok_or_else(|| Error::Config("Azure OpenAI API key required for Whisper".to_string()))?;

        let endpoint = format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            base.trim_end_matches('/'),
            config.deployment,
            config.api_version,
        );

        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            language: config.language.clone(),
            temperature: config.temperature,
        })
    }

    /// Full transcription endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// MIME type for an audio file name
    fn mime_for_file_name(file_name: &str) -> &'static str {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "mp3" => "audio/mpeg",
            "m4a" | "mp4" => "audio/mp4",
            "wav" => "audio/wav",
            "webm" => "audio/webm",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl Transcriber for AzureWhisper {
    fn name(&self) -> &'static str {
        "azure-whisper"
    }

    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), file_name, "starting Whisper transcription");

        let part = Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(Self::mime_for_file_name(file_name))
            .map_err(|e| Error::Stt(format!("invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("language", self.language.clone())
            .text("temperature", self.temperature.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                Error::Stt(format!("Whisper request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Stt(format!("failed to parse Whisper response: {e}")))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text.trim().to_string())
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> WhisperConfig {
        WhisperConfig {
            base: Some(base.to_string()),
            key: Some(SecretString::from("whisper-key".to_string())),
            api_version: "2024-06-01".to_string(),
            deployment: "whisper".to_string(),
            language: "zh".to_string(),
            temperature: 0.0,
        }
    }

    #[test]
    fn test_endpoint_layout() {
        let whisper = AzureWhisper::new(&config("https://res.openai.azure.com/")).unwrap();
        assert_eq!(
            whisper.endpoint(),
            "https://res.openai.azure.com/openai/deployments/whisper/audio/transcriptions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let mut cfg = config("https://res.openai.azure.com");
        cfg.key = None;
        assert!(matches!(AzureWhisper::new(&cfg), Err(Error::Config(_))));

        let mut cfg = config("https://res.openai.azure.com");
        cfg.base = None;
        assert!(matches!(AzureWhisper::new(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_mime_for_file_name() {
        assert_eq!(AzureWhisper::mime_for_file_name("output.m4a"), "audio/mp4");
        assert_eq!(AzureWhisper::mime_for_file_name("clip.MP3"), "audio/mpeg");
        assert_eq!(AzureWhisper::mime_for_file_name("a.wav"), "audio/wav");
        assert_eq!(
            AzureWhisper::mime_for_file_name("noext"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_transcribe_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/whisper/audio/transcriptions")
            .match_query(mockito::Matcher::UrlEncoded(
                "api-version".into(),
                "2024-06-01".into(),
            ))
            .match_header("api-key", "whisper-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": " 你好 "}"#)
            .create_async()
            .await;

        let whisper = AzureWhisper::new(&config(&server.url())).unwrap();
        let text = whisper.transcribe(&[0u8; 64], "output.m4a").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "你好");
    }

    #[tokio::test]
    async fn test_transcribe_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/whisper/audio/transcriptions")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"code":"401","message":"Access denied"}}"#)
            .create_async()
            .await;

        let whisper = AzureWhisper::new(&config(&server.url())).unwrap();
        let result = whisper.transcribe(&[0u8; 16], "output.m4a").await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Stt(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_transcribe_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/whisper/audio/transcriptions")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let whisper = AzureWhisper::new(&config(&server.url())).unwrap();
        let result = whisper.transcribe(&[0u8; 16], "output.m4a").await;

        mock.assert_async().await;
        assert!(result.unwrap_err().to_string().contains("parse"));
    }
}
