//! Azure Speech text-to-speech synthesis

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::Synthesizer;
use crate::config::SpeechConfig;
use crate::{Error, Result};

/// Azure Speech REST synthesizer producing WAV audio
pub struct AzureSpeech {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    voice: String,
    output_format: String,
}

impl AzureSpeech {
    /// Create a synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if the key or region/endpoint is missing, or the output
    /// format is not a RIFF (WAV) format
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = config
            .key
            .as_ref()
            .ok_or_else(|| Error::Config("Azure Speech key required for TTS".to_string()))?;

        if !config.output_format.starts_with("riff-") {
            return Err(Error::Config(format!(
                "speech output format must be a RIFF format, got {}",
                config.output_format
            )));
        }

        Ok(Self {
            client: Client::new(),
            endpoint: config.synthesis_endpoint()?,
            api_key: SecretString::from(api_key.expose_secret().to_string()),
            voice: config.voice.clone(),
            output_format: config.output_format.clone(),
        })
    }

    /// Voice used for synthesis
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }
}

/// Build the SSML document for a voice
///
/// The `xml:lang` is taken from the voice name prefix (e.g. `ja-JP-NanamiNeural`).
#[must_use]
pub fn build_ssml(voice: &str, text: &str) -> String {
    let lang = voice
        .splitn(3, '-')
        .take(2)
        .collect::<Vec<_>>()
        .join("-");
    format!(
        "<speak version='1.0' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape_xml(&lang),
        escape_xml(voice),
        escape_xml(text)
    )
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl Synthesizer for AzureSpeech {
    fn name(&self) -> &'static str {
        "azure-speech"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let ssml = build_ssml(&self.voice, text);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose_secret())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.output_format)
            .header("User-Agent", concat!("polyglot-gateway/", env!("CARGO_PKG_VERSION")))
            .body(ssml)
            .send()
            .await
            .map_err(|e| Error::SynthesisCanceled {
                reason: "Error".to_string(),
                details: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SynthesisCanceled {
                reason: "Error".to_string(),
                details: format!("{status}: {body}"),
            });
        }

        let audio = response.bytes().await.map_err(|e| Error::SynthesisCanceled {
            reason: "Error".to_string(),
            details: format!("failed to read audio: {e}"),
        })?;

        if audio.is_empty() {
            return Err(Error::SynthesisCanceled {
                reason: "EndOfStream".to_string(),
                details: "service returned no audio".to_string(),
            });
        }

        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> SpeechConfig {
        SpeechConfig {
            key: Some(SecretString::from("speech-key".to_string())),
            region: None,
            endpoint: Some(endpoint.to_string()),
            voice: "ja-JP-NanamiNeural".to_string(),
            output_format: "riff-24khz-16bit-mono-pcm".to_string(),
        }
    }

    #[test]
    fn test_ssml_escapes_text() {
        let ssml = build_ssml("ja-JP-NanamiNeural", "a < b & 'c'");
        assert_eq!(
            ssml,
            "<speak version='1.0' xml:lang='ja-JP'><voice name='ja-JP-NanamiNeural'>a &lt; b &amp; &apos;c&apos;</voice></speak>"
        );
    }

    #[test]
    fn test_requires_riff_format() {
        let mut cfg = config("http://localhost/tts");
        cfg.output_format = "audio-24khz-48kbitrate-mono-mp3".to_string();
        assert!(matches!(AzureSpeech::new(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_requires_key() {
        let mut cfg = config("http://localhost/tts");
        cfg.key = None;
        assert!(AzureSpeech::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cognitiveservices/v1")
            .match_header("Ocp-Apim-Subscription-Key", "speech-key")
            .match_header("X-Microsoft-OutputFormat", "riff-24khz-16bit-mono-pcm")
            .match_body(mockito::Matcher::Regex("ja-JP-NanamiNeural".to_string()))
            .with_status(200)
            .with_body([1u8, 2, 3, 4])
            .create_async()
            .await;

        let tts = AzureSpeech::new(&config(&format!("{}/cognitiveservices/v1", server.url())))
            .unwrap();
        let audio = tts.synthesize("こんにちは").await.unwrap();

        mock.assert_async().await;
        assert_eq!(audio, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_service_error_is_cancellation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cognitiveservices/v1")
            .with_status(429)
            .with_body("Too many requests")
            .create_async()
            .await;

        let tts = AzureSpeech::new(&config(&format!("{}/cognitiveservices/v1", server.url())))
            .unwrap();
        let result = tts.synthesize("こんにちは").await;

        mock.assert_async().await;
        match result {
            Err(Error::SynthesisCanceled { reason, details }) => {
                assert_eq!(reason, "Error");
                assert!(details.contains("429"));
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }
}
