//! Error types for Polyglot gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Webhook signature missing or invalid
    #[error("signature error: {0}")]
    Signature(String),

    /// Messaging channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Request workspace / audio file error
    #[error("storage error: {0}")]
    Storage(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Translation service error
    #[error("translation error {code}: {message}")]
    Translation { code: String, message: String },

    /// Text-to-speech error raised before the service was reached
    #[error("TTS error: {0}")]
    Tts(String),

    /// Speech synthesis canceled by the service
    #[error("speech synthesis canceled ({reason}): {details}")]
    SynthesisCanceled { reason: String, details: String },

    /// Audio decoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
