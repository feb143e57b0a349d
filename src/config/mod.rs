//! Configuration management for Polyglot gateway

pub mod file;

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::{Error, Result};

use file::PolyglotConfigFile;

/// Default LINE Messaging API base
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

/// Default LINE data API base (message content)
pub const DEFAULT_LINE_DATA_API_BASE: &str = "https://api-data.line.me";

/// Default Translator endpoint
pub const DEFAULT_TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

/// Polyglot gateway configuration
#[derive(Debug)]
pub struct Config {
    /// LINE channel configuration
    pub line: LineConfig,

    /// Whisper transcription configuration
    pub whisper: WhisperConfig,

    /// Translator configuration
    pub translator: TranslatorConfig,

    /// Speech synthesis configuration
    pub speech: SpeechConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Request workspace retention
    pub storage: StorageConfig,

    /// Public HTTPS base URL for synthesized audio (e.g. "https://bot.example.com")
    pub public_base_url: Option<String>,

    /// Text sent to the user when the audio pipeline aborts
    pub failure_reply: Option<String>,
}

/// LINE Messaging API channel configuration
#[derive(Debug)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures
    pub channel_secret: Option<SecretString>,

    /// Long-lived channel access token
    pub channel_access_token: Option<SecretString>,

    /// Messaging API base URL
    pub api_base: String,

    /// Data API base URL
    pub data_api_base: String,
}

/// Azure OpenAI Whisper configuration
#[derive(Debug)]
pub struct WhisperConfig {
    /// Resource base URL (e.g. "https://my-resource.openai.azure.com")
    pub base: Option<String>,

    /// API key
    pub key: Option<SecretString>,

    /// API version query parameter
    pub api_version: String,

    /// Whisper deployment name
    pub deployment: String,

    /// Source language (ISO 639-1)
    pub language: String,

    /// Sampling temperature, lower is more literal
    pub temperature: f32,
}

/// Azure Translator configuration
#[derive(Debug)]
pub struct TranslatorConfig {
    /// Service endpoint
    pub endpoint: String,

    /// Subscription key
    pub key: Option<SecretString>,

    /// Resource region
    pub region: Option<String>,

    /// Optional explicit source language; auto-detected when absent
    pub source_language: Option<String>,

    /// Target language
    pub target_language: String,
}

/// Azure Speech configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Subscription key
    pub key: Option<SecretString>,

    /// Resource region (e.g. "japaneast")
    pub region: Option<String>,

    /// Explicit endpoint, overrides the region-derived one
    pub endpoint: Option<String>,

    /// Synthesis voice name
    pub voice: String,

    /// `X-Microsoft-OutputFormat` value, must be a RIFF (WAV) format
    pub output_format: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory served under `/static`; request workspaces live here
    pub static_dir: PathBuf,
}

/// Request workspace retention
#[derive(Debug, Clone, Copy)]
pub struct StorageConfig {
    /// Age after which a request workspace is deleted
    pub retention_secs: u64,

    /// How often the sweeper runs
    pub sweep_interval_secs: u64,
}

impl SpeechConfig {
    /// Synthesis endpoint URL
    ///
    /// # Errors
    ///
    /// Returns error if neither an endpoint nor a region is configured
    pub fn synthesis_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        self.region
            .as_ref()
            .map(|region| format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"))
            .ok_or_else(|| Error::Config("Azure Speech region or endpoint required".to_string()))
    }
}

impl Config {
    /// Load configuration from the environment and the TOML file
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given config file cannot be loaded
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("POLYGLOT_CONFIG").ok().map(PathBuf::from));
        let fc = file::load_config_file(explicit.as_deref())?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if a numeric environment override cannot be parsed
    pub fn from_sources<F>(fc: PolyglotConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |name: &str, fallback: Option<String>| {
            env(name)
                .or(fallback)
                .filter(|s| !s.is_empty())
                .map(SecretString::from)
        };

        let line = LineConfig {
            channel_secret: secret("LINE_CHANNEL_SECRET", fc.line.channel_secret),
            channel_access_token: secret("LINE_CHANNEL_ACCESS_TOKEN", fc.line.channel_access_token),
            api_base: fc
                .line
                .api_base
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string()),
            data_api_base: fc
                .line
                .data_api_base
                .unwrap_or_else(|| DEFAULT_LINE_DATA_API_BASE.to_string()),
        };

        let whisper = WhisperConfig {
            base: env("AZURE_OPENAI_BASE").or(fc.whisper.base),
            key: secret("AZURE_OPENAI_KEY", fc.whisper.key),
            api_version: env("AZURE_OPENAI_VERSION")
                .or(fc.whisper.api_version)
                .unwrap_or_else(|| "2024-06-01".to_string()),
            deployment: env("AZURE_WHISPER_DEPLOYMENT")
                .or(fc.whisper.deployment)
                .unwrap_or_else(|| "whisper".to_string()),
            language: fc.whisper.language.unwrap_or_else(|| "zh".to_string()),
            temperature: fc.whisper.temperature.unwrap_or(0.0),
        };

        let translator = TranslatorConfig {
            endpoint: env("AZURE_TRANSLATOR_ENDPOINT")
                .or(fc.translator.endpoint)
                .unwrap_or_else(|| DEFAULT_TRANSLATOR_ENDPOINT.to_string()),
            key: secret("AZURE_TRANSLATOR_KEY", fc.translator.key),
            region: env("AZURE_TRANSLATOR_REGION").or(fc.translator.region),
            source_language: fc.translator.source_language,
            target_language: fc
                .translator
                .target_language
                .unwrap_or_else(|| "ja".to_string()),
        };

        let speech = SpeechConfig {
            key: secret("AZURE_SPEECH_KEY", fc.speech.key),
            region: env("AZURE_SPEECH_REGION").or(fc.speech.region),
            endpoint: fc.speech.endpoint,
            voice: fc
                .speech
                .voice
                .unwrap_or_else(|| "ja-JP-NanamiNeural".to_string()),
            output_format: fc
                .speech
                .output_format
                .unwrap_or_else(|| "riff-24khz-16bit-mono-pcm".to_string()),
        };

        let port = match env("POLYGLOT_PORT").or_else(|| env("PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("invalid port {raw:?}: {e}")))?,
            None => fc.server.port.unwrap_or(5000),
        };

        let server = ServerConfig {
            port,
            static_dir: env("POLYGLOT_STATIC_DIR")
                .or(fc.server.static_dir)
                .map_or_else(|| PathBuf::from("static"), PathBuf::from),
        };

        let storage = StorageConfig {
            retention_secs: fc.storage.retention_secs.unwrap_or(86_400),
            sweep_interval_secs: fc.storage.sweep_interval_secs.unwrap_or(600),
        };

        Ok(Self {
            line,
            whisper,
            translator,
            speech,
            server,
            storage,
            public_base_url: env("POLYGLOT_PUBLIC_URL").or(fc.deploy.public_base_url),
            failure_reply: fc.pipeline.failure_reply.filter(|s| !s.is_empty()),
        })
    }
}
