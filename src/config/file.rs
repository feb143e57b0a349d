//! TOML configuration file loading
//!
//! Supports `~/.config/polyglot/config.toml` (or an explicit path) as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct PolyglotConfigFile {
    /// LINE Messaging API channel
    #[serde(default)]
    pub line: LineFileConfig,

    /// Azure OpenAI Whisper deployment
    #[serde(default)]
    pub whisper: WhisperFileConfig,

    /// Azure Translator
    #[serde(default)]
    pub translator: TranslatorFileConfig,

    /// Azure Speech synthesis
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Public deployment settings
    #[serde(default)]
    pub deploy: DeployFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Request workspace retention
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// Pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineFileConfig,
}

/// LINE channel credentials
#[derive(Debug, Default, Deserialize)]
pub struct LineFileConfig {
    pub channel_secret: Option<String>,
    pub channel_access_token: Option<String>,
    /// Messaging API base (reply endpoint)
    pub api_base: Option<String>,
    /// Data API base (message content endpoint)
    pub data_api_base: Option<String>,
}

/// Whisper transcription settings
#[derive(Debug, Default, Deserialize)]
pub struct WhisperFileConfig {
    /// Azure OpenAI resource base URL
    pub base: Option<String>,
    pub key: Option<String>,
    pub api_version: Option<String>,
    pub deployment: Option<String>,
    /// Source language (ISO 639-1)
    pub language: Option<String>,
    pub temperature: Option<f32>,
}

/// Translator settings
#[derive(Debug, Default, Deserialize)]
pub struct TranslatorFileConfig {
    pub endpoint: Option<String>,
    pub key: Option<String>,
    pub region: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// Speech synthesis settings
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    pub key: Option<String>,
    pub region: Option<String>,
    /// Full synthesis endpoint, overrides the region-derived one
    pub endpoint: Option<String>,
    /// Voice name (e.g. "ja-JP-NanamiNeural")
    pub voice: Option<String>,
    pub output_format: Option<String>,
}

/// Deployment settings
#[derive(Debug, Default, Deserialize)]
pub struct DeployFileConfig {
    /// Public HTTPS base URL the platform fetches audio from
    pub public_base_url: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// HTTP server port
    pub port: Option<u16>,

    /// Directory served under `/static`
    pub static_dir: Option<String>,
}

/// Workspace retention
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    pub retention_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// Pipeline behavior
#[derive(Debug, Default, Deserialize)]
pub struct PipelineFileConfig {
    /// Text sent to the user when the pipeline aborts
    pub failure_reply: Option<String>,
}

/// Load the TOML config file
///
/// An explicit path must exist and parse. Without one, the standard path is tried
/// and `PolyglotConfigFile::default()` is returned if it is absent or unreadable.
///
/// # Errors
///
/// Returns error if an explicitly given file cannot be read or parsed
pub fn load_config_file(explicit: Option<&Path>) -> Result<PolyglotConfigFile> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(PolyglotConfigFile::default());
    };

    if !path.exists() {
        return Ok(PolyglotConfigFile::default());
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                PolyglotConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            PolyglotConfigFile::default()
        }
    };

    Ok(config)
}

/// Return the config file path: `~/.config/polyglot/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("polyglot").join("config.toml"))
}
