use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::EnvFilter;

use polyglot_gateway::api::{ApiServer, ApiState};
use polyglot_gateway::storage::{self, AudioStore};
use polyglot_gateway::{
    Adapters, AzureSpeech, AzureTranslator, AzureWhisper, Config, LineChannel, Pipeline,
    PublicBaseUrl, Translator, WebhookVerifier, speech,
};

/// Polyglot - LINE voice message translation gateway
#[derive(Parser)]
#[command(name = "polyglot", version, about)]
struct Cli {
    /// Port to listen on (overrides config and POLYGLOT_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long, env = "POLYGLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio file with the configured Whisper deployment
    Transcribe {
        /// Audio file (m4a, mp3, wav, ...)
        file: PathBuf,
    },
    /// Translate text with the configured Translator resource
    Translate {
        /// Source-language text
        text: String,
    },
    /// Synthesize text to a WAV file with the configured voice
    Speak {
        /// Target-language text
        text: String,
        /// Output WAV path
        #[arg(short, long, default_value = "outputaudio.wav")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,polyglot_gateway=info",
        1 => "info,polyglot_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Command::Transcribe { file }) => transcribe(&config, &file).await,
        Some(Command::Translate { text }) => translate(&config, &text).await,
        Some(Command::Speak { text, output }) => speak(&config, &text, &output).await,
        None => serve(config).await,
    }
}

/// Run the webhook server until interrupted
async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(port = config.server.port, "starting polyglot gateway");

    let channel_secret = config.line.channel_secret.as_ref().ok_or_else(|| {
        anyhow::anyhow!("LINE channel secret required (set LINE_CHANNEL_SECRET)")
    })?;
    let verifier = WebhookVerifier::new(SecretString::from(
        channel_secret.expose_secret().to_string(),
    ));

    let public_base = config.public_base_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("public base URL required for audio replies (set POLYGLOT_PUBLIC_URL)")
    })?;
    let public_base = PublicBaseUrl::parse(public_base)?;

    let adapters = Adapters {
        channel: Arc::new(LineChannel::from_config(&config.line)?),
        transcriber: Arc::new(AzureWhisper::new(&config.whisper)?),
        translator: Arc::new(AzureTranslator::new(&config.translator)?),
        synthesizer: Arc::new(AzureSpeech::new(&config.speech)?),
    };

    let store = AudioStore::new(&config.server.static_dir);
    store.ensure_root()?;
    let _sweeper = storage::spawn_sweeper(store.clone(), config.storage);

    let pipeline = Pipeline::new(adapters, store, public_base).failure_reply(config.failure_reply);

    let server = ApiServer::new(
        ApiState {
            verifier,
            pipeline: Arc::new(pipeline),
        },
        config.server.port,
    );

    tracing::info!("polyglot gateway ready");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

/// Transcribe a local audio file
async fn transcribe(config: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    let whisper = AzureWhisper::new(&config.whisper)?;
    let text = speech::transcribe_file(&whisper, file).await?;
    println!("{text}");
    Ok(())
}

/// Translate a piece of text
async fn translate(config: &Config, text: &str) -> anyhow::Result<()> {
    let translator = AzureTranslator::new(&config.translator)?;
    let translated = translator.translate(text).await?;
    println!("{translated}");
    Ok(())
}

/// Synthesize text to a WAV file
async fn speak(config: &Config, text: &str, output: &std::path::Path) -> anyhow::Result<()> {
    let tts = AzureSpeech::new(&config.speech)?;
    let audio = speech::synthesize_to_file(&tts, text, output).await?;
    println!(
        "Wrote {} ({} ms, voice {})",
        audio.path.display(),
        audio.duration_ms,
        tts.voice()
    );
    Ok(())
}
