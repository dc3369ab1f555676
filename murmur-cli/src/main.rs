//! Command-line front end: transcribe one recorded WAV file and print the
//! result.
//!
//! The native engine library is resolved from the standard platform
//! locations unless `--library` candidates are given; `--stub` swaps in the
//! deterministic stub backend, which is handy for wiring checks on machines
//! without the engine installed.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use murmur_core::{StubEngine, Transcriber, TranscriberConfig};

/// Offline speech-to-text for recorded WAV files.
#[derive(Parser)]
#[command(name = "murmur")]
struct Cli {
    /// Path to the speech model file (e.g. ggml-base.en.bin).
    model: PathBuf,

    /// Path to the WAV file to transcribe (mono, 16-bit, ideally 16 kHz).
    audio: PathBuf,

    /// Native library path to try, in order. Repeatable.
    #[arg(long = "library", value_name = "PATH")]
    libraries: Vec<PathBuf>,

    /// Use the deterministic stub engine instead of the native library.
    #[arg(long)]
    stub: bool,

    /// Seconds to wait for a worker reply before giving up.
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    /// Emit the result as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> murmur_core::Result<()> {
    let mut config = TranscriberConfig {
        reply_timeout: Duration::from_secs(cli.timeout_secs),
        ..TranscriberConfig::default()
    };
    if !cli.libraries.is_empty() {
        config.library_candidates = cli.libraries.clone();
    }

    let transcriber = if cli.stub {
        Transcriber::spawn(StubEngine::new(), config)
    } else {
        Transcriber::native(config)
    };

    transcriber.initialize(&cli.model).await?;
    let result = transcriber.transcribe(&cli.audio).await?;

    if cli.json {
        let rendered = serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?;
        println!("{rendered}");
    } else if result.is_speech_detected() {
        println!("{}", result.text);
        if !result.keywords.is_empty() {
            println!("keywords: {}", result.keywords.join(", "));
        }
    } else {
        println!("(no speech detected)");
    }

    transcriber.dispose().await
}
