use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tapedeck_core::assembly::{AssemblyStage, HttpArtworkFetcher, LoftyTagWriter};
use tapedeck_core::catalog::{Credentials, WebCatalogClient};
use tapedeck_core::converter::{Converter, FfmpegConverter};
use tapedeck_core::recorder::SpawnedRecorder;
use tapedeck_core::{
    load_config, validate_config, Config, RunOrchestrator, RunRequest,
};

/// Records a remote playlist or album into tagged local audio files.
#[derive(Debug, Parser)]
#[command(name = "tapedeck", version, about)]
struct Args {
    /// Collection URI, e.g. spotify:playlist:<id> or spotify:album:<id>
    #[arg(long)]
    uri: String,

    /// Directory finished tracks are written into
    #[arg(long, short = 'o')]
    output_dir: PathBuf,

    /// Account username
    #[arg(long, env = "TAPEDECK_USERNAME")]
    username: String,

    /// Account password
    #[arg(long, env = "TAPEDECK_PASSWORD", hide_env_values = true)]
    password: String,

    /// Remove successfully recorded tracks from the source playlist
    #[arg(long)]
    purge: bool,

    /// Override the capture binary path
    #[arg(long)]
    recorder_binary: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => Config::default(),
    };

    if let Some(binary) = &args.recorder_binary {
        config.recorder.binary = binary.clone();
    }

    validate_config(&config).context("Configuration validation failed")?;

    let credentials = Credentials {
        username: args.username.clone(),
        password: args.password.clone(),
    };

    // Connect to the catalog service
    info!("Authenticating with the catalog service");
    let catalog = Arc::new(
        WebCatalogClient::connect(config.catalog.clone(), &credentials)
            .await
            .context("Failed to connect to the catalog service")?,
    );

    // Converter must be usable before any audio is captured
    let converter = FfmpegConverter::new(config.converter.clone());
    converter
        .validate()
        .await
        .context("FFmpeg is not available")?;

    let recorder = Arc::new(SpawnedRecorder::new(
        config.recorder.clone(),
        credentials,
        config.orchestrator.staging.raw_path.clone(),
    ));

    let assembly = AssemblyStage::new(
        Arc::new(converter),
        Arc::new(LoftyTagWriter),
        Arc::new(HttpArtworkFetcher::new()),
        config.assembly.clone(),
    );

    let orchestrator = RunOrchestrator::new(
        catalog,
        recorder,
        assembly,
        config.recorder.device_name.clone(),
        config.capture.clone(),
        config.locator.clone(),
        config.orchestrator.clone(),
    );

    let request = RunRequest {
        uri: args.uri.clone(),
        output_dir: args.output_dir.clone(),
        purge: args.purge,
    };

    let report = orchestrator.run(&request).await?;

    info!(
        tracks = report.tracks_recorded,
        files = report.files_in_output,
        purged = report.purged,
        "run complete"
    );
    println!(
        "Recorded {} of {} tracks into {}",
        report.tracks_recorded,
        report.tracks_total,
        args.output_dir.display()
    );

    Ok(())
}
