//! clipparse - Transcribe raw recordings and slice them into micro-clips.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use mosaic_asr::{OpenAI, Transcriber};
use mosaic_catalog::{dedupe_exact, store, BuilderConfig, CatalogBuilder};

/// Build the micro-clip catalog from a folder of raw audio files.
#[derive(Parser, Debug)]
#[command(name = "clipparse")]
#[command(about = "Transcribe and slice raw recordings into a micro-clip catalog")]
struct Args {
    /// Folder of raw audio files to process
    #[arg(long, default_value = "clips/raw")]
    input: PathBuf,

    /// Folder to save sliced clip WAVs
    #[arg(long, default_value = "clips/sliced")]
    output: PathBuf,

    /// Catalog JSON path
    #[arg(long, default_value = "clips/micro_clips.json")]
    catalog: PathBuf,

    /// Transcription model
    #[arg(long, default_value = "whisper-1")]
    model: String,

    /// OpenAI-compatible API base URL (e.g. a local whisper server)
    #[arg(long)]
    base_url: Option<String>,

    /// Re-process all files even if unchanged
    #[arg(long)]
    force: bool,

    /// Just deduplicate the existing catalog without re-processing
    #[arg(long)]
    dedupe: bool,

    /// Skip the FFmpeg voice-channel filter chain on exported clips
    #[arg(long)]
    no_voice_channel: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    if args.dedupe {
        return dedupe_only(&args);
    }

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => bail!("OPENAI_API_KEY is not set"),
    };

    let transcriber: Arc<dyn Transcriber> = match &args.base_url {
        Some(url) => Arc::new(OpenAI::with_base_url(&api_key, url)),
        None => Arc::new(OpenAI::new(&api_key)),
    };

    let mut config = BuilderConfig::default()
        .with_model(&args.model)
        .with_force(args.force);
    if args.no_voice_channel {
        config.voice_channel_mode = false;
    }

    let builder = CatalogBuilder::new(transcriber, config);
    let catalog = builder.run(&args.input, &args.output, &args.catalog).await?;
    info!(
        clips = catalog.total_clips,
        catalog = %args.catalog.display(),
        "done"
    );
    Ok(())
}

/// Re-run the exact-text pass and orphan cleanup over an existing
/// catalog, no transcription involved.
fn dedupe_only(args: &Args) -> Result<()> {
    if !args.catalog.exists() {
        info!("no catalog found, nothing to deduplicate");
        return Ok(());
    }

    let mut catalog = store::load(&args.catalog)?;
    let before = catalog.clips.len();
    info!(clips = before, "loaded catalog, deduplicating");

    catalog.clips = dedupe_exact(catalog.clips);
    catalog.total_clips = catalog.clips.len();

    store::cleanup_orphans(&args.output, &catalog)?;
    store::save(&args.catalog, &catalog)?;
    info!(
        before,
        after = catalog.total_clips,
        removed = before - catalog.total_clips,
        "deduplication complete"
    );
    Ok(())
}
