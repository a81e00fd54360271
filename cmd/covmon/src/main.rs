//! covmon - Semantic coverage monitor.
//!
//! Tails the message log, scores each new beat against the clip index
//! and reports how well the library covers incoming messages. The JSON
//! report is written on shutdown.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use mosaic_embed::{EmbedConfig, OpenAI};
use mosaic_monitor::{log_end_position, read_new_messages, CoverageSession};
use mosaic_retrieval::{search, ClipIndex};
use mosaic_text::split_into_beats;

/// Monitor message logs and report semantic clip coverage.
#[derive(Parser, Debug)]
#[command(name = "covmon")]
#[command(about = "Monitor message logs and report semantic clip coverage")]
struct Args {
    /// Catalog JSON path
    #[arg(long, default_value = "clips/micro_clips.json")]
    catalog: PathBuf,

    /// Message log file to tail
    #[arg(long, default_value = "messages.log")]
    log: PathBuf,

    /// Coverage report output path
    #[arg(long, default_value = "semantic_coverage_report.json")]
    report: PathBuf,

    /// Stricter similarity threshold for coverage analysis
    #[arg(short, long, default_value_t = 0.75)]
    threshold: f64,

    /// Seconds between log polls
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Embedding model name
    #[arg(long)]
    embed_model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    base_url: Option<String>,
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

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => bail!("OPENAI_API_KEY is not set"),
    };
    if !args.catalog.exists() {
        bail!(
            "no clip catalog found at {}, run clipparse first",
            args.catalog.display()
        );
    }

    let mut cfg = EmbedConfig::default();
    if let Some(model) = &args.embed_model {
        cfg = cfg.with_model(model);
    }
    if let Some(url) = &args.base_url {
        cfg = cfg.with_base_url(url);
    }
    let embedder = OpenAI::with_config(&api_key, cfg);

    let index = ClipIndex::load(&args.catalog, &embedder).await?;

    let mut cursor = log_end_position(&args.log);
    if cursor > 0 {
        info!(bytes = cursor, "skipped to end of log, waiting for new messages");
    }
    info!(
        log = %args.log.display(),
        interval = args.interval,
        threshold = args.threshold,
        "polling, press Ctrl+C to stop"
    );

    let mut session = CoverageSession::new(args.threshold);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("stopping coverage monitor");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs_f64(args.interval)) => {
                let (messages, next) = read_new_messages(&args.log, cursor)?;
                cursor = next;
                if messages.is_empty() {
                    continue;
                }
                info!(count = messages.len(), "new messages");
                for msg in &messages {
                    for beat in split_into_beats(msg) {
                        let hits =
                            search::find_best_clips(&index, &embedder, &beat, 1, 0.0).await?;
                        let best = hits
                            .first()
                            .map(|h| f64::from(h.similarity).max(0.0))
                            .unwrap_or(0.0);
                        let covered = session.record(&beat, best);
                        info!(
                            similarity = format!("{best:.2}"),
                            covered,
                            beat = %beat,
                            "beat scored"
                        );
                    }
                }
            }
        }
    }

    session.save_report(&args.report)?;
    Ok(())
}
