//! clipdedupe - Find and remove duplicate audio clips.
//!
//! Compares actual audio content, so duplicates are caught even with
//! different filenames or transcriptions. Preview is the default; pass
//! --delete to actually remove anything.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use mosaic_catalog::store;
use mosaic_dedupe::{apply, scan, DuplicateKind, DEFAULT_THRESHOLD};

/// Find and remove duplicate audio clips.
#[derive(Parser, Debug)]
#[command(name = "clipdedupe")]
#[command(about = "Find and remove duplicate audio clips by content")]
struct Args {
    /// Directory of sliced clip WAVs
    #[arg(long, default_value = "clips/sliced")]
    clips_dir: PathBuf,

    /// Catalog JSON path
    #[arg(long, default_value = "clips/micro_clips.json")]
    catalog: PathBuf,

    /// Waveform similarity threshold (0.0-1.0)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Actually delete duplicates (default is preview only)
    #[arg(short, long)]
    delete: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    if !args.catalog.exists() {
        bail!(
            "no catalog found at {}, run clipparse first",
            args.catalog.display()
        );
    }
    let mut catalog = store::load(&args.catalog)?;

    let report = scan(&args.clips_dir, &catalog, args.threshold)?;
    if report.duplicates.is_empty() {
        info!("library is clean, no duplicates found");
        return Ok(());
    }

    println!("Found {} duplicate(s):\n", report.duplicates.len());
    for (i, d) in report.duplicates.iter().enumerate() {
        let tag = match d.kind {
            DuplicateKind::Exact => "EXACT".to_string(),
            DuplicateKind::Waveform => format!("{:.0}%", d.similarity * 100.0),
        };
        println!("  {}. [{tag}]", i + 1);
        println!(
            "     KEEP:   {}  \"{}\"",
            d.keep.clip_file,
            truncate(&d.keep.text, 50)
        );
        println!(
            "     REMOVE: {}  \"{}\"\n",
            d.remove.clip_file,
            truncate(&d.remove.text, 50)
        );
    }

    if !args.delete {
        info!(
            count = report.duplicates.len(),
            "preview only, run with --delete to remove duplicates"
        );
        return Ok(());
    }

    let deleted = apply(&args.clips_dir, &args.catalog, &mut catalog, &report.duplicates)?;
    info!(
        deleted,
        clips = catalog.total_clips,
        "deduplication complete"
    );
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
