//! Two-phase duplicate scan and catalog resolution.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use mosaic_catalog::{store, Catalog, Clip};

use crate::error::DedupeError;
use crate::fingerprint::Fingerprint;
use crate::types::{DuplicateKind, DuplicatePair};

pub const DEFAULT_THRESHOLD: f64 = 0.90;

const FINGERPRINT_PROGRESS_EVERY: usize = 50;
const COMPARE_PROGRESS_EVERY: usize = 5000;

/// What a scan found, without mutating anything.
pub struct ScanReport {
    pub duplicates: Vec<DuplicatePair>,
    /// Catalog entries whose audio file was missing on disk. Reported,
    /// not repaired; repair means re-running the builder.
    pub missing: usize,
}

fn file_hash(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Scan the catalog for duplicates: first byte-identical files, then
/// fingerprint-similar pairs above `threshold`. Detection only, no
/// mutation.
pub fn scan(
    clips_dir: &Path,
    catalog: &Catalog,
    threshold: f64,
) -> Result<ScanReport, DedupeError> {
    let clips = &catalog.clips;
    if clips.is_empty() {
        info!("catalog is empty, nothing to scan");
        return Ok(ScanReport {
            duplicates: Vec::new(),
            missing: 0,
        });
    }
    info!(clips = clips.len(), "scanning for duplicates");

    // Phase 1: byte-identical files, grouped by content hash.
    let mut hashes: Vec<Option<String>> = Vec::with_capacity(clips.len());
    let mut hash_order: Vec<String> = Vec::new();
    let mut hash_groups: HashMap<String, Vec<&Clip>> = HashMap::new();
    let mut missing = 0usize;

    for clip in clips {
        let path = clips_dir.join(&clip.clip_file);
        if !path.exists() {
            debug!(file = %clip.clip_file, "clip file missing from disk");
            missing += 1;
            hashes.push(None);
            continue;
        }
        let h = file_hash(&path)?;
        let group = hash_groups.entry(h.clone()).or_default();
        if group.is_empty() {
            hash_order.push(h.clone());
        }
        group.push(clip);
        hashes.push(Some(h));
    }
    if missing > 0 {
        warn!(count = missing, "clip files missing from disk");
    }

    let mut duplicates = Vec::new();
    for h in &hash_order {
        let group = &hash_groups[h];
        if group.len() < 2 {
            continue;
        }
        let keep = group[0];
        for dupe in &group[1..] {
            duplicates.push(DuplicatePair {
                keep: keep.clone(),
                remove: (*dupe).clone(),
                similarity: 1.0,
                kind: DuplicateKind::Exact,
            });
        }
    }
    if duplicates.is_empty() {
        info!("no byte-identical duplicates");
    } else {
        info!(count = duplicates.len(), "found byte-identical duplicates");
    }

    // Phase 2: fingerprint every clip that exists on disk.
    info!("computing audio fingerprints");
    let mut fingerprints: Vec<Option<Fingerprint>> = Vec::with_capacity(clips.len());
    for (i, clip) in clips.iter().enumerate() {
        let path = clips_dir.join(&clip.clip_file);
        if !path.exists() {
            fingerprints.push(None);
            continue;
        }
        match Fingerprint::from_file(&path) {
            Ok(fp) => fingerprints.push(Some(fp)),
            Err(e) => {
                warn!(file = %clip.clip_file, error = %e, "failed to fingerprint");
                fingerprints.push(None);
            }
        }
        if (i + 1) % FINGERPRINT_PROGRESS_EVERY == 0 {
            info!(done = i + 1, total = clips.len(), "fingerprinting");
        }
    }

    // Phase 3: every pair with both fingerprints present. O(n^2), fine
    // for libraries of hundreds to low thousands of clips.
    info!(threshold, "comparing fingerprint pairs");
    let mut comparisons = 0usize;
    let mut wave_count = 0usize;
    for i in 0..clips.len() {
        let Some(fp_i) = &fingerprints[i] else { continue };
        for j in (i + 1)..clips.len() {
            let Some(fp_j) = &fingerprints[j] else { continue };

            comparisons += 1;
            if comparisons % COMPARE_PROGRESS_EVERY == 0 {
                info!(comparisons, "comparing");
            }

            // Byte-identical pairs were already resolved in phase 1.
            if hashes[i].is_some() && hashes[i] == hashes[j] {
                continue;
            }

            // Recorded durations differing by more than 2x cannot be
            // duplicates; skip before the full comparison.
            let (dur_i, dur_j) = (clips[i].duration, clips[j].duration);
            if dur_i > 0.0 && dur_j > 0.0 {
                let dur_ratio = dur_i.min(dur_j) / dur_i.max(dur_j);
                if dur_ratio < 0.5 {
                    continue;
                }
            }

            let sim = fp_i.similarity(fp_j);
            if sim < threshold {
                continue;
            }

            // Longer transcript usually means the better take.
            let (keep, remove) = if clips[i].text.len() >= clips[j].text.len() {
                (&clips[i], &clips[j])
            } else {
                (&clips[j], &clips[i])
            };
            duplicates.push(DuplicatePair {
                keep: keep.clone(),
                remove: remove.clone(),
                similarity: round3(sim),
                kind: DuplicateKind::Waveform,
            });
            wave_count += 1;
        }
    }
    if wave_count == 0 {
        info!("no waveform duplicates found");
    } else {
        info!(count = wave_count, "found waveform-similar pairs");
    }

    Ok(ScanReport { duplicates, missing })
}

/// Apply scan results: drop removed clips from the catalog, rewrite it
/// atomically, and delete the audio files. Returns the number of files
/// deleted from disk.
pub fn apply(
    clips_dir: &Path,
    catalog_path: &Path,
    catalog: &mut Catalog,
    duplicates: &[DuplicatePair],
) -> Result<usize, DedupeError> {
    let remove_files: HashSet<&str> = duplicates
        .iter()
        .map(|d| d.remove.clip_file.as_str())
        .collect();

    let before = catalog.clips.len();
    catalog
        .clips
        .retain(|c| !remove_files.contains(c.clip_file.as_str()));
    catalog.total_clips = catalog.clips.len();
    store::save(catalog_path, catalog)?;
    info!(before, after = catalog.total_clips, "catalog updated");

    let mut deleted = 0usize;
    for file in remove_files {
        let path = clips_dir.join(file);
        if path.exists() {
            fs::remove_file(&path)?;
            deleted += 1;
        }
    }
    info!(deleted, "deleted duplicate files from disk");
    Ok(deleted)
}
