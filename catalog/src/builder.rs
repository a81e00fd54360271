//! The per-file processing pipeline and run orchestration.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use mosaic_asr::{TranscribeOptions, Transcriber};
use mosaic_audio::AudioBuffer;
use mosaic_text::{build_guidance_prompt, clean_hallucination, enhance, is_hallucination};

use crate::config::BuilderConfig;
use crate::error::CatalogError;
use crate::filters::{clip_too_quiet, transcript_too_short, SkipCounts};
use crate::splitter::{phrase_clips, split_by_duration, SubSegment};
use crate::store;
use crate::types::{Catalog, Clip};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "webm", "mp4"];
const PROMPT_PREVIEW_CHARS: usize = 80;

/// Sanitize a string for use as a filename: alphanumerics, `-`, `_` and
/// spaces survive, everything else becomes `_`.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Drop clips whose `(source_file, lowercased trimmed text)` key was
/// already seen, keeping the first occurrence. Catalog order is stable.
pub fn dedupe_exact(clips: Vec<Clip>) -> Vec<Clip> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    clips
        .into_iter()
        .filter(|c| seen.insert((c.source_file.clone(), c.text.trim().to_lowercase())))
        .collect()
}

fn hash_file(path: &Path) -> std::io::Result<String> {
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

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Builds the clip catalog from a folder of raw recordings.
///
/// The recognizer is injected so tests (and alternative backends) can
/// supply their own.
pub struct CatalogBuilder {
    transcriber: Arc<dyn Transcriber>,
    config: BuilderConfig,
}

impl CatalogBuilder {
    pub fn new(transcriber: Arc<dyn Transcriber>, config: BuilderConfig) -> Self {
        Self { transcriber, config }
    }

    /// Process every audio file under `input_dir`, writing sliced clips
    /// to `output_dir` and the catalog JSON to `catalog_path`.
    ///
    /// Sources whose content hash matches the previous catalog are reused
    /// without re-transcription unless `force` is set. A failing source
    /// is logged and skipped; the run continues.
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        catalog_path: &Path,
    ) -> Result<Catalog, CatalogError> {
        fs::create_dir_all(input_dir)?;
        fs::create_dir_all(output_dir)?;

        let mut existing: HashMap<String, Vec<Clip>> = HashMap::new();
        let mut prev_clips: Vec<Clip> = Vec::new();
        let mut old_hashes: BTreeMap<String, String> = BTreeMap::new();
        if catalog_path.exists() && !self.config.force {
            match store::load(catalog_path) {
                Ok(prev) => {
                    info!(clips = prev.clips.len(), "loaded existing catalog");
                    old_hashes = prev.source_hashes;
                    prev_clips = prev.clips;
                    for clip in &prev_clips {
                        existing
                            .entry(clip.source_file.clone())
                            .or_default()
                            .push(clip.clone());
                    }
                }
                Err(e) => warn!(error = %e, "ignoring unreadable existing catalog"),
            }
        }

        let audio_files = scan_audio_files(input_dir)?;
        if audio_files.is_empty() {
            warn!(dir = %input_dir.display(), "no audio files found, catalog left untouched");
            return Ok(self.assemble(prev_clips, old_hashes));
        }
        info!(count = audio_files.len(), dir = %input_dir.display(), "found audio files");

        if self.config.voice_channel_mode && !mosaic_audio::ffmpeg_available() {
            warn!("ffmpeg unavailable, voice-channel processing disabled for this run");
        }

        let mut all_clips: Vec<Clip> = Vec::new();
        let mut source_hashes: BTreeMap<String, String> = BTreeMap::new();
        let mut used_stems: HashSet<String> = HashSet::new();

        for path in &audio_files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let base_stem = safe_filename(
                &path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );

            let hash = match hash_file(path) {
                Ok(h) => h,
                Err(e) => {
                    warn!(file = %filename, error = %e, "unreadable source, skipping");
                    continue;
                }
            };

            if !self.config.force && old_hashes.get(&filename) == Some(&hash) {
                if let Some(clips) = existing.get(&filename) {
                    info!(file = %filename, "skipping unchanged source");
                    all_clips.extend(clips.iter().cloned());
                    source_hashes.insert(filename, hash);
                    used_stems.insert(base_stem);
                    continue;
                }
            }

            let stem = reserve_stem(&mut used_stems, base_stem);
            match self.process_file(path, output_dir, &stem).await {
                Ok(clips) => {
                    all_clips.extend(clips);
                    source_hashes.insert(filename, hash);
                }
                Err(e) => {
                    warn!(file = %filename, error = %e, "failed to process source, continuing");
                }
            }
        }

        let before = all_clips.len();
        let all_clips = dedupe_exact(all_clips);
        if before != all_clips.len() {
            info!(
                before,
                after = all_clips.len(),
                removed = before - all_clips.len(),
                "removed exact duplicates"
            );
        }

        let catalog = self.assemble(all_clips, source_hashes);
        store::cleanup_orphans(output_dir, &catalog)?;
        store::save(catalog_path, &catalog)?;
        info!(
            clips = catalog.total_clips,
            catalog = %catalog_path.display(),
            "catalog written"
        );
        Ok(catalog)
    }

    fn assemble(&self, clips: Vec<Clip>, source_hashes: BTreeMap<String, String>) -> Catalog {
        let prompt = build_guidance_prompt();
        Catalog {
            generated_at: chrono::Local::now().to_rfc3339(),
            whisper_model: self.config.model.clone(),
            whisper_prompt: format!("{}...", preview(&prompt, PROMPT_PREVIEW_CHARS)),
            filters: self.config.filters(),
            total_clips: clips.len(),
            clips,
            source_hashes,
        }
    }

    /// Transcribe one source file and slice it into quality-gated clips.
    /// `stem` is the sanitized, run-unique output filename prefix.
    async fn process_file(
        &self,
        path: &Path,
        output_dir: &Path,
        stem: &str,
    ) -> Result<Vec<Clip>, CatalogError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(file = %filename, "processing");

        let (buffer, decoded_tmp) = self.load_source(path, &filename)?;
        info!(
            seconds = format!("{:.1}", buffer.duration_seconds()),
            channels = buffer.channels(),
            sample_rate = buffer.sample_rate(),
            "decoded source"
        );

        let opts = TranscribeOptions {
            model: self.config.model.clone(),
            language: self.config.language.clone(),
            temperature: self.config.temperature,
            prompt: build_guidance_prompt(),
            word_timestamps: true,
        };
        let result = self.transcriber.transcribe(path, &opts).await;
        if let Some(tmp) = decoded_tmp {
            let _ = fs::remove_file(tmp);
        }
        let segments = result?;
        info!(segments = segments.len(), "transcription complete");
        if segments.is_empty() {
            warn!(file = %filename, "no speech detected, skipping");
            return Ok(Vec::new());
        }

        let cfg = &self.config;
        let mut clips = Vec::new();
        let mut clip_index = 0usize;
        let mut skipped = SkipCounts::default();
        let postprocess = cfg.voice_channel_mode && mosaic_audio::ffmpeg_available();

        for seg in &segments {
            let mut seg_text = seg.text.trim().to_string();
            let seg_dur = seg.duration();

            if seg_text.is_empty() || seg_dur < cfg.min_clip_duration {
                skipped.too_brief += 1;
                continue;
            }

            if cfg.filter_hallucinations && is_hallucination(&seg_text) {
                let cleaned = clean_hallucination(&seg_text);
                if transcript_too_short(&cleaned, cfg.min_transcript_length) {
                    debug!(text = %preview(&seg_text, 40), "hallucination discarded");
                    skipped.hallucination += 1;
                    continue;
                }
                debug!(
                    from = %preview(&seg_text, 30),
                    to = %cleaned,
                    "hallucination cleaned"
                );
                seg_text = cleaned;
            }

            let mut subs = if seg_dur > cfg.max_clip_duration {
                debug!(
                    seconds = format!("{seg_dur:.1}"),
                    "segment too long, splitting on word boundaries"
                );
                split_by_duration(seg, cfg.max_clip_duration)
            } else {
                vec![SubSegment {
                    start: seg.start,
                    end: seg.end,
                    text: seg_text.clone(),
                }]
            };

            if cfg.phrase_slicing {
                let phrases = phrase_clips(seg, cfg.max_phrase_words);
                if !phrases.is_empty() {
                    // Keep only phrases that differ from the full sub-segments.
                    let full_texts: HashSet<String> = subs
                        .iter()
                        .map(|s| s.text.trim().to_lowercase())
                        .collect();
                    subs.extend(
                        phrases
                            .into_iter()
                            .filter(|p| !full_texts.contains(&p.text.trim().to_lowercase())),
                    );
                }
            }

            for sub in subs {
                let sub_dur = sub.end - sub.start;
                let sub_text = sub.text.trim().to_string();

                if sub_dur < cfg.min_clip_duration || sub_text.is_empty() {
                    skipped.too_brief += 1;
                    continue;
                }

                if transcript_too_short(&sub_text, cfg.min_transcript_length) {
                    debug!(text = %sub_text, "transcript too short");
                    skipped.too_short += 1;
                    continue;
                }

                let slice = buffer.slice_seconds(sub.start, sub.end);
                let energy = slice.dbfs();
                if clip_too_quiet(energy, cfg.min_energy_db) {
                    debug!(
                        dbfs = format!("{energy:.1}"),
                        text = %preview(&sub_text, 30),
                        "clip too quiet"
                    );
                    skipped.too_quiet += 1;
                    continue;
                }

                let final_text = if cfg.enhance_transcripts {
                    let enhanced = enhance(&sub_text);
                    if enhanced != sub_text {
                        debug!(
                            from = %preview(&sub_text, 30),
                            to = %preview(&enhanced, 30),
                            "transcript enhanced"
                        );
                    }
                    enhanced
                } else {
                    sub_text.clone()
                };

                let clip_filename = format!("{stem}_{clip_index:04}.wav");
                let clip_path = output_dir.join(&clip_filename);
                slice.save(&clip_path)?;

                if postprocess {
                    let processed = clip_path.with_extension("vc.wav");
                    if mosaic_audio::apply_voice_channel_processing(&clip_path, &processed) {
                        fs::rename(&processed, &clip_path)?;
                    }
                }

                clips.push(Clip {
                    clip_file: clip_filename,
                    source_file: filename.clone(),
                    text: final_text,
                    text_original: sub_text,
                    start: round3(sub.start),
                    end: round3(sub.end),
                    duration: round3(sub_dur),
                    energy_db: round1(energy),
                });
                clip_index += 1;
            }
        }

        if skipped.total() > 0 {
            info!(
                file = %filename,
                total = skipped.total(),
                "filtered out segments: {skipped}"
            );
        }
        info!(file = %filename, clips = clips.len(), "sliced clips");
        Ok(clips)
    }

    /// Decode the source into memory. Non-WAV formats go through FFmpeg
    /// into a temp file first; the caller removes it after transcription.
    fn load_source(
        &self,
        path: &Path,
        filename: &str,
    ) -> Result<(AudioBuffer, Option<PathBuf>), CatalogError> {
        let is_wav = path
            .extension()
            .map(|e| e.to_ascii_lowercase() == "wav")
            .unwrap_or(false);
        if is_wav {
            return Ok((AudioBuffer::load(path)?, None));
        }

        let tmp = std::env::temp_dir().join(format!(
            "mosaic_decode_{}_{}.wav",
            std::process::id(),
            safe_filename(filename)
        ));
        if !mosaic_audio::convert_to_wav(path, &tmp) {
            return Err(CatalogError::DecodeUnavailable(filename.to_string()));
        }
        let buffer = AudioBuffer::load(&tmp)?;
        Ok((buffer, Some(tmp)))
    }
}

/// Claim a unique output stem for one source file. Sanitizing can
/// collapse two different source names onto the same stem; later
/// claimants get a numeric suffix so clip filenames never collide.
fn reserve_stem(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            warn!(stem = %base, renamed = %candidate, "output stem collision");
            return candidate;
        }
        n += 1;
    }
}

fn scan_audio_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|e| {
                    let ext = e.to_ascii_lowercase();
                    AUDIO_EXTENSIONS.iter().any(|a| ext == *a)
                })
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mosaic_asr::{AsrError, RawSegment, Word};

    fn clip(source: &str, text: &str) -> Clip {
        Clip {
            clip_file: format!("{}_0000.wav", safe_filename(source)),
            source_file: source.to_string(),
            text: text.to_string(),
            text_original: text.to_string(),
            start: 0.0,
            end: 1.0,
            duration: 1.0,
            energy_db: -20.0,
        }
    }

    #[test]
    fn safe_filename_replaces_specials() {
        assert_eq!(safe_filename("take 1: final?.wav"), "take 1_ final__wav");
        assert_eq!(safe_filename("plain-name_ok"), "plain-name_ok");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let clips = vec![
            clip("a.wav", "Hello there"),
            clip("a.wav", "  hello THERE "),
            clip("b.wav", "hello there"),
        ];
        let deduped = dedupe_exact(clips);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].text, "Hello there");
        assert_eq!(deduped[1].source_file, "b.wav");
    }

    #[test]
    fn rounding_matches_catalog_precision() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round1(-21.44), -21.4);
    }

    /// Deterministic recognizer: one segment, three timed words.
    struct StubTranscriber {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(
            &self,
            _path: &Path,
            _opts: &TranscribeOptions,
        ) -> Result<Vec<RawSegment>, AsrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RawSegment {
                start: 0.0,
                end: 1.0,
                text: " hello there friend".into(),
                words: vec![
                    Word { word: " hello".into(), start: 0.0, end: 0.3 },
                    Word { word: " there".into(), start: 0.35, end: 0.6 },
                    Word { word: " friend".into(), start: 0.65, end: 1.0 },
                ],
            }])
        }
    }

    fn write_tone(path: &Path) {
        let rate = 16000u32;
        let samples: Vec<i16> = (0..rate)
            .map(|i| {
                let t = i as f64 / rate as f64;
                (0.5 * 32767.0 * (2.0 * std::f64::consts::PI * 220.0 * t).sin()) as i16
            })
            .collect();
        AudioBuffer::new(samples, 1, rate).save(path).unwrap();
    }

    fn test_config() -> BuilderConfig {
        BuilderConfig {
            voice_channel_mode: false,
            ..BuilderConfig::default()
        }
    }

    #[tokio::test]
    async fn builds_catalog_from_wav_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        fs::create_dir_all(&input).unwrap();
        write_tone(&input.join("take.wav"));

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let builder = CatalogBuilder::new(transcriber.clone(), test_config());
        let catalog_path = dir.path().join("micro_clips.json");

        let catalog = builder.run(&input, &output, &catalog_path).await.unwrap();

        assert!(catalog.total_clips > 0);
        assert_eq!(catalog.total_clips, catalog.clips.len());
        // The full segment survives every gate.
        assert!(catalog.clips.iter().any(|c| c.text == "hello there friend"));
        // Every referenced clip file exists on disk.
        for c in &catalog.clips {
            assert!(output.join(&c.clip_file).exists(), "missing {}", c.clip_file);
        }
        assert!(catalog_path.exists());
        assert_eq!(catalog.source_hashes.len(), 1);
        assert!(catalog.source_hashes.contains_key("take.wav"));
    }

    #[tokio::test]
    async fn unchanged_source_is_not_retranscribed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        fs::create_dir_all(&input).unwrap();
        write_tone(&input.join("take.wav"));

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let builder = CatalogBuilder::new(transcriber.clone(), test_config());
        let catalog_path = dir.path().join("micro_clips.json");

        let first = builder.run(&input, &output, &catalog_path).await.unwrap();
        let second = builder.run(&input, &output, &catalog_path).await.unwrap();

        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.total_clips, second.total_clips);
    }

    #[tokio::test]
    async fn force_reprocesses_everything() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        fs::create_dir_all(&input).unwrap();
        write_tone(&input.join("take.wav"));

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let catalog_path = dir.path().join("micro_clips.json");

        let builder = CatalogBuilder::new(transcriber.clone(), test_config());
        builder.run(&input, &output, &catalog_path).await.unwrap();

        let forced = CatalogBuilder::new(
            transcriber.clone(),
            BuilderConfig {
                force: true,
                ..test_config()
            },
        );
        forced.run(&input, &output, &catalog_path).await.unwrap();

        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_input_preserves_previous_clip_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        let catalog_path = dir.path().join("micro_clips.json");

        // Interleaved sources: grouping by source must not reorder them.
        let previous = Catalog {
            generated_at: "2026-01-01T00:00:00".into(),
            whisper_model: "base".into(),
            whisper_prompt: "...".into(),
            filters: test_config().filters(),
            total_clips: 3,
            clips: vec![
                clip("b.wav", "one"),
                clip("a.wav", "two"),
                clip("b.wav", "three"),
            ],
            source_hashes: Default::default(),
        };
        store::save(&catalog_path, &previous).unwrap();

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let builder = CatalogBuilder::new(transcriber, test_config());
        let result = builder.run(&input, &output, &catalog_path).await.unwrap();

        let texts: Vec<&str> = result.clips.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn colliding_sanitized_stems_get_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        fs::create_dir_all(&input).unwrap();
        // Both sanitize to the stem "a_".
        write_tone(&input.join("a!.wav"));
        write_tone(&input.join("a?.wav"));

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let builder = CatalogBuilder::new(transcriber, test_config());
        let catalog_path = dir.path().join("micro_clips.json");
        let catalog = builder.run(&input, &output, &catalog_path).await.unwrap();

        let sources: HashSet<&str> =
            catalog.clips.iter().map(|c| c.source_file.as_str()).collect();
        assert_eq!(sources.len(), 2);

        // No clip filename may be claimed twice across sources.
        let names: HashSet<&str> = catalog.clips.iter().map(|c| c.clip_file.as_str()).collect();
        assert_eq!(names.len(), catalog.clips.len());
        for c in &catalog.clips {
            assert!(output.join(&c.clip_file).exists(), "missing {}", c.clip_file);
        }
    }

    #[tokio::test]
    async fn empty_input_dir_leaves_no_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw");
        let output = dir.path().join("sliced");
        let catalog_path = dir.path().join("micro_clips.json");

        let transcriber = Arc::new(StubTranscriber { calls: AtomicUsize::new(0) });
        let builder = CatalogBuilder::new(transcriber, test_config());
        let catalog = builder.run(&input, &output, &catalog_path).await.unwrap();

        assert_eq!(catalog.total_clips, 0);
        assert!(!catalog_path.exists());
    }
}
