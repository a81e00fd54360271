use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One catalogued micro-clip. `text` is the retrieval key (possibly
/// expressively enhanced); `text_original` preserves what the recognizer
/// actually emitted. Embeddings are never stored here, they live in the
/// retrieval index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub clip_file: String,
    pub source_file: String,
    pub text: String,
    pub text_original: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub energy_db: f64,
}

/// Snapshot of the quality settings a catalog was built with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filters {
    pub hallucination_detection: bool,
    pub emotional_enhancement: bool,
    pub voice_channel_mode: bool,
    pub min_energy_db: f64,
    pub min_transcript_length: usize,
}

/// The persisted clip library. Rewritten wholesale on each successful
/// builder run; read-only for retrieval consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub generated_at: String,
    pub whisper_model: String,
    pub whisper_prompt: String,
    pub filters: Filters,
    pub total_clips: usize,
    pub clips: Vec<Clip>,
    /// Source filename to content hash, for incremental reuse. Absent in
    /// catalogs written before hashing existed; those sources reprocess.
    #[serde(default)]
    pub source_hashes: BTreeMap<String, String>,
}
