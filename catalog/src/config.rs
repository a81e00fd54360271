use crate::types::Filters;

/// Settings for one builder run. Field defaults mirror the tuning the
/// clip library was curated with.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Recognizer model name or size.
    pub model: String,
    pub language: String,
    /// Low but non-zero captures emphasis and drawn-out words better.
    pub temperature: f32,
    /// Sub-segments shorter than this are dropped (seconds).
    pub min_clip_duration: f64,
    /// Segments longer than this are split on word boundaries (seconds).
    pub max_clip_duration: f64,
    /// Also emit tight word n-gram clips for better matching.
    pub phrase_slicing: bool,
    pub max_phrase_words: usize,
    pub filter_hallucinations: bool,
    pub enhance_transcripts: bool,
    /// FFmpeg voice-channel filter chain on each exported clip.
    pub voice_channel_mode: bool,
    /// Minimum alphanumeric characters of transcript text.
    pub min_transcript_length: usize,
    /// Minimum clip loudness in dBFS.
    pub min_energy_db: f64,
    /// Re-process every source even when its content hash is unchanged.
    pub force: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: "en".to_string(),
            temperature: 0.2,
            min_clip_duration: 0.3,
            max_clip_duration: 8.0,
            phrase_slicing: true,
            max_phrase_words: 4,
            filter_hallucinations: true,
            enhance_transcripts: true,
            voice_channel_mode: true,
            min_transcript_length: 4,
            min_energy_db: -45.0,
            force: false,
        }
    }
}

impl BuilderConfig {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The filter snapshot persisted alongside the clips.
    pub fn filters(&self) -> Filters {
        Filters {
            hallucination_detection: self.filter_hallucinations,
            emotional_enhancement: self.enhance_transcripts,
            voice_channel_mode: self.voice_channel_mode,
            min_energy_db: self.min_energy_db,
            min_transcript_length: self.min_transcript_length,
        }
    }
}
