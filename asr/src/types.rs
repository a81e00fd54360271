/// One word with its timing inside a recognized segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// One speech-recognition emission. Transient: consumed entirely within a
/// single file-processing pass, never persisted.
#[derive(Debug, Clone, Default)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Word-level timings, empty when the recognizer did not provide them.
    pub words: Vec<Word>,
}

impl RawSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Decoding options passed to the recognizer.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Model name or size (e.g. "base", "small", "whisper-1").
    pub model: String,
    pub language: String,
    /// Low but non-zero captures emphasis and drawn-out words better.
    pub temperature: f32,
    /// Guidance prompt biasing the transcription style.
    pub prompt: String,
    pub word_timestamps: bool,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: "en".to_string(),
            temperature: 0.2,
            prompt: String::new(),
            word_timestamps: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_duration() {
        let seg = RawSegment {
            start: 1.5,
            end: 4.0,
            text: "hello".into(),
            words: vec![],
        };
        assert!((seg.duration() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn default_options() {
        let opts = TranscribeOptions::default();
        assert_eq!(opts.language, "en");
        assert!(opts.word_timestamps);
        assert!((opts.temperature - 0.2).abs() < 1e-6);
    }
}
