use std::path::Path;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::AsrError;
use crate::transcriber::Transcriber;
use crate::types::{RawSegment, TranscribeOptions, Word};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Transcription client for OpenAI-compatible `/audio/transcriptions`
/// endpoints. Local whisper servers expose the same surface, so pointing
/// `base_url` at one of those works unchanged.
pub struct OpenAI {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAI {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// `verbose_json` response. OpenAI reports word timings at the top level;
/// most local servers nest them per segment. Both shapes are accepted.
#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    segments: Vec<WireSegment>,
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Deserialize)]
struct WireSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    words: Vec<WireWord>,
}

#[derive(Deserialize)]
struct WireWord {
    word: String,
    start: f64,
    end: f64,
}

impl From<WireWord> for Word {
    fn from(w: WireWord) -> Self {
        Word {
            word: w.word,
            start: w.start,
            end: w.end,
        }
    }
}

/// Assign top-level words to segments by time overlap. A word belongs to
/// the first segment whose span contains its midpoint.
fn distribute_words(segments: &mut [RawSegment], words: Vec<WireWord>) {
    for w in words {
        let mid = (w.start + w.end) / 2.0;
        if let Some(seg) = segments
            .iter_mut()
            .find(|s| mid >= s.start && mid <= s.end)
        {
            seg.words.push(w.into());
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for OpenAI {
    async fn transcribe(
        &self,
        path: &Path,
        opts: &TranscribeOptions,
    ) -> Result<Vec<RawSegment>, AsrError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("model", opts.model.clone())
            .text("language", opts.language.clone())
            .text("temperature", opts.temperature.to_string())
            .text("response_format", "verbose_json");

        if !opts.prompt.is_empty() {
            form = form.text("prompt", opts.prompt.clone());
        }
        if opts.word_timestamps {
            form = form
                .text("timestamp_granularities[]", "word")
                .text("timestamp_granularities[]", "segment");
        }

        let url = format!("{}/audio/transcriptions", self.base_url);
        tracing::debug!(model = %opts.model, file = %path.display(), "transcribing");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AsrError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AsrError::Api(format!("HTTP {status}: {body}")));
        }

        let data: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| AsrError::Malformed(e.to_string()))?;

        let has_top_level_words = !data.words.is_empty();
        let mut segments: Vec<RawSegment> = data
            .segments
            .into_iter()
            .map(|s| RawSegment {
                start: s.start,
                end: s.end,
                text: s.text,
                words: s.words.into_iter().map(Word::from).collect(),
            })
            .collect();

        if has_top_level_words && segments.iter().all(|s| s.words.is_empty()) {
            distribute_words(&mut segments, data.words);
        }

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_words() {
        let json = r#"{
            "text": "hello world",
            "segments": [
                {"start": 0.0, "end": 1.2, "text": " hello world",
                 "words": [
                     {"word": "hello", "start": 0.0, "end": 0.5},
                     {"word": "world", "start": 0.6, "end": 1.2}
                 ]}
            ]
        }"#;
        let resp: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.segments.len(), 1);
        assert_eq!(resp.segments[0].words.len(), 2);
        assert!(resp.words.is_empty());
    }

    #[test]
    fn distributes_top_level_words_by_midpoint() {
        let json = r#"{
            "segments": [
                {"start": 0.0, "end": 1.0, "text": "one"},
                {"start": 1.0, "end": 2.0, "text": "two"}
            ],
            "words": [
                {"word": "one", "start": 0.1, "end": 0.9},
                {"word": "two", "start": 1.1, "end": 1.9}
            ]
        }"#;
        let data: TranscriptionResponse = serde_json::from_str(json).unwrap();
        let mut segments: Vec<RawSegment> = data
            .segments
            .into_iter()
            .map(|s| RawSegment {
                start: s.start,
                end: s.end,
                text: s.text,
                words: vec![],
            })
            .collect();
        distribute_words(&mut segments, data.words);
        assert_eq!(segments[0].words.len(), 1);
        assert_eq!(segments[1].words.len(), 1);
        assert_eq!(segments[0].words[0].word, "one");
    }
}
