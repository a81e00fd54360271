use std::cmp::Ordering;

use tracing::debug;

use mosaic_catalog::Clip;
use mosaic_embed::{cosine_similarity, Embedder};
use mosaic_text::split_into_beats;

use crate::error::RetrievalError;
use crate::index::ClipIndex;

/// Retrieval tuning shared by every lookup.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Minimum similarity to count as a match.
    pub min_similarity: f32,
    /// Maximum clips to chain per semantic beat.
    pub max_clips_per_beat: usize,
    /// Allow multiple clips per beat; otherwise exactly one.
    pub multi_clip: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.6,
            max_clips_per_beat: 3,
            multi_clip: true,
        }
    }
}

/// A clip and its similarity to the query that selected it.
#[derive(Debug, Clone)]
pub struct ScoredClip {
    pub clip: Clip,
    pub similarity: f32,
}

/// The clips chosen for one beat, in ranked order.
#[derive(Debug, Clone)]
pub struct BeatPlan {
    pub beat: String,
    pub clips: Vec<ScoredClip>,
}

/// Rank every indexed clip against `query` and return at most `top_n`
/// with similarity at or above `min_similarity`, descending. Ties keep
/// catalog order. An empty result means nothing cleared the threshold,
/// never that the catalog was empty (the index refuses to build empty).
pub async fn find_best_clips(
    index: &ClipIndex,
    embedder: &dyn Embedder,
    query: &str,
    top_n: usize,
    min_similarity: f32,
) -> Result<Vec<ScoredClip>, RetrievalError> {
    let query_vec = embedder.embed(query).await?;

    let mut scored: Vec<ScoredClip> = index
        .clips()
        .iter()
        .zip(index.vectors())
        .map(|(clip, vec)| ScoredClip {
            clip: clip.clone(),
            similarity: cosine_similarity(&query_vec, vec),
        })
        .collect();

    // Stable sort keeps catalog order among equal scores.
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    Ok(scored
        .into_iter()
        .filter(|s| s.similarity >= min_similarity)
        .take(top_n)
        .collect())
}

/// Plan playback for a whole message: split it into semantic beats and
/// select clips per beat. When nothing clears the threshold for a beat,
/// fall back to the single best match so a non-empty catalog always
/// yields something to play.
pub async fn plan_message(
    index: &ClipIndex,
    embedder: &dyn Embedder,
    message: &str,
    cfg: &RetrievalConfig,
) -> Result<Vec<BeatPlan>, RetrievalError> {
    let mut plans = Vec::new();
    for beat in split_into_beats(message) {
        let top_n = if cfg.multi_clip { cfg.max_clips_per_beat } else { 1 };
        let mut clips =
            find_best_clips(index, embedder, &beat, top_n, cfg.min_similarity).await?;
        if clips.is_empty() {
            debug!(
                beat = %beat,
                threshold = cfg.min_similarity,
                "no match above threshold, taking single best"
            );
            clips = find_best_clips(index, embedder, &beat, 1, 0.0).await?;
        }
        plans.push(BeatPlan { beat, clips });
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use mosaic_catalog::{Catalog, Filters};
    use mosaic_embed::EmbedError;

    /// Embedder with a fixed text-to-vector table.
    struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
    }

    #[async_trait::async_trait]
    impl Embedder for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(self
                .table
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 0.0, 1.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn clip(file: &str, text: &str) -> Clip {
        Clip {
            clip_file: file.to_string(),
            source_file: "take.wav".into(),
            text: text.to_string(),
            text_original: text.to_string(),
            start: 0.0,
            end: 1.0,
            duration: 1.0,
            energy_db: -20.0,
        }
    }

    fn catalog(clips: Vec<Clip>) -> Catalog {
        Catalog {
            generated_at: "2026-01-01T00:00:00".into(),
            whisper_model: "base".into(),
            whisper_prompt: "...".into(),
            filters: Filters {
                hallucination_detection: true,
                emotional_enhancement: true,
                voice_channel_mode: false,
                min_energy_db: -45.0,
                min_transcript_length: 4,
            },
            total_clips: clips.len(),
            clips,
            source_hashes: Default::default(),
        }
    }

    fn embedder() -> TableEmbedder {
        let mut table = HashMap::new();
        table.insert("hello there".to_string(), vec![1.0, 0.0, 0.0]);
        table.insert("hi there".to_string(), vec![0.9, 0.1, 0.0]);
        table.insert("good morning".to_string(), vec![0.0, 1.0, 0.0]);
        table.insert("hello".to_string(), vec![1.0, 0.05, 0.0]);
        TableEmbedder { table }
    }

    async fn index(embedder: &TableEmbedder) -> ClipIndex {
        let cat = catalog(vec![
            clip("a.wav", "hello there"),
            clip("b.wav", "hi there"),
            clip("c.wav", "good morning"),
        ]);
        ClipIndex::build(&cat, embedder).await.unwrap()
    }

    #[tokio::test]
    async fn ranks_by_descending_similarity() {
        let emb = embedder();
        let idx = index(&emb).await;

        let hits = find_best_clips(&idx, &emb, "hello", 3, 0.6).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].clip.text, "hello there");
        assert_eq!(hits[1].clip.text, "hi there");
        assert!(hits[0].similarity >= hits[1].similarity);
    }

    #[tokio::test]
    async fn threshold_filters_weak_matches() {
        let emb = embedder();
        let idx = index(&emb).await;

        let hits = find_best_clips(&idx, &emb, "good morning", 3, 0.99)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].clip.text, "good morning");
    }

    #[tokio::test]
    async fn ties_keep_catalog_order() {
        let emb = embedder();
        let cat = catalog(vec![
            clip("first.wav", "hello there"),
            clip("second.wav", "hello there"),
        ]);
        let idx = ClipIndex::build(&cat, &emb).await.unwrap();

        let hits = find_best_clips(&idx, &emb, "hello there", 2, 0.0)
            .await
            .unwrap();
        assert_eq!(hits[0].clip.clip_file, "first.wav");
        assert_eq!(hits[1].clip.clip_file, "second.wav");
    }

    #[tokio::test]
    async fn empty_catalog_is_an_error() {
        let emb = embedder();
        let err = ClipIndex::build(&catalog(vec![]), &emb).await.unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyCatalog));
    }

    #[tokio::test]
    async fn plan_falls_back_to_single_best() {
        let emb = embedder();
        let idx = index(&emb).await;

        // "unknown text" embeds to the z axis, orthogonal to every clip.
        let cfg = RetrievalConfig::default();
        let plans = plan_message(&idx, &emb, "unknown text", &cfg).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].clips.len(), 1);
    }

    #[tokio::test]
    async fn plan_splits_message_into_beats() {
        let emb = embedder();
        let idx = index(&emb).await;

        let cfg = RetrievalConfig::default();
        let plans = plan_message(&idx, &emb, "hello there. good morning", &cfg)
            .await
            .unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].beat, "hello there");
        assert_eq!(plans[0].clips[0].clip.text, "hello there");
        assert_eq!(plans[1].beat, "good morning");
        assert_eq!(plans[1].clips[0].clip.text, "good morning");
    }

    #[tokio::test]
    async fn single_clip_mode_takes_one() {
        let emb = embedder();
        let idx = index(&emb).await;

        let cfg = RetrievalConfig {
            multi_clip: false,
            ..RetrievalConfig::default()
        };
        let plans = plan_message(&idx, &emb, "hello", &cfg).await.unwrap();
        assert_eq!(plans[0].clips.len(), 1);
        assert_eq!(plans[0].clips[0].clip.text, "hello there");
    }
}
