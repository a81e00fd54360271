use std::path::Path;

use tracing::info;

use mosaic_catalog::{store, Catalog, Clip};
use mosaic_embed::Embedder;

use crate::error::RetrievalError;

/// A catalog paired with one embedding vector per clip.
///
/// Vectors are computed once at load time and live only here; the
/// persisted catalog never carries them.
#[derive(Debug)]
pub struct ClipIndex {
    clips: Vec<Clip>,
    vectors: Vec<Vec<f32>>,
}

impl ClipIndex {
    /// Embed every clip text in the catalog. Fails on an empty catalog:
    /// retrieval over nothing is a setup error, not a silent no-match.
    pub async fn build(
        catalog: &Catalog,
        embedder: &dyn Embedder,
    ) -> Result<Self, RetrievalError> {
        if catalog.clips.is_empty() {
            return Err(RetrievalError::EmptyCatalog);
        }

        let active: Vec<&str> = [
            (catalog.filters.hallucination_detection, "hallucination_detection"),
            (catalog.filters.emotional_enhancement, "emotional_enhancement"),
            (catalog.filters.voice_channel_mode, "voice_channel_mode"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
        if !active.is_empty() {
            info!(filters = active.join(", "), "catalog filters");
        }
        info!(clips = catalog.clips.len(), "loaded clips from catalog");

        let texts: Vec<&str> = catalog.clips.iter().map(|c| c.text.as_str()).collect();
        let vectors = embedder.embed_batch(&texts).await?;
        info!(vectors = vectors.len(), "embeddings ready");

        Ok(Self {
            clips: catalog.clips.clone(),
            vectors,
        })
    }

    /// Load a catalog file and build the index over it.
    pub async fn load(
        catalog_path: &Path,
        embedder: &dyn Embedder,
    ) -> Result<Self, RetrievalError> {
        let catalog = store::load(catalog_path)?;
        Self::build(&catalog, embedder).await
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}
