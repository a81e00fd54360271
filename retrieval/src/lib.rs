//! Semantic retrieval: match message beats to catalogued clips.
//!
//! A [`ClipIndex`] pairs the persisted catalog with embedding vectors
//! computed at load time; [`search`] ranks clips against a query by
//! cosine similarity and drives the per-beat planning loop a playback
//! collaborator consumes.

pub mod error;
pub mod index;
pub mod search;

pub use error::RetrievalError;
pub use index::ClipIndex;
pub use search::{find_best_clips, plan_message, BeatPlan, RetrievalConfig, ScoredClip};
