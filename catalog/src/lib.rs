//! Clip catalog: data model, segmentation, quality gates and the builder.
//!
//! The builder walks a folder of raw recordings, transcribes each file,
//! slices the speech into micro-clips along recognizer word boundaries,
//! rejects low-quality fragments and persists the surviving clips plus a
//! JSON catalog describing them. Unchanged sources (by content hash) are
//! reused from the previous catalog instead of being re-transcribed.

pub mod builder;
pub mod config;
pub mod error;
pub mod filters;
pub mod splitter;
pub mod store;
pub mod types;

pub use builder::{dedupe_exact, safe_filename, CatalogBuilder};
pub use config::BuilderConfig;
pub use error::CatalogError;
pub use filters::{clip_too_quiet, transcript_too_short, SkipCounts};
pub use splitter::{phrase_clips, split_by_duration, SubSegment};
pub use types::{Catalog, Clip, Filters};
