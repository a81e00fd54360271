//! Text normalization and transcript heuristics.
//!
//! This crate provides the text-side building blocks of the clip pipeline:
//!
//! - [`split_into_beats`]: split a message into clause-level "beats" that
//!   are matched against the catalog independently
//! - [`is_hallucination`] / [`clean_hallucination`]: detect and salvage
//!   speech-recognition output that was invented from noise or silence
//! - [`enhance`]: rewrite vocal sounds (laughter, sighs, gasps) into
//!   bracketed emotion tags and normalize punctuation
//! - [`build_guidance_prompt`]: the fixed prompt used to bias the
//!   speech-recognition engine toward expressive transcriptions

pub mod beats;
pub mod enhance;
pub mod hallucination;
pub mod prompt;

pub use beats::split_into_beats;
pub use enhance::enhance;
pub use hallucination::{clean_hallucination, is_hallucination};
pub use prompt::build_guidance_prompt;
