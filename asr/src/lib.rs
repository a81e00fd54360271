//! Speech recognition contract for the catalog pipeline.
//!
//! The pipeline treats the recognizer as an opaque service: audio file in,
//! timed segments with optional word-level timings out. [`OpenAI`] talks to
//! any OpenAI-compatible `/audio/transcriptions` endpoint (including local
//! whisper servers); tests inject their own [`Transcriber`].

pub mod error;
pub mod openai;
pub mod transcriber;
pub mod types;

pub use error::AsrError;
pub use openai::OpenAI;
pub use transcriber::Transcriber;
pub use types::{RawSegment, TranscribeOptions, Word};
