//! Waveform decode, slice and loudness measurement.
//!
//! This crate is the audio collaborator behind the catalog pipeline:
//!
//! - [`AudioBuffer`]: interleaved 16-bit PCM with sample-accurate slicing,
//!   dBFS loudness and WAV round-tripping
//! - [`resample_mono`]: offline sample-rate conversion for fingerprinting
//! - [`postprocess`]: the optional FFmpeg voice-channel filter chain

pub mod buffer;
pub mod error;
pub mod postprocess;
pub mod resample;

pub use buffer::AudioBuffer;
pub use error::AudioError;
pub use postprocess::{apply_voice_channel_processing, convert_to_wav, ffmpeg_available};
pub use resample::resample_mono;
