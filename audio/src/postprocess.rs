//! Optional voice-channel post-processing via FFmpeg.
//!
//! Makes sliced clips sound less studio-perfect, as if heard through a
//! bandwidth-limited voice channel: a gentle high-pass, light compression,
//! an Opus-like low-pass, a barely perceptible noise floor and a slight
//! level reduction. FFmpeg being unavailable is not an error; the caller
//! keeps the unprocessed clip.

use std::path::Path;
use std::process::Command;

use ffmpeg_sidecar::command::FfmpegCommand;
use once_cell::sync::Lazy;
use tracing::debug;

static FFMPEG_AVAILABLE: Lazy<bool> = Lazy::new(|| {
    Command::new(ffmpeg_sidecar::paths::ffmpeg_path())
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
});

/// Whether an FFmpeg binary can be invoked. Probed once per process.
pub fn ffmpeg_available() -> bool {
    *FFMPEG_AVAILABLE
}

/// Decode any FFmpeg-readable audio file to 16-bit PCM WAV.
///
/// The catalog builder accepts mp3/ogg/flac/m4a/webm sources; everything
/// that is not already WAV goes through here first. Returns `true` only
/// if FFmpeg ran and exited successfully.
pub fn convert_to_wav(input: &Path, output: &Path) -> bool {
    if !ffmpeg_available() {
        return false;
    }

    let result = FfmpegCommand::new()
        .input(input.to_string_lossy())
        .args(["-acodec", "pcm_s16le"])
        .overwrite()
        .output(output.to_string_lossy())
        .spawn()
        .and_then(|mut child| child.wait());

    match result {
        Ok(status) if status.success() => true,
        Ok(status) => {
            debug!(?status, "ffmpeg decode exited with failure");
            false
        }
        Err(e) => {
            debug!(error = %e, "ffmpeg decode spawn failed");
            false
        }
    }
}

/// Run the voice-channel filter chain over `input`, writing to `output`.
///
/// Returns `true` only if FFmpeg ran and exited successfully; on any
/// failure the output file must not be trusted.
pub fn apply_voice_channel_processing(input: &Path, output: &Path) -> bool {
    if !ffmpeg_available() {
        return false;
    }

    let filters = [
        "highpass=f=80",
        "acompressor=threshold=-20dB:ratio=3:attack=5:release=50",
        "lowpass=f=7500",
        "anlmdn=s=0.0001",
        "volume=0.95",
    ]
    .join(",");

    let result = FfmpegCommand::new()
        .input(input.to_string_lossy())
        .args(["-af", &filters, "-ar", "48000", "-ac", "2"])
        .overwrite()
        .output(output.to_string_lossy())
        .spawn()
        .and_then(|mut child| child.wait());

    match result {
        Ok(status) if status.success() => true,
        Ok(status) => {
            debug!(?status, "ffmpeg exited with failure");
            false
        }
        Err(e) => {
            debug!(error = %e, "ffmpeg spawn failed");
            false
        }
    }
}
