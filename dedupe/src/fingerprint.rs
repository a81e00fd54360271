//! Compact spectral fingerprints for near-duplicate detection.
//!
//! Audio is downmixed to mono 16 kHz and peak-normalized, then a Hann
//! window slides across the signal; each window's magnitude spectrum is
//! averaged into a fixed number of frequency bands. Fast, and robust to
//! volume and minor encoding differences.

use std::f64::consts::PI;
use std::path::Path;

use mosaic_audio::AudioBuffer;

use crate::error::DedupeError;

const SAMPLE_RATE: u32 = 16000;
/// 50 ms at 16 kHz.
const HOP: usize = 800;
const WINDOW: usize = HOP * 2;
const N_BINS: usize = 32;
/// Next power of two above WINDOW; frames are zero-padded to this.
const FFT_SIZE: usize = 2048;

/// One spectral band vector per analysis window. Empty for silent or
/// empty input.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    frames: Vec<Vec<f32>>,
}

impl Fingerprint {
    /// Fingerprint a decoded buffer.
    pub fn from_buffer(buffer: &AudioBuffer) -> Result<Self, DedupeError> {
        let mut samples = buffer.mono_f32_at(SAMPLE_RATE)?;
        if samples.is_empty() {
            return Ok(Self { frames: Vec::new() });
        }

        // Peak-normalize so volume differences cancel out.
        let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        if peak > 0.0 {
            for s in &mut samples {
                *s /= peak;
            }
        }

        let n_frames = (samples.len().saturating_sub(WINDOW) / HOP).max(1);
        let mut frames = Vec::with_capacity(n_frames);
        let mut fft_buf = vec![(0.0f64, 0.0f64); FFT_SIZE];

        for i in 0..n_frames {
            let start = i * HOP;
            let end = (start + WINDOW).min(samples.len());
            let frame = &samples[start..end];
            let window = hann(frame.len());

            for v in &mut fft_buf {
                *v = (0.0, 0.0);
            }
            for (j, &s) in frame.iter().enumerate() {
                fft_buf[j] = (s as f64 * window[j], 0.0);
            }
            fft(&mut fft_buf);

            let half = FFT_SIZE / 2 + 1;
            let spectrum: Vec<f64> = fft_buf[..half]
                .iter()
                .map(|&(re, im)| (re * re + im * im).sqrt())
                .collect();

            frames.push(band_means(&spectrum));
        }

        Ok(Self { frames })
    }

    /// Decode a file and fingerprint it.
    pub fn from_file(path: &Path) -> Result<Self, DedupeError> {
        Self::from_buffer(&AudioBuffer::load(path)?)
    }

    pub fn frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Similarity in `[0, 1]`. Zero when either fingerprint is empty or
    /// the frame counts differ by more than 2x; otherwise the cosine of
    /// the overlapping flattened frames, weighted by the length ratio so
    /// a residual mismatch still costs something.
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        if self.frames.is_empty() || other.frames.is_empty() {
            return 0.0;
        }

        let min_len = self.frames.len().min(other.frames.len());
        let max_len = self.frames.len().max(other.frames.len());
        let len_ratio = min_len as f64 / max_len as f64;
        if len_ratio < 0.5 {
            return 0.0;
        }

        let a = flatten(&self.frames[..min_len]);
        let b = flatten(&other.frames[..min_len]);

        let mut dot = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for i in 0..a.len() {
            dot += a[i] * b[i];
            norm_a += a[i] * a[i];
            norm_b += b[i] * b[i];
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        (dot / (norm_a.sqrt() * norm_b.sqrt())) * len_ratio
    }
}

fn flatten(frames: &[Vec<f32>]) -> Vec<f64> {
    frames
        .iter()
        .flat_map(|f| f.iter().map(|&v| v as f64))
        .collect()
}

/// Average the magnitude spectrum into N_BINS equal-width bands.
fn band_means(spectrum: &[f64]) -> Vec<f32> {
    let bin_size = (spectrum.len() / N_BINS).max(1);
    (0..N_BINS)
        .map(|b| {
            let start = b * bin_size;
            let end = ((b + 1) * bin_size).min(spectrum.len());
            if start >= spectrum.len() {
                return 0.0;
            }
            let band = &spectrum[start..end];
            (band.iter().sum::<f64>() / band.len() as f64) as f32
        })
        .collect()
}

fn hann(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// In-place Cooley-Tukey FFT.
/// Input length must be a power of 2.
/// Uses (real, imag) tuples instead of a complex number type.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    // Butterfly operations.
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                let t_re = w.0 * x[start + k + half].0 - w.1 * x[start + k + half].1;
                let t_im = w.0 * x[start + k + half].1 + w.1 * x[start + k + half].0;
                x[start + k] = (u.0 + t_re, u.1 + t_im);
                x[start + k + half] = (u.0 - t_re, u.1 - t_im);
                let new_w_re = w.0 * wn.0 - w.1 * wn.1;
                let new_w_im = w.0 * wn.1 + w.1 * wn.0;
                w = (new_w_re, new_w_im);
            }
            start += size;
        }
        size <<= 1;
    }
}
