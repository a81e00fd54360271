use std::path::Path;

use crate::error::AudioError;
use crate::resample::resample_mono;

/// Interleaved 16-bit PCM audio held in memory.
///
/// Clips are short (fractions of a second to a few seconds), so whole-file
/// decoding is the working model; there is no streaming path.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
        debug_assert!(channels > 0);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Decode a WAV file. 16/24/32-bit integer and 32-bit float samples
    /// are converted to 16-bit.
    pub fn load(path: &Path) -> Result<Self, AudioError> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => {
                reader.samples::<i16>().collect::<Result<_, _>>()?
            }
            (hound::SampleFormat::Int, bits @ (24 | 32)) => {
                let shift = bits - 16;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<_, _>>()?
            }
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<Result<_, _>>()?,
            (fmt, bits) => {
                return Err(AudioError::UnsupportedFormat(format!("{fmt:?}/{bits}-bit")));
            }
        };

        Ok(Self::new(samples, spec.channels, spec.sample_rate))
    }

    /// Write the buffer as a 16-bit PCM WAV file.
    pub fn save(&self, path: &Path) -> Result<(), AudioError> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &s in &self.samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
        Ok(())
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Extract `[start, end)` seconds as a new buffer, sample-accurate.
    /// Bounds are clamped to the buffer length.
    pub fn slice_seconds(&self, start: f64, end: f64) -> Self {
        let frames = self.frames();
        let to_frame = |t: f64| ((t * self.sample_rate as f64).round().max(0.0) as usize).min(frames);
        let start_frame = to_frame(start);
        let end_frame = to_frame(end).max(start_frame);

        let ch = self.channels as usize;
        let samples = self.samples[start_frame * ch..end_frame * ch].to_vec();
        Self::new(samples, self.channels, self.sample_rate)
    }

    /// RMS loudness in dBFS, relative to full-scale 16-bit amplitude.
    /// Returns negative infinity for silence or an empty buffer.
    pub fn dbfs(&self) -> f64 {
        if self.samples.is_empty() {
            return f64::NEG_INFINITY;
        }
        let sum_sq: f64 = self
            .samples
            .iter()
            .map(|&s| {
                let v = s as f64;
                v * v
            })
            .sum();
        let rms = (sum_sq / self.samples.len() as f64).sqrt();
        if rms == 0.0 {
            return f64::NEG_INFINITY;
        }
        20.0 * (rms / 32768.0).log10()
    }

    /// Downmix to mono float samples in `[-1, 1]`.
    pub fn mono_f32(&self) -> Vec<f32> {
        let ch = self.channels as usize;
        if ch == 1 {
            return self.samples.iter().map(|&s| s as f32 / 32768.0).collect();
        }
        self.samples
            .chunks_exact(ch)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / ch as i32) as f32 / 32768.0
            })
            .collect()
    }

    /// Downmix to mono and resample to the target rate.
    pub fn mono_f32_at(&self, rate: u32) -> Result<Vec<f32>, AudioError> {
        let mono = self.mono_f32();
        if self.sample_rate == rate {
            return Ok(mono);
        }
        resample_mono(&mono, self.sample_rate, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, rate: u32, seconds: f64, amplitude: f64) -> AudioBuffer {
        let n = (rate as f64 * seconds) as usize;
        let samples: Vec<i16> = (0..n)
            .map(|i| {
                let t = i as f64 / rate as f64;
                (amplitude * 32767.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect();
        AudioBuffer::new(samples, 1, rate)
    }

    #[test]
    fn duration_and_frames() {
        let buf = tone(440.0, 16000, 1.0, 0.5);
        assert_eq!(buf.frames(), 16000);
        assert!((buf.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn slice_is_sample_accurate() {
        let buf = tone(440.0, 16000, 1.0, 0.5);
        let clip = buf.slice_seconds(0.25, 0.75);
        assert_eq!(clip.frames(), 8000);
        assert!((clip.duration_seconds() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn slice_clamps_out_of_range() {
        let buf = tone(440.0, 16000, 0.5, 0.5);
        let clip = buf.slice_seconds(0.4, 2.0);
        assert_eq!(clip.frames(), 16000 / 2 - 6400);
        let empty = buf.slice_seconds(3.0, 4.0);
        assert_eq!(empty.frames(), 0);
    }

    #[test]
    fn silence_is_negative_infinity() {
        let buf = AudioBuffer::new(vec![0i16; 1600], 1, 16000);
        assert_eq!(buf.dbfs(), f64::NEG_INFINITY);
    }

    #[test]
    fn full_scale_tone_is_near_minus_three_dbfs() {
        // RMS of a full-scale sine is 1/sqrt(2) => ~-3.01 dBFS.
        let buf = tone(440.0, 16000, 1.0, 1.0);
        let db = buf.dbfs();
        assert!((db + 3.01).abs() < 0.1, "got {db}");
    }

    #[test]
    fn quiet_tone_is_quieter() {
        let loud = tone(440.0, 16000, 0.5, 0.8);
        let quiet = tone(440.0, 16000, 0.5, 0.01);
        assert!(loud.dbfs() > quiet.dbfs() + 30.0);
    }

    #[test]
    fn stereo_downmix_averages() {
        // L=1000, R=3000 -> mono 2000.
        let buf = AudioBuffer::new(vec![1000, 3000, 1000, 3000], 2, 16000);
        let mono = buf.mono_f32();
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 2000.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let buf = tone(440.0, 16000, 0.25, 0.5);
        buf.save(&path).unwrap();

        let loaded = AudioBuffer::load(&path).unwrap();
        assert_eq!(loaded.frames(), buf.frames());
        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.channels(), 1);
        assert_eq!(loaded.samples(), buf.samples());
    }
}
