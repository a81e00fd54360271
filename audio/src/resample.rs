use rubato::{FftFixedInOut, Resampler};

use crate::error::AudioError;

/// Frames per processing block fed to rubato.
const CHUNK_FRAMES: usize = 1024;

/// Resample a mono float signal from `src_rate` to `dst_rate`.
///
/// Whole-signal offline conversion: the input is processed in fixed
/// blocks, the final block zero-padded, and the output truncated to the
/// rate-scaled length. Same-rate input is returned unchanged.
pub fn resample_mono(input: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>, AudioError> {
    if src_rate == dst_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(src_rate as usize, dst_rate as usize, CHUNK_FRAMES, 1)?;

    let expected = (input.len() as u64 * dst_rate as u64 / src_rate as u64) as usize;
    let mut output = Vec::with_capacity(expected + CHUNK_FRAMES);

    let mut pos = 0;
    while pos < input.len() {
        let need = resampler.input_frames_next();
        let take = need.min(input.len() - pos);
        let mut block = vec![0.0f32; need];
        block[..take].copy_from_slice(&input[pos..pos + take]);
        pos += take;

        let processed = resampler.process(&[block], None)?;
        output.extend_from_slice(&processed[0]);
    }

    output.truncate(expected);
    Ok(output)
}
