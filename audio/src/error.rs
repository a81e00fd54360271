use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio: wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio: unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio: resample error: {0}")]
    Resample(String),

    #[error("audio: empty buffer")]
    Empty,
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}
