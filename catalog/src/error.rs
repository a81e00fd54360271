use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog: json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog: audio error: {0}")]
    Audio(#[from] mosaic_audio::AudioError),

    #[error("catalog: transcription error: {0}")]
    Asr(#[from] mosaic_asr::AsrError),

    #[error("catalog: cannot decode {0}: ffmpeg unavailable")]
    DecodeUnavailable(String),
}
