use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsrError {
    #[error("asr: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("asr: API error: {0}")]
    Api(String),

    #[error("asr: malformed response: {0}")]
    Malformed(String),
}
