use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitor: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("monitor: json error: {0}")]
    Json(#[from] serde_json::Error),
}
