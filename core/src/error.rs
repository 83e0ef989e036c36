use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Cannot read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Cannot serialize relay payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Relay transport error: {0}")]
    Relay(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
