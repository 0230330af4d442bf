use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("pdf extract failed for {path:?}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("docx extract failed for {path:?}: {message}")]
    Docx { path: PathBuf, message: String },
    #[error("unsupported plan format: {0:?}")]
    UnsupportedInput(PathBuf),
    #[error("unknown program: {0}")]
    UnknownProgram(String),
    #[error("other: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AdvisorError>;

impl From<anyhow::Error> for AdvisorError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}
