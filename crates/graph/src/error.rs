use ckg_scanner::ScanError;
use ckg_tags::TagError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// The project root cannot be scanned at all
    #[error("Invalid project root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Graph build error: {0}")]
    BuildError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file error: {0}")]
    ConfigFile(String),

    #[error("Scan error: {0}")]
    Scan(ScanError),

    #[error("Tag error: {0}")]
    Tags(#[from] TagError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GraphError {
    pub fn build(msg: impl Into<String>) -> Self {
        Self::BuildError(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<ScanError> for GraphError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidRoot { path, reason } => Self::InvalidRoot { path, reason },
            ScanError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::Scan(other),
        }
    }
}
