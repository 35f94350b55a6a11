use std::path::PathBuf;
use thiserror::Error;

/// Result type for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while scanning a project
#[derive(Error, Debug)]
pub enum ScanError {
    /// The project root cannot be read at all
    #[error("Invalid project root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Source still has syntax errors after the legacy rewrite
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Traversal went deeper than the configured ceiling
    #[error("Depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// Unsupported language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl ScanError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create an invalid root error
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
