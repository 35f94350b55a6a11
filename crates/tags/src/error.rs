use thiserror::Error;

/// Result type for tag extraction
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors that can occur while extracting tags
#[derive(Error, Debug)]
pub enum TagError {
    /// No grammar is bundled for the file's language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The occurrence query for a grammar did not compile
    #[error("Query error: {0}")]
    QueryError(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TagError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<ckg_scanner::ScanError> for TagError {
    fn from(err: ckg_scanner::ScanError) -> Self {
        match err {
            ckg_scanner::ScanError::UnsupportedLanguage(lang) => Self::UnsupportedLanguage(lang),
            other => Self::TreeSitterError(other.to_string()),
        }
    }
}
