use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the structural scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Maximum syntax-tree nesting the analyzer walks before giving up on a file
    pub max_depth: usize,

    /// Root that module paths are computed against (defaults to the project root)
    pub module_root: Option<PathBuf>,

    /// File extensions treated as source files
    pub extensions: Vec<String>,

    /// Files larger than this are skipped
    pub max_file_size_bytes: u64,

    /// Worker threads for per-file analysis (0 = rayon default)
    pub threads: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2_000,
            module_root: None,
            extensions: vec!["py".to_string(), "pyw".to_string(), "pyi".to_string()],
            max_file_size_bytes: 4 * 1_048_576,
            threads: 0,
        }
    }
}

impl ScannerConfig {
    /// Single-threaded scan, handy for tests and deterministic profiling
    pub fn sequential() -> Self {
        Self {
            threads: 1,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be > 0".to_string());
        }

        if self.extensions.is_empty() {
            return Err("extensions must not be empty".to_string());
        }

        if let Some(bad) = self.extensions.iter().find(|ext| ext.starts_with('.')) {
            return Err(format!("extension {bad:?} must not start with '.'"));
        }

        if self.max_file_size_bytes == 0 {
            return Err("max_file_size_bytes must be > 0".to_string());
        }

        Ok(())
    }

    pub(crate) fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}
