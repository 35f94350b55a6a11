//! # CKG Scanner
//!
//! Structural scan of Python projects into a nested tree of file records.
//!
//! ## Pipeline
//!
//! ```text
//! Project root
//!     │
//!     ├──> Source Walker (.gitignore aware)
//!     │      └─> Sorted source files
//!     │
//!     ├──> Decoder (UTF-8, BOM, detected fallback)
//!     │
//!     ├──> Python Analyzer (tree-sitter, parallel per file)
//!     │      ├─ Legacy syntax rewrite on parse failure
//!     │      ├─ Classes, methods, functions
//!     │      └─ Module and class level assignments
//!     │
//!     └──> Structure Tree
//!            └─ root name → dirs → file → FileRecord
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ckg_scanner::{ScannerConfig, SymbolScanner};
//!
//! fn main() -> ckg_scanner::Result<()> {
//!     let scanner = SymbolScanner::new(ScannerConfig::default())?;
//!     let output = scanner.scan("/path/to/project")?;
//!
//!     println!("Scanned {} files", output.tree.file_count());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod language;
mod legacy;
mod module_path;
mod pool;
mod python;
mod scanner;
mod source;
mod types;
mod walker;

pub use config::ScannerConfig;
pub use error::{Result, ScanError};
pub use language::Language;
pub use legacy::rewrite_legacy_syntax;
pub use module_path::{module_path, package_prefix, resolve_import_module};
pub use pool::run_in_pool;
pub use python::{FileContext, PythonAnalyzer};
pub use scanner::{ScanOutput, SymbolScanner};
pub use source::{decode_source, split_lines, DecodedSource};
pub use types::{
    ClassRecord, ClassType, FileRecord, MethodRecord, MethodType, Param, StructureTree, TreeNode,
    VariableRecord,
};
pub use walker::{SourceFile, SourceWalker};
