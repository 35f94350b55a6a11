//! # CKG Tags
//!
//! Lightweight definition/reference occurrences for the relationship pass.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Grammar (tree-sitter, per language)
//!     │      ├─ Class and function definitions
//!     │      ├─ Call targets (direct and attribute calls)
//!     │      └─ Base classes and annotations (Python)
//!     │
//!     ├──> Exclusions
//!     │      ├─ Builtins (static tables)
//!     │      ├─ Standard-library imports of the file
//!     │      └─ Configured allow/deny lists
//!     │
//!     └──> Lexical fallback
//!            └─ Name tokens, no position, when captures are one-sided
//! ```

mod builtins;
mod config;
mod error;
mod extractor;
mod grammar;
mod identifiers;
mod tag;

pub use builtins::{is_builtin, is_python_stdlib, python_module_callables};
pub use config::TagConfig;
pub use error::{Result, TagError};
pub use extractor::{TagExtractor, TagStream};
pub use identifiers::identifier_names;
pub use tag::{Capture, DefinitionKind, Tag, TagCategory, TagKind, TagLine};
