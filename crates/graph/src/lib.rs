//! # CKG Graph
//!
//! In-memory code knowledge graph over a scanned Python project.
//!
//! ## Architecture
//!
//! ```text
//! project root
//!     │
//!     ├──> SymbolScanner ──> StructureTree (classes, functions, variables)
//!     │
//!     ├──> TagExtractor ──> Tag stream (definitions, references)
//!     │
//!     └──> CkgRetriever::new
//!            ├─ pass 1: by-name / by-FQN / by-file maps, container intervals
//!            ├─ pass 2: RelationshipResolver turns references into
//!            │          CALLS / REFERENCES edges (unique names only)
//!            └─ query engine: lookups, relationships, reverse edges
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ckg_graph::{build_knowledge_graph, CkgConfig, RelationshipKind};
//!
//! let graph = build_knowledge_graph("/path/to/project", &CkgConfig::default())?;
//! let relations = graph.relationships_of("pkg/a.py", "pkg.a.A.foo");
//! for callee in relations.get(RelationshipKind::Calls) {
//!     println!("calls {}", callee.full_qualified_name());
//! }
//! # Ok::<(), ckg_graph::GraphError>(())
//! ```

mod builder;
mod config;
mod error;
mod graph;
mod indexer;
mod query;
pub mod registry;
mod resolver;
mod types;

pub use builder::{build_knowledge_graph, build_with_structure};
pub use config::{CkgConfig, ENV_MAX_DEPTH, ENV_MODULE_ROOT, ENV_SCAN_THREADS};
pub use error::{GraphError, Result};
pub use graph::RelationGraph;
pub use indexer::CkgRetriever;
pub use resolver::{find_container, RelationshipResolver, ResolvedEdge};
pub use types::{
    ContainerInterval, ContainerLabel, FileExcerpt, FileSymbols, GraphStats, RelationshipKind,
    Relationships, Symbol, SymbolLabel,
};
