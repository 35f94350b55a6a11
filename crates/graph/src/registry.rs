//! Process-wide cache of built retrievers, keyed by canonical project root.
//!
//! Entries are immutable; a rebuild after source changes goes through
//! [`invalidate`] followed by [`get_or_build`].

use crate::builder::build_knowledge_graph;
use crate::config::CkgConfig;
use crate::error::{GraphError, Result};
use crate::indexer::CkgRetriever;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

static RETRIEVERS: Lazy<RwLock<HashMap<PathBuf, Arc<CkgRetriever>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn registry_key(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|e| GraphError::InvalidRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Cached retriever for `root`, building it on first use
pub fn get_or_build(root: impl AsRef<Path>, config: &CkgConfig) -> Result<Arc<CkgRetriever>> {
    let key = registry_key(root.as_ref())?;
    if let Some(found) = lookup(&key) {
        log::debug!("Reusing knowledge graph for {}", key.display());
        return Ok(found);
    }

    // Built outside the lock; a concurrent build of the same root keeps the first
    let built = Arc::new(build_knowledge_graph(&key, config)?);
    let mut guard = RETRIEVERS.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(guard.entry(key).or_insert(built)))
}

/// Cached retriever for `root`, if one was built
pub fn get(root: impl AsRef<Path>) -> Option<Arc<CkgRetriever>> {
    let key = registry_key(root.as_ref()).ok()?;
    lookup(&key)
}

/// Drop the cached retriever for `root`; true when one was cached
pub fn invalidate(root: impl AsRef<Path>) -> bool {
    let Ok(key) = registry_key(root.as_ref()) else {
        return false;
    };
    RETRIEVERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&key)
        .is_some()
}

/// Drop every cached retriever
pub fn reset() {
    RETRIEVERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

fn lookup(key: &Path) -> Option<Arc<CkgRetriever>> {
    RETRIEVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}
