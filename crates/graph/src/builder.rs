use crate::config::CkgConfig;
use crate::error::{GraphError, Result};
use crate::indexer::CkgRetriever;
use ckg_scanner::{SourceWalker, StructureTree, SymbolScanner};
use ckg_tags::TagExtractor;
use std::path::Path;
use std::time::Instant;

/// Scan, tag and index the project under `root`
pub fn build_knowledge_graph(root: impl AsRef<Path>, config: &CkgConfig) -> Result<CkgRetriever> {
    config.validate()?;
    let start = Instant::now();

    let scanner = SymbolScanner::new(config.scanner.clone())?;
    let scan = scanner.scan(root.as_ref())?;

    let extractor =
        TagExtractor::new(&scan.root, config.tags.clone())?.with_threads(config.scanner.threads);
    let tags = extractor.extract_all(&scan.files);

    let retriever = CkgRetriever::new(&scan.root, scan.tree, tags);
    log::info!(
        "Knowledge graph for {} built in {:.2?}",
        scan.root.display(),
        start.elapsed()
    );
    Ok(retriever)
}

/// Index a previously built structural tree; only the tag pass re-reads files
pub fn build_with_structure(
    root: impl AsRef<Path>,
    tree: StructureTree,
    config: &CkgConfig,
) -> Result<CkgRetriever> {
    config.validate()?;
    let start = Instant::now();

    let root = root.as_ref().canonicalize().map_err(|e| GraphError::InvalidRoot {
        path: root.as_ref().to_path_buf(),
        reason: e.to_string(),
    })?;

    let files = SourceWalker::new(&root, &config.scanner).walk();
    let extractor =
        TagExtractor::new(&root, config.tags.clone())?.with_threads(config.scanner.threads);
    let tags = extractor.extract_all(&files);

    let retriever = CkgRetriever::new(&root, tree, tags);
    log::info!(
        "Knowledge graph for {} rebuilt from structure in {:.2?}",
        root.display(),
        start.elapsed()
    );
    Ok(retriever)
}
