use anyhow::{Context as AnyhowContext, Result};
use ckg_graph::{registry, CkgConfig, CkgRetriever};
use ckg_scanner::{Language, SourceWalker, SymbolScanner};
use ckg_tags::TagExtractor;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn graph(root: &Path, config: &CkgConfig) -> Result<Arc<CkgRetriever>> {
    registry::get_or_build(root, config)
        .with_context(|| format!("Failed to build knowledge graph for {}", root.display()))
}

pub fn build(root: &Path, config: &CkgConfig) -> Result<Value> {
    let graph = graph(root, config)?;
    Ok(json!({
        "root": graph.root(),
        "stats": graph.stats(),
    }))
}

pub fn lookup(root: &Path, config: &CkgConfig, file: &str, fqn: &str) -> Result<Value> {
    let methods = graph(root, config)?.lookup_symbol_exact(file, fqn);
    Ok(serde_json::to_value(methods)?)
}

pub fn fuzzy(root: &Path, config: &CkgConfig, name: &str) -> Result<Value> {
    let methods = graph(root, config)?.lookup_method_fuzzy(name);
    Ok(serde_json::to_value(methods)?)
}

pub fn relations(root: &Path, config: &CkgConfig, file: &str, fqn: &str) -> Result<Value> {
    let relations = graph(root, config)?.relationships_of(file, fqn);
    Ok(serde_json::to_value(relations)?)
}

pub fn file_symbols(root: &Path, config: &CkgConfig, file: &str) -> Result<Value> {
    let symbols = graph(root, config)?.file_symbols(file);
    Ok(serde_json::to_value(symbols)?)
}

pub fn constructor(root: &Path, config: &CkgConfig, class: &str) -> Result<Value> {
    let constructors = graph(root, config)?.constructor_of(class);
    Ok(serde_json::to_value(constructors)?)
}

pub fn variables(root: &Path, config: &CkgConfig, name: &str, file: Option<&str>) -> Result<Value> {
    let graph = graph(root, config)?;
    let variables = match file {
        Some(file) => graph.variables_in_file(file, name),
        None => graph.variables_named(name),
    };
    Ok(serde_json::to_value(variables)?)
}

pub fn files(root: &Path, config: &CkgConfig, keyword: &str) -> Result<Value> {
    let paths = graph(root, config)?.files_containing(keyword);
    Ok(serde_json::to_value(paths)?)
}

pub fn callers(root: &Path, config: &CkgConfig, fqn: &str, references: bool) -> Result<Value> {
    let graph = graph(root, config)?;
    let sources = if references {
        graph.referrers_of(fqn)
    } else {
        graph.callers_of(fqn)
    };
    Ok(serde_json::to_value(sources)?)
}

/// Tags of one file, or of every source file under the root
pub fn tags(root: &Path, config: &CkgConfig, file: Option<&str>) -> Result<Value> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Invalid project path {}", root.display()))?;
    let extractor = TagExtractor::new(&root, config.tags.clone())
        .context("Invalid tag configuration")?
        .with_threads(config.scanner.threads);

    let tags = match file {
        Some(file) => {
            let path = root.join(file);
            if Language::from_path(&path) == Language::Unknown {
                log::warn!("{file} is not a recognized source file");
            }
            let relative = path
                .strip_prefix(&root)
                .map(|rel| rel.to_string_lossy().into_owned())
                .unwrap_or_else(|_| file.to_string());
            extractor.tags(&path, &relative).collect()
        }
        None => {
            let files = SourceWalker::new(&root, &config.scanner).walk();
            extractor.extract_all(&files)
        }
    };
    Ok(serde_json::to_value(tags)?)
}

pub fn structure(root: &Path, config: &CkgConfig) -> Result<Value> {
    let scanner = SymbolScanner::new(config.scanner.clone()).context("Invalid scanner configuration")?;
    let scan = scanner
        .scan(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    Ok(serde_json::to_value(&scan.tree)?)
}
