use crate::config::ScannerConfig;
use crate::error::{Result, ScanError};
use crate::language::Language;
use crate::module_path::module_path;
use crate::pool::run_in_pool;
use crate::python::{FileContext, PythonAnalyzer};
use crate::source::{decode_source, split_lines};
use crate::types::{FileRecord, StructureTree};
use crate::walker::{SourceFile, SourceWalker};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of scanning a project
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Canonical project root
    pub root: PathBuf,

    pub tree: StructureTree,

    /// Every file that was scanned, in path order
    pub files: Vec<SourceFile>,
}

/// Walks a project and builds its structural tree.
///
/// Per-file problems (undecodable bytes, syntax errors, runaway nesting) are
/// logged and leave an empty record for that file; only an unreadable root
/// fails the scan.
pub struct SymbolScanner {
    config: ScannerConfig,
}

impl SymbolScanner {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        config.validate().map_err(ScanError::invalid_config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan every source file under `root`
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<ScanOutput> {
        let start = Instant::now();
        let root = canonical_root(root.as_ref())?;
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());

        let module_root = self.module_root(&root);
        let files = SourceWalker::new(&root, &self.config).walk();

        let records = self.analyze_all(&root, module_root.as_deref(), &files);

        let mut tree = StructureTree::new(root_name);
        for (file, record) in files.iter().zip(records) {
            if let Some(record) = record {
                tree.insert(&file.relative, record);
            }
        }

        log::info!(
            "Scanned {} files under {} in {:.2?}",
            tree.file_count(),
            root.display(),
            start.elapsed()
        );

        Ok(ScanOutput { root, tree, files })
    }

    /// Analyze a single in-memory source as if it lived at `absolute_path`
    pub fn analyze_source(
        &self,
        source: &str,
        absolute_path: &str,
        module_path: &str,
    ) -> Result<FileRecord> {
        let mut analyzer = PythonAnalyzer::new(self.config.max_depth)?;
        analyzer.analyze(
            source,
            FileContext {
                absolute_path,
                module_path,
            },
        )
    }

    fn module_root(&self, root: &Path) -> Option<PathBuf> {
        let configured = self.config.module_root.as_ref()?;
        let joined = if configured.is_absolute() {
            configured.clone()
        } else {
            root.join(configured)
        };
        match joined.canonicalize() {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!(
                    "Ignoring module root {}: {e}",
                    joined.display()
                );
                None
            }
        }
    }

    fn analyze_all(
        &self,
        root: &Path,
        module_root: Option<&Path>,
        files: &[SourceFile],
    ) -> Vec<Option<FileRecord>> {
        run_in_pool(self.config.threads, || {
            files
                .par_iter()
                .map_init(
                    || PythonAnalyzer::new(self.config.max_depth),
                    |analyzer, file| match analyzer {
                        Ok(analyzer) => scan_file(analyzer, root, module_root, file),
                        Err(e) => {
                            log::warn!("Analyzer unavailable for {}: {e}", file.relative);
                            None
                        }
                    },
                )
                .collect::<Vec<_>>()
        })
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical = root
        .canonicalize()
        .map_err(|e| ScanError::invalid_root(root, e))?;
    if !canonical.is_dir() {
        return Err(ScanError::invalid_root(root, "not a directory"));
    }
    std::fs::read_dir(&canonical).map_err(|e| ScanError::invalid_root(root, e))?;
    Ok(canonical)
}

/// Analyze one file. `None` means the file vanished or became unreadable
/// between the walk and the read.
fn scan_file(
    analyzer: &mut PythonAnalyzer,
    root: &Path,
    module_root: Option<&Path>,
    file: &SourceFile,
) -> Option<FileRecord> {
    let bytes = match std::fs::read(&file.absolute) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Skipping unreadable file {}: {e}", file.absolute.display());
            return None;
        }
    };

    let decoded = decode_source(&bytes);
    if decoded.lossy {
        log::warn!(
            "Undecodable bytes in {} replaced (decoded as {})",
            file.relative,
            decoded.encoding
        );
    }

    // Other languages keep their text for slicing but get no symbol records
    if !Language::from_path(&file.absolute).supports_structure() {
        log::debug!("{}: no structural analysis for this language", file.relative);
        return Some(FileRecord::empty(split_lines(&decoded.text)));
    }

    let absolute_path = file.absolute.to_string_lossy();
    let module = module_path(&file.absolute, root, module_root);
    let ctx = FileContext {
        absolute_path: &absolute_path,
        module_path: &module,
    };

    match analyzer.analyze(&decoded.text, ctx) {
        Ok(record) => {
            log::debug!(
                "{}: {} symbols",
                file.relative,
                record.symbol_count()
            );
            Some(record)
        }
        Err(e) => {
            log::warn!("No symbols recorded for {}: {e}", file.relative);
            Some(FileRecord::empty(split_lines(&decoded.text)))
        }
    }
}
