use crate::config::ScannerConfig;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// A source file selected for scanning
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub absolute: PathBuf,

    /// `/`-separated path relative to the project root
    pub relative: String,
}

/// Walker for finding Python sources in a project (.gitignore aware)
pub struct SourceWalker {
    root: PathBuf,
    config: ScannerConfig,
}

impl SourceWalker {
    pub fn new(root: impl AsRef<Path>, config: &ScannerConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: config.clone(),
        }
    }

    /// Walk the root and return matching files sorted by relative path
    pub fn walk(&self) -> Vec<SourceFile> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false);
        builder.filter_entry(move |entry| !is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.accepts(path) {
                        continue;
                    }

                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > self.config.max_file_size_bytes {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                self.config.max_file_size_bytes
                            );
                            continue;
                        }
                    }

                    let Some(relative) = relative_path(path, &self.root) else {
                        log::debug!("Skipping {} outside the project root", path.display());
                        continue;
                    };

                    files.push(SourceFile {
                        absolute: path.to_path_buf(),
                        relative,
                    });
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        log::info!("Found {} source files", files.len());
        files
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.accepts_extension(ext))
    }
}

fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn is_ignored_scope(path: &Path, root: &Path) -> bool {
    if let Ok(relative) = path.strip_prefix(root) {
        for component in relative.components() {
            if let Component::Normal(name) = component {
                let lowered = name.to_string_lossy().to_lowercase();
                if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                    return true;
                }
            }
        }
    }
    false
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    // virtualenvs / caches
    ".venv",
    "venv",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "__pycache__",
    "node_modules",
    "site-packages",
    // build output
    "build",
    "dist",
    ".eggs",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn relatives(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn finds_python_sources_in_path_order() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("pkg").join("sub")).unwrap();
        fs::write(temp.path().join("pkg").join("b.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("pkg").join("a.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("pkg").join("sub").join("c.pyi"), b"x: int\n").unwrap();
        fs::write(temp.path().join("README.md"), b"# readme\n").unwrap();

        let walker = SourceWalker::new(temp.path(), &ScannerConfig::default());
        let files = walker.walk();

        assert_eq!(relatives(&files), vec!["pkg/a.py", "pkg/b.py", "pkg/sub/c.pyi"]);
        assert!(files[0].absolute.ends_with("pkg/a.py"));
    }

    #[test]
    fn skips_ignored_directories() {
        let temp = tempdir().unwrap();
        let cache_dir = temp.path().join("__pycache__");
        let venv_dir = temp.path().join(".venv").join("lib");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::create_dir_all(&venv_dir).unwrap();
        fs::create_dir_all(temp.path().join("generated")).unwrap();
        fs::write(cache_dir.join("mod.py"), b"x = 1\n").unwrap();
        fs::write(venv_dir.join("dep.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("generated").join("out.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("main.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join(".gitignore"), b"/generated\n").unwrap();

        let walker = SourceWalker::new(temp.path(), &ScannerConfig::default());
        let files = walker.walk();

        assert_eq!(relatives(&files), vec!["main.py"]);
    }

    #[test]
    fn skips_files_over_size_limit() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("big.py"), vec![b'#'; 64]).unwrap();
        fs::write(temp.path().join("small.py"), b"x = 1\n").unwrap();

        let config = ScannerConfig {
            max_file_size_bytes: 32,
            ..ScannerConfig::default()
        };
        let files = SourceWalker::new(temp.path(), &config).walk();

        assert_eq!(relatives(&files), vec!["small.py"]);
    }
}
