use std::path::{Component, Path};

/// Dotted module path for a file: its path relative to `module_root` with
/// the extension stripped and separators replaced by dots.
///
/// Files outside `module_root` fall back to their path relative to
/// `project_root`, then to the bare file stem.
pub fn module_path(file: &Path, project_root: &Path, module_root: Option<&Path>) -> String {
    let relative = module_root
        .and_then(|root| file.strip_prefix(root).ok())
        .or_else(|| file.strip_prefix(project_root).ok());

    let Some(relative) = relative else {
        return file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    };

    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Module path with its last segment removed; a top-level module is its
/// own package prefix.
pub fn package_prefix(module_path: &str) -> &str {
    module_path
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or(module_path)
}

/// Resolve the module named by `from <dots><module> import ...`.
///
/// `level` is the number of leading dots (0 for absolute imports).
pub fn resolve_import_module(current_module: &str, level: usize, module: &str) -> String {
    if level == 0 {
        return module.to_string();
    }

    let mut parts: Vec<&str> = current_module.split('.').collect();
    // One dot means "the package containing this module"
    for _ in 0..level {
        parts.pop();
    }
    if !module.is_empty() {
        parts.push(module);
    }
    parts.join(".")
}
