use crate::error::{GraphError, Result};
use ckg_scanner::ScannerConfig;
use ckg_tags::TagConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_MAX_DEPTH: &str = "CKG_MAX_DEPTH";
pub const ENV_MODULE_ROOT: &str = "CKG_MODULE_ROOT";
pub const ENV_SCAN_THREADS: &str = "CKG_SCAN_THREADS";

/// Configuration of a knowledge-graph build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CkgConfig {
    pub scanner: ScannerConfig,
    pub tags: TagConfig,
}

impl CkgConfig {
    /// Read a TOML file; missing sections keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GraphError::ConfigFile(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// File (if given) then environment overrides, validated
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `CKG_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(depth) = parse_count(lookup(ENV_MAX_DEPTH).as_deref()) {
            self.scanner.max_depth = depth;
        }
        if let Some(root) = lookup(ENV_MODULE_ROOT)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
        {
            self.scanner.module_root = Some(PathBuf::from(root));
        }
        if let Some(threads) = parse_count(lookup(ENV_SCAN_THREADS).as_deref()) {
            self.scanner.threads = threads;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.scanner
            .validate()
            .map_err(|e| GraphError::invalid_config(format!("scanner: {e}")))?;
        self.tags
            .validate()
            .map_err(|e| GraphError::invalid_config(format!("tags: {e}")))?;
        Ok(())
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<usize>() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed count {raw:?}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_valid() {
        assert!(CkgConfig::default().validate().is_ok());
    }

    #[test]
    fn load_reads_partial_toml() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ckg.toml");
        std::fs::write(
            &path,
            "[scanner]\nmax_depth = 64\nextensions = [\"py\"]\n\n[tags]\ndeny = [\"helper\"]\n",
        )
        .unwrap();

        let config = CkgConfig::load(&path).unwrap();
        assert_eq!(config.scanner.max_depth, 64);
        assert_eq!(config.scanner.extensions, vec!["py".to_string()]);
        assert_eq!(config.scanner.threads, 0);
        assert_eq!(config.tags.deny, vec!["helper".to_string()]);
    }

    #[test]
    fn load_rejects_bad_files() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ckg.toml");

        std::fs::write(&path, "[scanner\nmax_depth = 1").unwrap();
        assert!(matches!(CkgConfig::load(&path), Err(GraphError::ConfigFile(_))));

        std::fs::write(&path, "[scanner]\nmax_depth = 0\n").unwrap();
        assert!(matches!(CkgConfig::load(&path), Err(GraphError::InvalidConfig(_))));

        assert!(matches!(
            CkgConfig::load(&temp.path().join("missing.toml")),
            Err(GraphError::IoError(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MAX_DEPTH, " 128 "),
            (ENV_MODULE_ROOT, "src"),
            (ENV_SCAN_THREADS, "not-a-number"),
        ]);
        let mut config = CkgConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.scanner.max_depth, 128);
        assert_eq!(config.scanner.module_root, Some(PathBuf::from("src")));
        assert_eq!(config.scanner.threads, 0);
    }

    #[test]
    #[serial]
    fn resolve_reads_process_environment() {
        std::env::set_var(ENV_SCAN_THREADS, "2");
        let config = CkgConfig::resolve(None);
        std::env::remove_var(ENV_SCAN_THREADS);

        assert_eq!(config.unwrap().scanner.threads, 2);
    }

    #[test]
    #[serial]
    fn resolve_validates_overridden_values() {
        std::env::set_var(ENV_MAX_DEPTH, "0");
        let config = CkgConfig::resolve(None);
        std::env::remove_var(ENV_MAX_DEPTH);

        assert!(matches!(config, Err(GraphError::InvalidConfig(_))));
    }
}
