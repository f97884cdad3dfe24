//! Locating `structwrite.toml`.
//!
//! Order: the `--config` flag, then the nearest `structwrite.toml` or
//! `.structwrite.toml` in the analyzed directory or one of its ancestors
//! (the search stops at a repository root, i.e. a directory holding `.git`),
//! then `config.toml` in the global directory, then built-in defaults.

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found next to or above the analyzed directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["structwrite.toml", ".structwrite.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_with(project_dir, explicit, global_config_dir())
}

fn resolve_with(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    let global = global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file());
    match global {
        Some(candidate) => {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        }
        None => ConfigSource::Default,
    }
}

fn find_project_config(project_dir: &Path) -> Option<PathBuf> {
    let start = std::fs::canonicalize(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// Global config directory: `$STRUCTWRITE_CONFIG_DIR`, else
/// `~/.structwrite/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("STRUCTWRITE_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".structwrite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A temp dir that looks like a repository root.
    fn repo() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        tmp
    }

    fn canonical(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap()
    }

    #[test]
    fn explicit_wins_without_existence_check() {
        let tmp = repo();
        fs::write(tmp.path().join("structwrite.toml"), "").unwrap();

        let result = resolve_with(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/nonexistent.toml")));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = repo();
        fs::write(tmp.path().join("structwrite.toml"), "").unwrap();
        fs::write(tmp.path().join(".structwrite.toml"), "").unwrap();

        let result = resolve_with(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path()).join("structwrite.toml"))
        );
    }

    #[test]
    fn dot_prefixed_name_is_found() {
        let tmp = repo();
        fs::write(tmp.path().join(".structwrite.toml"), "").unwrap();

        let result = resolve_with(tmp.path(), None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path()).join(".structwrite.toml"))
        );
    }

    #[test]
    fn nested_package_uses_repository_config() {
        let tmp = repo();
        fs::write(tmp.path().join("structwrite.toml"), "").unwrap();
        let nested = tmp.path().join("internal").join("model");
        fs::create_dir_all(&nested).unwrap();

        let result = resolve_with(&nested, None, None);
        assert_eq!(
            result,
            ConfigSource::Project(canonical(tmp.path()).join("structwrite.toml"))
        );
    }

    #[test]
    fn search_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("structwrite.toml"), "").unwrap();
        let inner = outer.path().join("checkout");
        fs::create_dir_all(inner.join(".git")).unwrap();

        let result = resolve_with(&inner, None, None);
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn global_used_only_without_project_config() {
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let bare = repo();
        let result = resolve_with(bare.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
        assert!(result.is_global());

        let configured = repo();
        fs::write(configured.path().join("structwrite.toml"), "").unwrap();
        let result = resolve_with(configured.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn empty_global_dir_falls_back_to_defaults() {
        let global = TempDir::new().unwrap();
        let project = repo();

        let result = resolve_with(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }
}
