//! Import-path discovery for package directories.
//!
//! A directory's import path comes from the nearest enclosing `go.mod`
//! (`module` directive plus the relative directory), then from a GOPATH
//! layout (everything after the last `src` component), and finally from
//! the directory's position under the analysis root.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use structwrite_core::FrontendError;
use tracing::debug;

/// A module root found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Module {
    dir: PathBuf,
    path: String,
}

/// Resolves directories to import paths, caching `go.mod` lookups.
#[derive(Debug)]
pub struct ModuleResolver {
    root: PathBuf,
    modules: HashMap<PathBuf, Option<Module>>,
}

impl ModuleResolver {
    /// Creates a resolver for files under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: HashMap::new(),
        }
    }

    /// Import path of the package in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a `go.mod` file exists but cannot be read.
    pub fn import_path(&mut self, dir: &Path) -> Result<String, FrontendError> {
        if let Some(module) = self.module_for(dir)? {
            let rel = dir.strip_prefix(&module.dir).unwrap_or(Path::new(""));
            let rel = slash_path(rel);
            return Ok(if rel.is_empty() {
                module.path
            } else {
                format!("{}/{rel}", module.path)
            });
        }

        if let Some(path) = gopath_import_path(dir) {
            return Ok(path);
        }

        let rel = slash_path(dir.strip_prefix(&self.root).unwrap_or(dir));
        if !rel.is_empty() {
            return Ok(rel);
        }
        Ok(self
            .root
            .file_name()
            .map_or_else(|| "main".to_owned(), |name| name.to_string_lossy().into_owned()))
    }

    fn module_for(&mut self, dir: &Path) -> Result<Option<Module>, FrontendError> {
        if let Some(cached) = self.modules.get(dir) {
            return Ok(cached.clone());
        }

        let mut found = None;
        for ancestor in dir.ancestors() {
            let manifest = ancestor.join("go.mod");
            if !manifest.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&manifest).map_err(|source| FrontendError::Io {
                path: manifest.clone(),
                source,
            })?;
            if let Some(path) = parse_module_directive(&content) {
                debug!("Module {} at {}", path, ancestor.display());
                found = Some(Module {
                    dir: ancestor.to_path_buf(),
                    path,
                });
                break;
            }
        }

        self.modules.insert(dir.to_path_buf(), found.clone());
        Ok(found)
    }
}

/// Extracts the module path from `go.mod` contents.
#[must_use]
pub fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_owned())
    })
}

/// Import path under a GOPATH-style `src` directory.
fn gopath_import_path(dir: &Path) -> Option<String> {
    let parts: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let src = parts.iter().rposition(|part| part == "src")?;
    let rest = &parts[src + 1..];
    (!rest.is_empty()).then(|| rest.join("/"))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_module_directive() {
        assert_eq!(
            parse_module_directive("// comment\nmodule example.com/app\n\ngo 1.22\n"),
            Some("example.com/app".into())
        );
        assert_eq!(
            parse_module_directive("module \"example.com/quoted\" // trailing\n"),
            Some("example.com/quoted".into())
        );
        assert_eq!(parse_module_directive("modulex foo\n"), None);
        assert_eq!(parse_module_directive("go 1.22\n"), None);
    }

    #[test]
    fn module_relative_import_paths() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/app\n").unwrap();
        let nested = temp.path().join("internal").join("model");
        fs::create_dir_all(&nested).unwrap();

        let mut resolver = ModuleResolver::new(temp.path());
        assert_eq!(resolver.import_path(temp.path()).unwrap(), "example.com/app");
        assert_eq!(
            resolver.import_path(&nested).unwrap(),
            "example.com/app/internal/model"
        );
    }

    #[test]
    fn gopath_layout() {
        let dir = Path::new("/work/gopath/src/github.com/username/linttestmodule");
        assert_eq!(
            gopath_import_path(dir).as_deref(),
            Some("github.com/username/linttestmodule")
        );
        assert_eq!(gopath_import_path(Path::new("/work/src")), None);
    }

    #[test]
    fn falls_back_to_root_relative_path() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("pkg").join("model");
        fs::create_dir_all(&pkg).unwrap();

        let mut resolver = ModuleResolver::new(temp.path());
        assert_eq!(resolver.import_path(&pkg).unwrap(), "pkg/model");
    }
}
