//! Go front-end: parsing, package grouping and type checking.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use structwrite_core::model::ast::SourceFile;
use structwrite_core::{CheckedUnit, Frontend, FrontendError, LoadedProgram, ParseFailure};
use tracing::{debug, info};

use crate::checker::{self, Package};
use crate::module::ModuleResolver;
use crate::parser::{GoParser, ParseError};

/// Loads Go packages for the structwrite engine.
pub struct GoFrontend {
    parser: GoParser,
}

impl GoFrontend {
    /// Creates a new Go front-end.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: GoParser::new(),
        }
    }
}

impl Default for GoFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for GoFrontend {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn is_test_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with("_test.go"))
    }

    fn load(&self, root: &Path, files: &[PathBuf]) -> Result<LoadedProgram, FrontendError> {
        let mut failures = Vec::new();
        // Keyed by (directory, package clause) so external test packages
        // in the same directory stay separate.
        let mut groups: BTreeMap<(PathBuf, String), Vec<(SourceFile, String)>> = BTreeMap::new();

        for path in files {
            let bytes = std::fs::read(path).map_err(|source| FrontendError::Io {
                path: path.clone(),
                source,
            })?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(err) => {
                    failures.push(ParseFailure {
                        path: path.clone(),
                        message: format!("invalid UTF-8: {}", err.utf8_error()),
                    });
                    continue;
                }
            };
            match self.parser.parse(path, &content) {
                Ok(file) => {
                    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                    groups
                        .entry((dir, file.package.clone()))
                        .or_default()
                        .push((file, content));
                }
                Err(ParseError::Language(err)) => {
                    return Err(FrontendError::Language {
                        language: "go",
                        message: err.to_string(),
                    });
                }
                Err(err) => failures.push(ParseFailure {
                    path: path.clone(),
                    message: err.to_string(),
                }),
            }
        }

        let mut resolver = ModuleResolver::new(root);
        let mut packages = Vec::with_capacity(groups.len());
        let mut contents = Vec::with_capacity(groups.len());
        for ((dir, name), parsed) in groups {
            let mut path = resolver.import_path(&dir)?;
            if name.ends_with("_test") {
                path.push_str("_test");
            }
            debug!("Package {} ({} files)", path, parsed.len());

            let (files, texts): (Vec<_>, Vec<_>) = parsed.into_iter().unzip();
            packages.push(Package { path, name, files });
            contents.push(texts);
        }

        let checked = checker::check(&packages);
        info!(
            "Loaded {} Go packages ({} files skipped)",
            packages.len(),
            failures.len()
        );

        let mut units = Vec::new();
        for ((package, types), texts) in packages.into_iter().zip(checked.files).zip(contents) {
            for ((file, types), content) in package.files.into_iter().zip(types).zip(texts) {
                units.push(CheckedUnit {
                    path: file.path.clone(),
                    package_path: package.path.clone(),
                    content,
                    file,
                    types,
                });
            }
        }
        units.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(LoadedProgram {
            arena: checked.arena,
            units,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn recognizes_test_files() {
        let frontend = GoFrontend::new();
        assert!(frontend.is_test_file(Path::new("pkg/model_test.go")));
        assert!(!frontend.is_test_file(Path::new("pkg/model.go")));
        assert_eq!(frontend.extensions(), &[".go"]);
    }

    #[test]
    fn groups_files_into_packages() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/app\n").unwrap();
        fs::create_dir(temp.path().join("model")).unwrap();
        let a = temp.path().join("model").join("a.go");
        let b = temp.path().join("model").join("a_test.go");
        let broken = temp.path().join("model").join("broken.go");
        fs::write(&a, "package model\n\ntype T struct{ A int }\n").unwrap();
        fs::write(&b, "package model_test\n\nfunc f() {}\n").unwrap();
        fs::write(&broken, "package model\n\nfunc (\n").unwrap();

        let program = GoFrontend::new()
            .load(temp.path(), &[a.clone(), b.clone(), broken.clone()])
            .unwrap();

        assert_eq!(program.failures.len(), 1);
        assert_eq!(program.failures[0].path, broken);
        assert_eq!(program.units.len(), 2);
        let paths: Vec<&str> = program
            .units
            .iter()
            .map(|u| u.package_path.as_str())
            .collect();
        assert_eq!(paths, vec!["example.com/app/model", "example.com/app/model_test"]);
    }
}
