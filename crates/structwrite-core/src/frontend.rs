//! Language front-end interface.
//!
//! A [`Frontend`] turns a set of source files into the program model the
//! engine consumes: one lowered [`SourceFile`] per input plus the type
//! tables produced by checking all files together.

use std::path::{Path, PathBuf};

use crate::model::ast::SourceFile;
use crate::model::{CheckedFile, FileTypes, TypeArena};

/// One parsed and type-checked file.
#[derive(Debug, Clone)]
pub struct CheckedUnit {
    /// Path of the file on disk.
    pub path: PathBuf,
    /// Import path of the file's package.
    pub package_path: String,
    /// File contents.
    pub content: String,
    /// Lowered syntax tree.
    pub file: SourceFile,
    /// Expression types and selections of this file.
    pub types: FileTypes,
}

/// A file the front-end could not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Path of the file on disk.
    pub path: PathBuf,
    /// Description of the first syntax error.
    pub message: String,
}

/// Everything a front-end produced for one analysis run.
#[derive(Debug, Default)]
pub struct LoadedProgram {
    /// Types shared by all units.
    pub arena: TypeArena,
    /// Successfully parsed files.
    pub units: Vec<CheckedUnit>,
    /// Files skipped because of syntax errors.
    pub failures: Vec<ParseFailure>,
}

impl LoadedProgram {
    /// Type view of one unit.
    #[must_use]
    pub fn checked<'a>(&'a self, unit: &'a CheckedUnit) -> CheckedFile<'a> {
        CheckedFile::new(&self.arena, &unit.types)
    }
}

/// Errors raised while loading a program.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// A source or module file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The grammar could not be loaded into the parser.
    #[error("Failed to initialize {language} parser: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Error reported by the parser library.
        message: String,
    },
}

/// Pluggable source-language support.
pub trait Frontend: Send + Sync {
    /// Language identifier (e.g., `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this front-end handles (e.g., `&[".go"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Whether `path` is a test file of this language.
    fn is_test_file(&self, _path: &Path) -> bool {
        false
    }

    /// Parses and type-checks `files`, which all live under `root`.
    ///
    /// Files with syntax errors are reported in
    /// [`LoadedProgram::failures`] instead of failing the whole load.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or the parser cannot be
    /// initialized.
    fn load(&self, root: &Path, files: &[PathBuf]) -> Result<LoadedProgram, FrontendError>;
}
