//! Core analyzer for orchestrating lint execution.

use crate::config::Config;
use crate::context::FileContext;
use crate::frontend::{CheckedUnit, Frontend, LoadedProgram};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Error parsing a source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Front-end failure.
    #[error(transparent)]
    Frontend(#[from] crate::frontend::FrontendError),

    /// No front-end was registered.
    #[error("No language front-end configured")]
    NoFrontend,

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    frontend: Option<Box<dyn Frontend>>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a per-file rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Sets the language front-end.
    #[must_use]
    pub fn frontend<F: Frontend + 'static>(mut self, frontend: F) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Caps the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if no front-end was set, an exclude pattern is not a
    /// valid glob, or the working directory cannot be determined.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let frontend = self.frontend.ok_or(AnalyzerError::NoFrontend)?;
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge exclude patterns from config
        let mut exclude_patterns = Vec::new();
        for pattern in self.exclude_patterns.iter().chain(&config.analyzer.exclude) {
            exclude_patterns.push(glob::Pattern::new(pattern)?);
        }

        Ok(Analyzer {
            root,
            rules: self.rules,
            frontend,
            exclude_patterns,
            fail_on_parse_error: self.fail_on_parse_error || config.analyzer.fail_on_parse_error,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
            config,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    frontend: Box<dyn Frontend>,
    exclude_patterns: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or loading fails, or if a file
    /// does not parse and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        for rule in &self.rules {
            debug!("Rule {} [{}]: {}", rule.name(), rule.code(), rule.description());
        }

        let files = self.discover_files()?;
        info!(
            "Found {} {} files to analyze",
            files.len(),
            self.frontend.language_id()
        );

        let program = self.frontend.load(&self.root, &files)?;

        for failure in &program.failures {
            warn!("Failed to parse {}: {}", failure.path.display(), failure.message);
            if self.fail_on_parse_error {
                return Err(AnalyzerError::Parse {
                    path: failure.path.clone(),
                    message: failure.message.clone(),
                });
            }
        }

        let check_all = || -> Vec<Vec<Violation>> {
            program
                .units
                .par_iter()
                .map(|unit| self.analyze_unit(&program, unit))
                .collect()
        };
        let per_file = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(check_all),
            None => check_all(),
        };

        let mut result = LintResult::new();
        for violations in per_file {
            result.violations.extend(violations);
            result.files_checked += 1;
        }
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every rule over one checked file.
    fn analyze_unit(&self, program: &LoadedProgram, unit: &CheckedUnit) -> Vec<Violation> {
        debug!("Analyzing: {}", unit.path.display());

        let ctx = FileContext::new(&unit.path, &unit.content, &unit.package_path, &self.root);
        let types = program.checked(unit);

        let mut violations = Vec::new();
        for rule in &self.rules {
            violations.extend(rule.check(&ctx, &unit.file, &types));
        }
        violations
    }

    /// Discovers all source files the front-end handles.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let extensions = self.frontend.extensions();

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .git_exclude(self.config.analyzer.respect_gitignore)
            .parents(self.config.analyzer.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_default();
            if !extensions.contains(&ext.as_str()) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            if !self.config.analyzer.tests && self.frontend.is_test_file(path) {
                debug!("Skipping test file: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let options = glob::MatchOptions {
            require_literal_separator: false,
            ..glob::MatchOptions::new()
        };
        self.exclude_patterns.iter().any(|pattern| {
            pattern.matches_path_with(path, options) || pattern.matches_path_with(relative, options)
        })
    }
}
