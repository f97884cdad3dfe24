//! Check command implementation.

use anyhow::{Context, Result};
use structwrite_core::{Analyzer, Config, StructWrite};
use structwrite_go::GoFrontend;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Default)]
pub struct Options {
    /// Output format.
    pub format: OutputFormat,
    /// Extra tracked structs.
    pub structs: Vec<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Skip test files.
    pub no_tests: bool,
}

/// Loads the configuration a resolved source points at.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(p) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", p.display());
    }
    Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
}

/// Runs the check command.
///
/// Returns `true` when an error-severity violation was found.
pub fn run(path: &Path, options: Options, source: &ConfigSource) -> Result<bool> {
    let mut config = load_config(source)?;
    config.structwrite.structs.extend(options.structs);
    if options.no_tests {
        config.analyzer.tests = false;
    }
    config.validate().context("Invalid configuration")?;

    if config.structwrite.structs.is_empty() {
        tracing::warn!("No tracked structs configured; nothing will be reported");
    }

    let rule = StructWrite::from_settings(&config.structwrite)
        .context("Failed to build structwrite rule")?;

    let analyzer = Analyzer::builder()
        .root(path)
        .excludes(options.exclude)
        .rule(rule)
        .frontend(GoFrontend::new())
        .config(config)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, options.format, analyzer.root())?;

    Ok(result.has_errors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/app\n").unwrap();
        fs::write(
            tmp.path().join("t.go"),
            "package app\n\ntype T struct {\n\tA int\n}\n\nfunc set(t *T) {\n\tt.A = 1\n}\n",
        )
        .unwrap();
        fs::write(tmp.path().join("structwrite.toml"), config).unwrap();
        tmp
    }

    #[test]
    fn reports_failure_for_tracked_write() {
        let tmp = project("[structwrite]\nstructs = [\"example.com/app.T\"]\n");
        let source = ConfigSource::Project(tmp.path().join("structwrite.toml"));
        let options = Options {
            format: OutputFormat::Compact,
            ..Options::default()
        };
        assert!(run(tmp.path(), options, &source).unwrap());
    }

    #[test]
    fn severity_override_does_not_fail() {
        let tmp = project("[structwrite]\nstructs = [\"example.com/app.T\"]\nseverity = \"warning\"\n");
        let source = ConfigSource::Project(tmp.path().join("structwrite.toml"));
        let options = Options {
            format: OutputFormat::Json,
            ..Options::default()
        };
        assert!(!run(tmp.path(), options, &source).unwrap());
    }

    #[test]
    fn command_line_structs_are_added() {
        let tmp = project("");
        let options = Options {
            structs: vec!["example.com/app.T".into()],
            ..Options::default()
        };
        assert!(run(tmp.path(), options, &ConfigSource::Default).unwrap());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let tmp = project("[structwrite]\nstructs = [\"T\"]\n");
        let source = ConfigSource::Project(tmp.path().join("structwrite.toml"));
        let err = run(tmp.path(), Options::default(), &source).unwrap_err();
        assert!(format!("{err:#}").contains("not a fully qualified name"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let source = ConfigSource::Explicit("/nonexistent/structwrite.toml".into());
        assert!(load_config(&source).is_err());
    }
}
