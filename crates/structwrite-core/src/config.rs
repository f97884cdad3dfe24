//! Configuration types for structwrite.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::policy::NamePolicy;
use crate::Severity;

/// Top-level configuration, usually loaded from `structwrite.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Rule settings.
    #[serde(default)]
    pub structwrite: Settings,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has mistyped entries,
    /// such as a non-string element in `structs`.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks the decoded settings for problems serde cannot catch.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.structwrite.validate()
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Whether to analyze test files (`*_test.go`).
    #[serde(default = "default_true")]
    pub tests: bool,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,

    /// Abort instead of skipping files that fail to parse.
    #[serde(default)]
    pub fail_on_parse_error: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_excludes(),
            tests: true,
            respect_gitignore: true,
            parallelism: None,
            fail_on_parse_error: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_excludes() -> Vec<String> {
    vec!["**/vendor/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Settings of the structwrite rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Fully-qualified struct types (`import/path.Type`) to protect.
    #[serde(default)]
    pub structs: Vec<String>,

    /// Regular expression a constructor's name must match.
    /// Defaults to the `New` prefix when unset.
    #[serde(default, alias = "constructorNamePattern")]
    pub constructor_name_pattern: Option<String>,

    /// Doc-comment directive that also marks a function as a constructor,
    /// written without the leading `//` (e.g. `structwrite:constructor`).
    #[serde(default, alias = "constructorMarker")]
    pub constructor_marker: Option<String>,

    /// Severity override for reported violations.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Report `//nolint:structwrite` directives that give no explanation.
    #[serde(default, alias = "requireNolintReason")]
    pub require_nolint_reason: bool,
}

impl Settings {
    /// Builds the constructor naming policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the pattern does not compile.
    pub fn name_policy(&self) -> Result<NamePolicy, ConfigError> {
        match &self.constructor_name_pattern {
            None => Ok(NamePolicy::default()),
            Some(pattern) => NamePolicy::pattern(pattern).map_err(|e| {
                ConfigError::Validation(format!("constructor_name_pattern: {e}"))
            }),
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, name) in self.structs.iter().enumerate() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Validation(format!("structs[{i}]: empty type name")));
            }
            if trimmed != name {
                return Err(ConfigError::Validation(format!(
                    "structs[{i}]: '{name}' has surrounding whitespace"
                )));
            }
            match name.rsplit_once('.') {
                Some((package, ty)) if !package.is_empty() && !ty.is_empty() => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "structs[{i}]: '{name}' is not a fully qualified name (expected path/to/pkg.Type)"
                    )))
                }
            }
        }
        if let Some(marker) = &self.constructor_marker {
            if marker.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "constructor_marker: must not be empty".to_string(),
                ));
            }
        }
        self.name_policy().map(|_| ())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Decoded but semantically invalid settings.
    #[error("Invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.analyzer.tests);
        assert!(config.structwrite.structs.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./internal"
exclude = ["**/generated/**"]
parallelism = 2

[structwrite]
structs = ["example.com/app/model.Account", "example.com/app/model.Ledger"]
constructor_name_pattern = "^(New|Must)"
severity = "warning"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./internal"));
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert_eq!(config.structwrite.structs.len(), 2);
        assert_eq!(config.structwrite.severity, Some(Severity::Warning));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_aliases() {
        let toml = r#"
[structwrite]
structs = ["m.T"]
constructorNamePattern = "^Make"
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        let policy = config.structwrite.name_policy().unwrap();
        assert!(policy.matches("MakeT"));
        assert!(!policy.matches("NewT"));
    }

    #[test]
    fn test_non_string_struct_entry_is_fatal() {
        let toml = r#"
[structwrite]
structs = ["m.T", 42]
"#;
        let err = Config::parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let toml = r#"
[structwrite]
constructor_name_pattern = "New("
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("constructor_name_pattern"));
    }

    #[test]
    fn test_unqualified_struct_name_is_rejected() {
        let mut settings = Settings::default();
        settings.structs.push("Account".to_string());
        assert!(settings.validate().is_err());

        settings.structs[0] = " m.Account".to_string();
        assert!(settings.validate().is_err());

        settings.structs[0] = "example.com/m.Account".to_string();
        assert!(settings.validate().is_ok());
    }
}
