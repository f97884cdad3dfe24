//! Init command implementation.

use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# structwrite configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/testdata/**",
]

# Analyze *_test.go files
tests = true

# Respect .gitignore files
respect_gitignore = true

# Abort when a file does not parse instead of skipping it
fail_on_parse_error = false

[structwrite]
# Fully qualified struct types that may only be built or written inside
# constructors, e.g. "example.com/app/model.Account".
structs = []

# Constructor names must match this regex (default: prefix "New")
# constructor_name_pattern = "^(New|Must)"

# Doc-comment line that also marks a function as a constructor
# constructor_marker = "structwrite:constructor"

# Report //nolint:structwrite directives without a `// reason`
require_nolint_reason = false
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join("structwrite.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, template(dir))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. List the structs to protect under [structwrite]");
    println!("  2. Run: structwrite check");

    Ok(())
}

/// Default config, annotated with the Go modules found under `dir`.
fn template(dir: &Path) -> String {
    let modules = find_modules(dir);
    if modules.is_empty() {
        return DEFAULT_CONFIG.to_string();
    }

    let mut out = String::from("# Go modules found:\n");
    for module in &modules {
        let _ = writeln!(out, "#   {module}");
    }
    out.push('\n');
    out.push_str(DEFAULT_CONFIG);
    out
}

/// Module paths of every `go.mod` below `dir`, honouring `.gitignore`.
fn find_modules(dir: &Path) -> Vec<String> {
    let mut modules = Vec::new();
    for entry in ignore::WalkBuilder::new(dir).hidden(true).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping entry: {}", e);
                continue;
            }
        };
        if entry.file_name() != "go.mod" {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(entry.path()) {
            if let Some(module) = structwrite_go::parse_module_directive(&content) {
                modules.push(module);
            }
        }
    }
    modules.sort();
    modules
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use structwrite_core::Config;
    use tempfile::TempDir;

    #[test]
    fn default_template_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        config.validate().unwrap();
        assert!(config.structwrite.structs.is_empty());
        assert!(config.analyzer.tests);
    }

    #[test]
    fn writes_config_with_found_modules() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("svc")).unwrap();
        fs::write(tmp.path().join("svc").join("go.mod"), "module example.com/svc\n").unwrap();

        run(tmp.path(), false).unwrap();

        let written = fs::read_to_string(tmp.path().join("structwrite.toml")).unwrap();
        assert!(written.starts_with("# Go modules found:\n#   example.com/svc\n"));
        assert!(Config::parse(&written).is_ok());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("structwrite.toml"), "# mine\n").unwrap();

        assert!(run(tmp.path(), false).is_err());
        run(tmp.path(), true).unwrap();
        let written = fs::read_to_string(tmp.path().join("structwrite.toml")).unwrap();
        assert!(written.contains("[structwrite]"));
    }
}
