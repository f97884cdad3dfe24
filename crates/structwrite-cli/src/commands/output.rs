//! Shared output formatting for lint results.

use anyhow::Result;
use miette::{NamedSource, Report};
use serde::Serialize;
use std::path::Path;
use structwrite_core::{LintResult, Severity, Violation, ViolationDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Rich => print_rich(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }
    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
}

/// JSON document written by `--format json`.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    violations: &'a [Violation],
    files_checked: usize,
    errors: usize,
    warnings: usize,
}

impl<'a> From<&'a LintResult> for JsonReport<'a> {
    fn from(result: &'a LintResult) -> Self {
        let (errors, warnings, _) = result.count_by_severity();
        Self {
            violations: &result.violations,
            files_checked: result.files_checked,
            errors,
            warnings,
        }
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::from(result))?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_rich(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        let name = violation.location.file.display().to_string();
        let report = Report::new(ViolationDiagnostic::from(violation));
        match std::fs::read_to_string(root.join(&violation.location.file)) {
            Ok(content) => println!("{:?}", report.with_source_code(NamedSource::new(name, content))),
            Err(e) => {
                tracing::debug!("No source for {}: {}", name, e);
                print!("{}", violation.format());
            }
        }
    }
    print_summary(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use structwrite_core::Location;

    #[test]
    fn json_report_counts_severities() {
        let mut result = LintResult::new();
        result.files_checked = 3;
        result.violations.push(Violation::new(
            "SW001",
            "structwrite",
            Severity::Warning,
            Location::new(PathBuf::from("a.go"), 4, 2),
            "write to T field outside constructor",
        ));

        let value = serde_json::to_value(JsonReport::from(&result)).unwrap();
        assert_eq!(value["files_checked"], 3);
        assert_eq!(value["errors"], 0);
        assert_eq!(value["warnings"], 1);
        assert_eq!(value["violations"][0]["location"]["line"], 4);
        assert_eq!(value["violations"][0]["severity"], "warning");
    }
}
