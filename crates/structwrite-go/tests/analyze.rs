//! End-to-end checks: Go sources on disk through the analyzer.

use std::fs;
use std::path::{Path, PathBuf};

use structwrite_core::{Analyzer, AnalyzerError, Config, LintResult, Settings, Severity, StructWrite};
use structwrite_go::GoFrontend;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn settings(structs: &[&str]) -> Settings {
    Settings {
        structs: structs.iter().map(ToString::to_string).collect(),
        ..Settings::default()
    }
}

fn analyze_with(
    root: &Path,
    settings: &Settings,
    config: Config,
) -> Result<LintResult, AnalyzerError> {
    Analyzer::builder()
        .root(root)
        .rule(StructWrite::from_settings(settings).unwrap())
        .frontend(GoFrontend::new())
        .config(config)
        .build()?
        .analyze()
}

fn analyze(root: &Path, settings: &Settings) -> LintResult {
    analyze_with(root, settings, Config::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn module(content: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "go.mod", "module example.com/app\n\ngo 1.22\n");
    for (name, source) in content {
        write(temp.path(), name, source);
    }
    temp
}

/// Collects `// want "..."` annotations below `root` as (file, line, message).
fn wanted(root: &Path) -> Vec<(PathBuf, usize, String)> {
    let mut found = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                dirs.push(path);
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("go") {
                continue;
            }
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            for (i, line) in fs::read_to_string(&path).unwrap().lines().enumerate() {
                let Some((_, tail)) = line.split_once("// want ") else {
                    continue;
                };
                for message in tail.split('"').skip(1).step_by(2) {
                    found.push((rel.clone(), i + 1, message.to_owned()));
                }
            }
        }
    }
    found.sort();
    found
}

fn reported(result: &LintResult) -> Vec<(PathBuf, usize, String)> {
    let mut found: Vec<_> = result
        .violations
        .iter()
        .map(|v| (v.location.file.clone(), v.location.line, v.message.clone()))
        .collect();
    found.sort();
    found
}

#[test]
fn linttestmodule_matches_annotations() {
    let root = fixture("gopath/src/github.com/username/linttestmodule");
    let result = analyze(&root, &settings(&["github.com/username/linttestmodule.NonWritable"]));

    assert_eq!(reported(&result), wanted(&root));
    assert_eq!(result.violations.len(), 17);
    assert_eq!(result.files_checked, 1);
}

#[test]
fn shop_module_matches_annotations() {
    let root = fixture("shop");
    let mut settings = settings(&[
        "example.com/shop/model.Order",
        "example.com/shop/model.Audit",
    ]);
    settings.constructor_marker = Some("structwrite:constructor".into());

    let result = analyze(&root, &settings);

    assert_eq!(reported(&result), wanted(&root));
    assert!(result.violations.iter().all(|v| v.code == "SW001"));
    assert!(result.has_errors());
}

#[test]
fn violations_carry_label_and_suggestion() {
    let root = fixture("shop");
    let result = analyze(&root, &settings(&["example.com/shop/model.Audit"]));

    let touch = result
        .violations
        .iter()
        .find(|v| v.location.line == 53)
        .expect("write through promoted field");
    assert_eq!(touch.message, "write to Audit field outside constructor");
    assert_eq!(
        touch.labels[0].message,
        "example.com/shop/model.Audit is immutable after construction"
    );
    assert_eq!(
        touch.suggestion.as_ref().unwrap().message,
        "move this into a constructor (name starts with `New`)"
    );
}

#[test]
fn marker_is_ignored_unless_configured() {
    let root = fixture("shop");
    let result = analyze(&root, &settings(&["example.com/shop/model.Order"]));

    let legacy = Path::new("model").join("order.go");
    assert!(result.violations.iter().any(|v| v.location.file == legacy
        && v.location.line == 36
        && v.message == "construction of Order outside constructor"));
}

#[test]
fn empty_tracked_list_reports_nothing() {
    let result = analyze(&fixture("shop"), &Settings::default());
    assert!(result.violations.is_empty());
    assert_eq!(result.files_checked, 2);
}

#[test]
fn custom_name_pattern_replaces_prefix() {
    let temp = module(&[(
        "app.go",
        r#"package app

type Config struct {
	Name string
}

func BuildConfig() *Config {
	return &Config{Name: "x"}
}

func NewConfig() *Config {
	return &Config{}
}
"#,
    )]);
    let mut settings = settings(&["example.com/app.Config"]);
    settings.constructor_name_pattern = Some("^Build".into());

    let result = analyze(temp.path(), &settings);

    let rendered: Vec<String> = result
        .violations
        .iter()
        .map(|v| {
            format!(
                "{}:{}:{} {}",
                v.location.file.display(),
                v.location.line,
                v.location.column,
                v.message
            )
        })
        .collect();
    insta::assert_snapshot!(
        rendered.join("\n"),
        @"app.go:12:10 construction of Config outside constructor"
    );
}

#[test]
fn unresolved_types_are_skipped() {
    let temp = module(&[
        (
            "app.go",
            r#"package app

import "example.com/missing/dep"

func Touch() {
	dep.Get().A = 1
	v := dep.T{A: 1}
	_ = v
}
"#,
        ),
        ("broken.go", "package app\n\nfunc (\n"),
    ]);

    let result = analyze(temp.path(), &settings(&["example.com/missing/dep.T"]));

    assert!(result.violations.is_empty());
    assert_eq!(result.files_checked, 1);
}

#[test]
fn parse_errors_can_abort() {
    let temp = module(&[("broken.go", "package app\n\nfunc (\n")]);
    let mut config = Config::default();
    config.analyzer.fail_on_parse_error = true;

    let err = analyze_with(temp.path(), &settings(&["example.com/app.T"]), config).unwrap_err();
    assert!(matches!(err, AnalyzerError::Parse { .. }));
}

#[test]
fn undecodable_file_is_skipped() {
    let temp = module(&[(
        "t.go",
        "package app\n\ntype T struct {\n\tA int\n}\n\nfunc set(t *T) {\n\tt.A = 1\n}\n",
    )]);
    fs::write(
        temp.path().join("latin1.go"),
        b"package app\n\n// caf\xe9\nfunc g() {}\n",
    )
    .unwrap();
    let tracked = settings(&["example.com/app.T"]);

    let result = analyze(temp.path(), &tracked);
    assert_eq!(result.files_checked, 1);
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].location.file, Path::new("t.go"));

    let mut config = Config::default();
    config.analyzer.fail_on_parse_error = true;
    let err = analyze_with(temp.path(), &tracked, config).unwrap_err();
    assert!(matches!(err, AnalyzerError::Parse { ref path, .. } if path.ends_with("latin1.go")));
}

#[test]
fn test_files_follow_config() {
    let temp = module(&[
        (
            "t.go",
            "package app\n\ntype T struct {\n\tA int\n}\n\nfunc NewT() *T {\n\treturn &T{}\n}\n",
        ),
        (
            "t_test.go",
            "package app\n\nfunc mutate(t *T) {\n\tt.A = 2\n}\n",
        ),
    ]);
    let tracked = settings(&["example.com/app.T"]);

    let with_tests = analyze(temp.path(), &tracked);
    assert_eq!(with_tests.violations.len(), 1);
    assert_eq!(with_tests.violations[0].location.file, Path::new("t_test.go"));

    let mut config = Config::default();
    config.analyzer.tests = false;
    let without_tests = analyze_with(temp.path(), &tracked, config).unwrap();
    assert!(without_tests.violations.is_empty());
}

#[test]
fn nolint_reason_can_be_required() {
    let temp = module(&[(
        "t.go",
        r#"package app

type T struct {
	A int
}

func patch(t *T) {
	t.A = 1 //nolint:structwrite
	//nolint:structwrite // fixture needs a broken value
	t.A = 2
}
"#,
    )]);
    let mut tracked = settings(&["example.com/app.T"]);

    let lenient = analyze(temp.path(), &tracked);
    assert!(lenient.violations.is_empty());

    tracked.require_nolint_reason = true;
    let strict = analyze(temp.path(), &tracked);
    assert_eq!(strict.violations.len(), 1);
    let warning = &strict.violations[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.location.line, 8);
    assert_eq!(
        warning.message,
        "nolint directive for 'structwrite' is missing required reason"
    );
}

#[test]
fn aliases_pointers_and_embedding() {
    let temp = module(&[(
        "t.go",
        r#"package app

type T struct {
	A int
	N *T
}

type Alias = T

type Holder struct {
	*T
	Name string
}

func NewHolder() *Holder {
	return &Holder{T: &T{}}
}

func use(h *Holder, ts map[string][]*T) {
	_ = Alias{}
	h.A++
	h.Name = "ok"
	ts["k"][0].N.A = 3
	h.T = nil
	var n int
	for n = range ts["k"] {
	}
	_ = n
}
"#,
    )]);

    let result = analyze(temp.path(), &settings(&["example.com/app.T"]));

    let lines: Vec<(usize, &str)> = result
        .violations
        .iter()
        .map(|v| (v.location.line, v.message.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (20, "construction of T outside constructor"),
            (21, "write to T field outside constructor"),
            (23, "write to T field outside constructor"),
        ]
    );
}

#[test]
fn any_constructor_may_write_any_tracked_type() {
    let temp = module(&[(
        "t.go",
        r#"package app

type T struct {
	A int
}

type Widget struct {
	t *T
}

func NewWidget(t *T) *Widget {
	t.A = 7
	bump := func() { t.A++ }
	bump()
	return &Widget{t: &T{A: 1}}
}
"#,
    )]);

    let result = analyze(temp.path(), &settings(&["example.com/app.T"]));
    assert!(result.violations.is_empty());
}
