//! `//nolint` suppression directives.
//!
//! Supports the directive forms used by Go linters:
//! ```text
//! acct.Balance = 0 //nolint:structwrite // reset by migration
//!
//! //nolint:structwrite,errcheck // decoded from the wire
//! acct := model.Account{}
//! ```
//!
//! A directive on the reported line or on a comment-only line directly above
//! it applies. A bare `//nolint` (no linter list) and `//nolint:all` suppress
//! every rule.

use std::collections::HashSet;

const DIRECTIVE: &str = "//nolint";

/// Result of checking for a suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// The site is not suppressed.
    Denied,
    /// The site is suppressed, with an optional explanation.
    Allowed {
        /// Text after the trailing `//`, if any.
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if suppressed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if suppressed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed `//nolint` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NolintDirective {
    /// Linter names listed after `:`; empty means every linter.
    pub linters: HashSet<String>,
    /// Optional explanation.
    pub reason: Option<String>,
}

impl NolintDirective {
    /// Whether this directive suppresses `linter`.
    #[must_use]
    pub fn covers(&self, linter: &str) -> bool {
        self.linters.is_empty() || self.linters.contains(linter) || self.linters.contains("all")
    }
}

/// Checks whether a site on `line` (1-indexed) is suppressed for `linter`.
#[must_use]
pub fn check_nolint(content: &str, line: usize, linter: &str) -> AllowCheck {
    if line == 0 {
        return AllowCheck::Denied;
    }
    let lines: Vec<&str> = content.lines().collect();

    // Trailing directive on the line itself.
    if let Some(text) = lines.get(line - 1) {
        if let Some(directive) = text.find(DIRECTIVE).and_then(|at| parse_nolint(&text[at..])) {
            if directive.covers(linter) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    // Own-line directive directly above.
    if line >= 2 {
        if let Some(directive) = lines
            .get(line - 2)
            .map(|text| text.trim_start())
            .filter(|text| text.starts_with(DIRECTIVE))
            .and_then(parse_nolint)
        {
            if directive.covers(linter) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses a comment beginning with `//nolint`.
fn parse_nolint(comment: &str) -> Option<NolintDirective> {
    let rest = comment.strip_prefix(DIRECTIVE)?;

    // `//nolintfoo` is not a directive.
    if rest
        .chars()
        .next()
        .is_some_and(|c| !(c == ':' || c.is_whitespace()))
    {
        return None;
    }

    let (list, tail) = match rest.strip_prefix(':') {
        Some(after) => {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", rest),
    };

    let linters: HashSet<String> = list
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let reason = tail
        .trim()
        .strip_prefix("//")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(NolintDirective { linters, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_nolint() {
        let directive = parse_nolint("//nolint").unwrap();
        assert!(directive.linters.is_empty());
        assert!(directive.covers("structwrite"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_linter_list_and_reason() {
        let directive =
            parse_nolint("//nolint:structwrite,errcheck // decoded from the wire").unwrap();
        assert!(directive.linters.contains("structwrite"));
        assert!(directive.linters.contains("errcheck"));
        assert_eq!(directive.reason.as_deref(), Some("decoded from the wire"));
    }

    #[test]
    fn test_other_linter_does_not_cover() {
        let directive = parse_nolint("//nolint:errcheck").unwrap();
        assert!(!directive.covers("structwrite"));
        assert!(parse_nolint("//nolint:all").unwrap().covers("structwrite"));
    }

    #[test]
    fn test_lookalike_is_not_a_directive() {
        assert!(parse_nolint("//nolintstructwrite").is_none());
        assert!(parse_nolint("// nolint").is_none());
    }

    #[test]
    fn test_trailing_directive() {
        let content = "func f(a *Account) {\n\ta.Balance = 0 //nolint:structwrite // migration\n}";
        let result = check_nolint(content, 2, "structwrite");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), Some("migration"));
    }

    #[test]
    fn test_directive_on_line_above() {
        let content = "func f() {\n\t//nolint:structwrite\n\ta := Account{}\n}";
        let result = check_nolint(content, 3, "structwrite");
        assert!(result.is_allowed());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_trailing_directive_does_not_leak_to_next_line() {
        let content = "x := 1 //nolint\na.Balance = 0";
        assert_eq!(check_nolint(content, 2, "structwrite"), AllowCheck::Denied);
    }

    #[test]
    fn test_denied_without_directive() {
        let content = "a.Balance = 0";
        assert_eq!(check_nolint(content, 1, "structwrite"), AllowCheck::Denied);
        assert_eq!(check_nolint(content, 0, "structwrite"), AllowCheck::Denied);
        assert_eq!(check_nolint(content, 9, "structwrite"), AllowCheck::Denied);
    }
}
