//! Constructor classification.
//!
//! A function is a constructor when its name satisfies the naming policy,
//! or when an optional marker comment precedes it. The classifier does not
//! look at receiver or result types: any constructor may write any tracked
//! type. A constructor for `U` that assigns into an unrelated tracked `W`
//! is therefore exempt too.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::scope::Enclosing;

/// Default constructor name prefix.
pub const DEFAULT_PREFIX: &str = "New";

/// Predicate over a function name.
#[derive(Clone)]
pub enum NamePolicy {
    /// Name starts with the given prefix (case-sensitive).
    Prefix(String),
    /// Name matches the regular expression.
    Pattern(Regex),
    /// Arbitrary predicate supplied by an embedding program.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NamePolicy {
    /// Compiles a pattern policy.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Evaluates the policy against a function name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Pattern(re) => re.is_match(name),
            Self::Custom(predicate) => predicate(name),
        }
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::Prefix(DEFAULT_PREFIX.to_owned())
    }
}

impl fmt::Debug for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => write!(f, "name starts with `{p}`"),
            Self::Pattern(re) => write!(f, "name matches `{}`", re.as_str()),
            Self::Custom(_) => f.write_str("custom constructor predicate"),
        }
    }
}

/// Decides whether an enclosing function may write tracked types.
#[derive(Debug, Clone, Default)]
pub struct ConstructorClassifier {
    naming: NamePolicy,
    marker: Option<String>,
}

impl ConstructorClassifier {
    /// Creates a classifier with the given naming policy and no marker.
    #[must_use]
    pub fn new(naming: NamePolicy) -> Self {
        Self {
            naming,
            marker: None,
        }
    }

    /// Also accepts functions documented with `//<marker>`.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// The naming policy in effect.
    #[must_use]
    pub fn naming(&self) -> &NamePolicy {
        &self.naming
    }

    /// Classifies the enclosing context of a write or construction site.
    ///
    /// [`Enclosing::None`] (package-level code) is never a constructor.
    #[must_use]
    pub fn is_constructor(&self, enclosing: &Enclosing<'_>) -> bool {
        let Enclosing::Function(func) = enclosing else {
            return false;
        };
        if self.naming.matches(&func.name.name) {
            return true;
        }
        self.marker.as_deref().is_some_and(|marker| {
            func.doc
                .iter()
                .any(|line| line.trim().strip_prefix("//").map(str::trim) == Some(marker))
        })
    }
}
