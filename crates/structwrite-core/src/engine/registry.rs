//! Set of types under immutability enforcement.

use std::collections::HashSet;

/// Fully-qualified names (`import/path.Type`) of the tracked struct types.
///
/// Built once from configuration and only read afterwards. Lookup is an
/// exact string match; import aliases are not normalized.
#[derive(Debug, Clone, Default)]
pub struct TrackedTypes {
    names: HashSet<String>,
}

impl TrackedTypes {
    /// Builds the registry. Duplicate entries collapse.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `qualified_name` is tracked.
    #[must_use]
    pub fn is_tracked(&self, qualified_name: &str) -> bool {
        self.names.contains(qualified_name)
    }

    /// Number of distinct tracked types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// An empty registry matches nothing and turns the rule into a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the tracked names in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Tracked names in sorted order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.iter().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let registry = TrackedTypes::new(["example.com/m.T"]);
        assert!(registry.is_tracked("example.com/m.T"));
        assert!(!registry.is_tracked("m.T"));
        assert!(!registry.is_tracked("example.com/m.TT"));
        assert!(!registry.is_tracked("example.com/m.t"));
    }

    #[test]
    fn duplicates_are_ignored() {
        let registry = TrackedTypes::new(["a.T", "b.U", "a.T"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sorted(), vec!["a.T", "b.U"]);
    }

    #[test]
    fn empty_registry_matches_nothing() {
        let registry = TrackedTypes::new(Vec::<String>::new());
        assert!(registry.is_empty());
        assert!(!registry.is_tracked(""));
    }
}
