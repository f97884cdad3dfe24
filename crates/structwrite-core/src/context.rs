//! Per-file context handed to rules.

use std::path::{Path, PathBuf};

/// The file a rule is currently checking.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path of the file on disk.
    pub path: &'a Path,
    /// File contents, used for suppression lookups.
    pub content: &'a str,
    /// Import path of the package the file belongs to.
    pub package_path: &'a str,
    /// Path relative to the analysis root, as shown in diagnostics.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, package_path: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            package_path,
            relative_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_root() {
        let ctx = FileContext::new(
            Path::new("/repo/model/account.go"),
            "",
            "example.com/app/model",
            Path::new("/repo"),
        );
        assert_eq!(ctx.relative_path, PathBuf::from("model/account.go"));
        assert_eq!(ctx.package_path, "example.com/app/model");
    }

    #[test]
    fn outside_root_keeps_path() {
        let ctx = FileContext::new(Path::new("/elsewhere/a.go"), "", "m", Path::new("/repo"));
        assert_eq!(ctx.relative_path, PathBuf::from("/elsewhere/a.go"));
    }
}
