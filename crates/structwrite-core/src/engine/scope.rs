//! Maps source offsets to the function declaration that encloses them.

use crate::model::ast::{FuncDecl, SourceFile, Span};

/// Result of an enclosing-function lookup.
#[derive(Debug, Clone, Copy)]
pub enum Enclosing<'a> {
    /// The site is inside this function's body.
    Function(&'a FuncDecl),
    /// No function body contains the site (package-level initializer).
    None,
}

impl<'a> Enclosing<'a> {
    /// The enclosing declaration, if any.
    #[must_use]
    pub fn function(&self) -> Option<&'a FuncDecl> {
        match *self {
            Self::Function(func) => Some(func),
            Self::None => None,
        }
    }

    /// Name for log messages; `<package scope>` when absent.
    #[must_use]
    pub fn describe(&self) -> &'a str {
        match *self {
            Self::Function(func) => &func.name.name,
            Self::None => "<package scope>",
        }
    }
}

/// Per-file index of function body ranges.
///
/// Built once per file. Lookups return the innermost (smallest) body range
/// containing the offset.
#[derive(Debug)]
pub struct ScopeIndex<'a> {
    /// `(body span, declaration)` sorted by body start offset.
    bodies: Vec<(Span, &'a FuncDecl)>,
}

impl<'a> ScopeIndex<'a> {
    /// Indexes every function body of `file`.
    #[must_use]
    pub fn build(file: &'a SourceFile) -> Self {
        let mut bodies: Vec<(Span, &'a FuncDecl)> = file
            .funcs()
            .filter_map(|func| func.body.as_ref().map(|body| (body.span, func)))
            .collect();
        bodies.sort_by_key(|(span, _)| span.offset);
        Self { bodies }
    }

    /// Number of indexed bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the file has no function bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Innermost function whose body contains `offset`.
    #[must_use]
    pub fn enclosing(&self, offset: usize) -> Enclosing<'a> {
        // Bodies starting after `offset` cannot contain it.
        let candidates = self.bodies.partition_point(|(span, _)| span.offset <= offset);
        self.bodies[..candidates]
            .iter()
            .filter(|(span, _)| span.contains(offset))
            .min_by_key(|(span, _)| span.len)
            .map_or(Enclosing::None, |&(_, func)| Enclosing::Function(func))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ast::{Block, Decl, Ident};

    fn func(name: &str, body: Option<Span>) -> Decl {
        Decl::Func(FuncDecl {
            name: Ident::new(name, Span::default()),
            doc: vec![],
            receiver: None,
            params: vec![],
            results: vec![],
            body: body.map(|span| Block {
                stmts: vec![],
                span,
            }),
            span: Span::default(),
        })
    }

    fn file() -> SourceFile {
        SourceFile {
            decls: vec![
                func("B", Some(Span::new(10, 1, 200, 50))),
                func("A", Some(Span::new(1, 1, 10, 40))),
                func("External", None),
            ],
            ..SourceFile::default()
        }
    }

    #[test]
    fn finds_containing_body() {
        let file = file();
        let index = ScopeIndex::build(&file);
        assert_eq!(index.len(), 2);
        assert_eq!(index.enclosing(20).describe(), "A");
        assert_eq!(index.enclosing(249).describe(), "B");
    }

    #[test]
    fn body_bounds_are_inclusive() {
        let file = file();
        let index = ScopeIndex::build(&file);
        assert_eq!(index.enclosing(10).describe(), "A");
        assert_eq!(index.enclosing(50).describe(), "A");
    }

    #[test]
    fn outside_any_body_is_none() {
        let file = file();
        let index = ScopeIndex::build(&file);
        assert!(index.enclosing(0).function().is_none());
        assert!(index.enclosing(100).function().is_none());
        assert_eq!(index.enclosing(1000).describe(), "<package scope>");
    }

    #[test]
    fn empty_file_has_no_scopes() {
        let file = SourceFile::default();
        let index = ScopeIndex::build(&file);
        assert!(index.is_empty());
        assert!(matches!(index.enclosing(5), Enclosing::None));
    }
}
