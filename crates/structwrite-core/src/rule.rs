//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::model::ast::SourceFile;
use crate::model::TypeResolver;
use crate::types::{Severity, Violation};

/// A per-file lint rule over a type-checked syntax tree.
///
/// Rules receive the lowered AST together with the file's resolved types and
/// usually traverse it with [`Visit`](crate::model::visit::Visit).
///
/// # Example
///
/// ```ignore
/// use structwrite_core::{FileContext, Rule, Violation};
/// use structwrite_core::model::{ast::SourceFile, TypeResolver};
///
/// pub struct NoGlobals;
///
/// impl Rule for NoGlobals {
///     fn name(&self) -> &'static str { "no-globals" }
///     fn code(&self) -> &'static str { "SW100" }
///
///     fn check(&self, ctx: &FileContext, file: &SourceFile, types: &dyn TypeResolver) -> Vec<Violation> {
///         let mut visitor = GlobalVisitor::new(ctx, types);
///         visitor.visit_file(file);
///         visitor.violations
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the name of this rule as used in `//nolint:<name>`.
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "SW001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks a single file and returns any violations found.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `file` - The lowered syntax tree of the file
    /// * `types` - Type information for the file's expressions
    fn check(&self, ctx: &FileContext, file: &SourceFile, types: &dyn TypeResolver)
        -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
