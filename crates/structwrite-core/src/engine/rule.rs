//! The `structwrite` rule: flags writes to and constructions of tracked
//! struct types outside constructor functions.

use tracing::debug;

use crate::config::{ConfigError, Settings};
use crate::context::FileContext;
use crate::model::ast::{Expr, ExprKind, SourceFile, Span, Stmt, StmtKind};
use crate::model::visit::{self, Visit};
use crate::model::TypeResolver;
use crate::rule::Rule;
use crate::types::{Label, Location, Severity, Suggestion, Violation};
use crate::utils::nolint::check_nolint;

use super::policy::ConstructorClassifier;
use super::registry::TrackedTypes;
use super::scope::ScopeIndex;
use super::selector::{SelectorResolver, TrackedMatch};

/// Rule code for structwrite violations.
pub const CODE: &str = "SW001";

/// Rule name, also the `//nolint:` linter name.
pub const NAME: &str = "structwrite";

/// Flags field writes and composite-literal constructions of tracked types
/// that happen outside a constructor.
///
/// # Examples
///
/// ```go
/// type Account struct{ Balance int }
///
/// func NewAccount() *Account { return &Account{Balance: 0} } // ok
///
/// func (a *Account) Reset() {
///     a.Balance = 0 // write to Account field outside constructor
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StructWrite {
    registry: TrackedTypes,
    classifier: ConstructorClassifier,
    severity: Severity,
    require_reason: bool,
}

impl Default for StructWrite {
    fn default() -> Self {
        Self::new(TrackedTypes::default(), ConstructorClassifier::default())
    }
}

impl StructWrite {
    /// Creates the rule from an explicit registry and classifier.
    #[must_use]
    pub fn new(registry: TrackedTypes, classifier: ConstructorClassifier) -> Self {
        Self {
            registry,
            classifier,
            severity: Severity::Error,
            require_reason: false,
        }
    }

    /// Builds the rule from decoded settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for invalid settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut classifier = ConstructorClassifier::new(settings.name_policy()?);
        if let Some(marker) = &settings.constructor_marker {
            classifier = classifier.with_marker(marker.trim());
        }
        let rule = Self::new(TrackedTypes::new(settings.structs.iter().cloned()), classifier)
            .severity(settings.severity.unwrap_or(Severity::Error))
            .require_reason(settings.require_nolint_reason);
        Ok(rule)
    }

    /// Sets the severity of reported violations.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Requires `//nolint:structwrite` directives to carry a reason.
    #[must_use]
    pub fn require_reason(mut self, require: bool) -> Self {
        self.require_reason = require;
        self
    }

    /// The tracked types.
    #[must_use]
    pub fn registry(&self) -> &TrackedTypes {
        &self.registry
    }

    /// The constructor classifier.
    #[must_use]
    pub fn classifier(&self) -> &ConstructorClassifier {
        &self.classifier
    }
}

impl Rule for StructWrite {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags writes to tracked struct types outside constructor functions"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(
        &self,
        ctx: &FileContext,
        file: &SourceFile,
        types: &dyn TypeResolver,
    ) -> Vec<Violation> {
        if self.registry.is_empty() {
            return Vec::new();
        }
        let mut visitor = StructWriteVisitor {
            rule: self,
            ctx,
            types,
            resolver: SelectorResolver::new(&self.registry),
            scopes: ScopeIndex::build(file),
            violations: Vec::new(),
        };
        visitor.visit_file(file);
        visitor.violations
    }
}

#[derive(Debug, Clone, Copy)]
enum Site {
    Write,
    Construction,
}

struct StructWriteVisitor<'a, 'ast> {
    rule: &'a StructWrite,
    ctx: &'a FileContext<'a>,
    types: &'a dyn TypeResolver,
    resolver: SelectorResolver<'a>,
    scopes: ScopeIndex<'ast>,
    violations: Vec<Violation>,
}

impl StructWriteVisitor<'_, '_> {
    fn check_write(&mut self, target: &Expr) {
        if let Some(found) = self.resolver.resolve_target(target, self.types) {
            self.report(target.span, &found, Site::Write);
        }
    }

    fn check_literal(&mut self, literal: &Expr) {
        let Some(ty) = self.types.type_of(literal.id) else {
            return;
        };
        if let Some(found) = self.resolver.match_type(ty, self.types) {
            self.report(literal.span, &found, Site::Construction);
        }
    }

    fn report(&mut self, span: Span, found: &TrackedMatch, site: Site) {
        let enclosing = self.scopes.enclosing(span.offset);
        if self.rule.classifier.is_constructor(&enclosing) {
            return;
        }

        let location = Location::from_span(self.ctx.relative_path.clone(), span);

        let allow = check_nolint(self.ctx.content, span.line, NAME);
        if allow.is_allowed() {
            debug!(
                file = %self.ctx.relative_path.display(),
                package = self.ctx.package_path,
                line = span.line,
                reason = allow.reason().unwrap_or("<none>"),
                "structwrite suppressed by nolint"
            );
            if self.rule.require_reason && allow.reason().is_none() {
                self.violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        Severity::Warning,
                        location,
                        format!("nolint directive for '{NAME}' is missing required reason"),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add `// reason` after the directive to explain the exception",
                    )),
                );
            }
            return;
        }

        let simple = &found.simple_name;
        let message = match site {
            Site::Write => format!("write to {simple} field outside constructor"),
            Site::Construction => format!("construction of {simple} outside constructor"),
        };
        debug!(
            file = %self.ctx.relative_path.display(),
            package = self.ctx.package_path,
            line = span.line,
            func = enclosing.describe(),
            ty = %found.qualified_name,
            "{message}"
        );

        let label = Label::new(
            location.clone(),
            format!("{} is immutable after construction", found.qualified_name),
        );
        let suggestion = Suggestion::new(format!(
            "move this into a constructor ({})",
            self.rule.classifier.naming()
        ));
        self.violations.push(
            Violation::new(CODE, NAME, self.rule.severity, location, message)
                .with_label(label)
                .with_suggestion(suggestion),
        );
    }
}

impl<'ast> Visit<'ast> for StructWriteVisitor<'_, 'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::Assign { lhs, .. } => {
                for target in lhs {
                    self.check_write(target);
                }
            }
            StmtKind::IncDec(target) => self.check_write(target),
            StmtKind::Range {
                key,
                value,
                define: false,
                ..
            } => {
                for target in key.iter().chain(value) {
                    self.check_write(target);
                }
            }
            _ => {}
        }
        visit::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if matches!(expr.kind, ExprKind::CompositeLit { .. }) {
            self.check_literal(expr);
        }
        visit::walk_expr(self, expr);
    }
}
