//! Depth-first traversal over the syntax tree.
//!
//! Mirrors `syn::visit`: every `visit_*` method defaults to the matching
//! `walk_*` function, so implementors override only the nodes they care
//! about and call the `walk_*` function to keep descending.

use super::ast::{
    Block, CaseClause, Decl, Element, Expr, ExprKind, FuncDecl, SourceFile, Stmt, StmtKind,
    ValueSpec,
};

/// Syntax tree visitor.
pub trait Visit<'ast> {
    /// Visits a whole file.
    fn visit_file(&mut self, file: &'ast SourceFile) {
        walk_file(self, file);
    }

    /// Visits a top-level declaration.
    fn visit_decl(&mut self, decl: &'ast Decl) {
        walk_decl(self, decl);
    }

    /// Visits a function or method declaration.
    fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
        walk_func_decl(self, func);
    }

    /// Visits a `var`/`const` spec.
    fn visit_value_spec(&mut self, spec: &'ast ValueSpec) {
        walk_value_spec(self, spec);
    }

    /// Visits a block.
    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    /// Visits a statement.
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    /// Visits a switch or select clause.
    fn visit_case_clause(&mut self, clause: &'ast CaseClause) {
        walk_case_clause(self, clause);
    }

    /// Visits an expression.
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

/// Walks every declaration of `file`.
pub fn walk_file<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, file: &'ast SourceFile) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

/// Walks the children of a declaration.
pub fn walk_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, decl: &'ast Decl) {
    match decl {
        Decl::Func(func) => v.visit_func_decl(func),
        Decl::Var(specs) | Decl::Const(specs) => {
            for spec in specs {
                v.visit_value_spec(spec);
            }
        }
        Decl::Type(_) => {}
    }
}

/// Walks the body of a function declaration.
pub fn walk_func_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, func: &'ast FuncDecl) {
    if let Some(body) = &func.body {
        v.visit_block(body);
    }
}

/// Walks the initializers of a value spec.
pub fn walk_value_spec<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, spec: &'ast ValueSpec) {
    for value in &spec.values {
        v.visit_expr(value);
    }
}

/// Walks the statements of a block.
pub fn walk_block<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

/// Walks a case clause.
pub fn walk_case_clause<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, clause: &'ast CaseClause) {
    for expr in &clause.exprs {
        v.visit_expr(expr);
    }
    if let Some(comm) = &clause.comm {
        v.visit_stmt(comm);
    }
    for stmt in &clause.body {
        v.visit_stmt(stmt);
    }
}

/// Walks the children of a statement.
pub fn walk_stmt<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                v.visit_expr(expr);
            }
        }
        StmtKind::IncDec(expr)
        | StmtKind::Expr(expr)
        | StmtKind::Go(expr)
        | StmtKind::Defer(expr) => v.visit_expr(expr),
        StmtKind::Var(specs) | StmtKind::Const(specs) => {
            for spec in specs {
                v.visit_value_spec(spec);
            }
        }
        StmtKind::Type(_) | StmtKind::Branch => {}
        StmtKind::Send(ch, value) => {
            v.visit_expr(ch);
            v.visit_expr(value);
        }
        StmtKind::Return(values) => {
            for value in values {
                v.visit_expr(value);
            }
        }
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::If {
            init,
            cond,
            then,
            els,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            v.visit_block(then);
            if let Some(els) = els {
                v.visit_stmt(els);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(post) = post {
                v.visit_stmt(post);
            }
            v.visit_block(body);
        }
        StmtKind::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            for target in key.iter().chain(value) {
                v.visit_expr(target);
            }
            v.visit_expr(expr);
            v.visit_block(body);
        }
        StmtKind::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            for clause in clauses {
                v.visit_case_clause(clause);
            }
        }
        StmtKind::TypeSwitch {
            init,
            expr,
            clauses,
            ..
        } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(expr);
            for clause in clauses {
                v.visit_case_clause(clause);
            }
        }
        StmtKind::Select(clauses) => {
            for clause in clauses {
                v.visit_case_clause(clause);
            }
        }
        StmtKind::Labeled(inner) => v.visit_stmt(inner),
    }
}

fn walk_element<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, element: &'ast Element) {
    if let Some(key) = &element.key {
        v.visit_expr(key);
    }
    v.visit_expr(&element.value);
}

/// Walks the children of an expression.
pub fn walk_expr<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Ident(_) | ExprKind::Lit(_) | ExprKind::Bad => {}
        ExprKind::Selector { operand, .. }
        | ExprKind::Paren(operand)
        | ExprKind::Unary { operand, .. }
        | ExprKind::TypeAssert { operand, .. }
        | ExprKind::Conversion { operand, .. } => v.visit_expr(operand),
        ExprKind::Index { operand, index } => {
            v.visit_expr(operand);
            v.visit_expr(index);
        }
        ExprKind::Slice { operand, bounds } => {
            v.visit_expr(operand);
            for bound in bounds {
                v.visit_expr(bound);
            }
        }
        ExprKind::Call { func, args, .. } => {
            v.visit_expr(func);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::CompositeLit { elems, .. } => {
            for element in elems {
                walk_element(v, element);
            }
        }
        ExprKind::FuncLit { body, .. } => v.visit_block(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ast::{ExprId, Ident, Span};

    fn expr(id: u32, kind: ExprKind) -> Expr {
        Expr {
            id: ExprId(id),
            kind,
            span: Span::default(),
        }
    }

    struct Counter {
        literals: usize,
        idents: Vec<String>,
    }

    impl<'ast> Visit<'ast> for Counter {
        fn visit_expr(&mut self, e: &'ast Expr) {
            match &e.kind {
                ExprKind::CompositeLit { .. } => self.literals += 1,
                ExprKind::Ident(name) => self.idents.push(name.clone()),
                _ => {}
            }
            walk_expr(self, e);
        }
    }

    #[test]
    fn walks_nested_literals_and_closures() {
        let inner = expr(
            2,
            ExprKind::CompositeLit {
                ty: None,
                elems: vec![],
            },
        );
        let outer = expr(
            1,
            ExprKind::CompositeLit {
                ty: None,
                elems: vec![Element {
                    key: None,
                    value: inner,
                }],
            },
        );
        let closure = expr(
            3,
            ExprKind::FuncLit {
                params: vec![],
                results: vec![],
                body: Block {
                    stmts: vec![Stmt {
                        kind: StmtKind::Expr(outer),
                        span: Span::default(),
                    }],
                    span: Span::default(),
                },
            },
        );
        let file = SourceFile {
            decls: vec![Decl::Var(vec![ValueSpec {
                names: vec![Ident::new("f", Span::default())],
                ty: None,
                values: vec![closure],
            }])],
            ..SourceFile::default()
        };

        let mut counter = Counter {
            literals: 0,
            idents: vec![],
        };
        counter.visit_file(&file);
        assert_eq!(counter.literals, 2);
    }

    #[test]
    fn visits_assignment_targets_before_values() {
        let stmt = Stmt {
            kind: StmtKind::Assign {
                lhs: vec![expr(1, ExprKind::Ident("a".into()))],
                op: crate::model::ast::AssignOp::Assign,
                rhs: vec![expr(2, ExprKind::Ident("b".into()))],
            },
            span: Span::default(),
        };
        let mut counter = Counter {
            literals: 0,
            idents: vec![],
        };
        counter.visit_stmt(&stmt);
        assert_eq!(counter.idents, vec!["a", "b"]);
    }
}
