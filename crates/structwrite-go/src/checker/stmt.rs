//! Statement checking and local declarations.

use structwrite_core::model::ast::{
    AssignOp, Block, CaseClause, Expr, ExprKind, Ident, Stmt, StmtKind, TypeExpr, TypeSpec,
    UnaryOp, ValueSpec,
};
use structwrite_core::model::{TypeId, TypeKind};

use super::scope::Entity;
use super::FileChecker;

impl FileChecker<'_> {
    pub(super) fn block_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn scoped_block(&mut self, block: &Block) {
        self.scopes.push();
        self.block_stmts(&block.stmts);
        self.scopes.pop();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { lhs, op, rhs } => self.assign(lhs, op, rhs),
            StmtKind::IncDec(expr)
            | StmtKind::Expr(expr)
            | StmtKind::Go(expr)
            | StmtKind::Defer(expr) => {
                self.expr(expr, None);
            }
            StmtKind::Var(specs) => {
                for spec in specs {
                    let types = self.value_spec(spec);
                    for (name, ty) in spec.names.iter().zip(types) {
                        self.declare_value(name, ty, Entity::Var);
                    }
                }
            }
            StmtKind::Const(specs) => {
                for (name, entity) in self.value_group(specs, true) {
                    self.scopes.declare(&name, entity);
                }
            }
            StmtKind::Type(specs) => self.local_types(specs),
            StmtKind::Send(channel, value) => {
                let elem = self
                    .expr(channel, None)
                    .and_then(|ch| match self.under(ch) {
                        Some(TypeKind::Chan(elem)) => Some(elem),
                        _ => None,
                    });
                self.expr(value, elem);
            }
            StmtKind::Return(values) => {
                let expected = if values.len() == self.results.len() {
                    self.results.clone()
                } else {
                    Vec::new()
                };
                for (i, value) in values.iter().enumerate() {
                    self.expr(value, expected.get(i).copied());
                }
            }
            StmtKind::Block(block) => self.scoped_block(block),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.expr(cond, None);
                self.scoped_block(then);
                if let Some(els) = els {
                    self.stmt(els);
                }
                self.scopes.pop();
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(cond) = cond {
                    self.expr(cond, None);
                }
                if let Some(post) = post {
                    self.stmt(post);
                }
                self.scoped_block(body);
                self.scopes.pop();
            }
            StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            } => self.range(key.as_ref(), value.as_ref(), *define, expr, body),
            StmtKind::Switch { init, tag, clauses } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init);
                }
                let tag = tag.as_ref().and_then(|tag| self.expr(tag, None));
                for clause in clauses {
                    self.clause(clause, |checker, clause| {
                        for expr in &clause.exprs {
                            checker.expr(expr, tag);
                        }
                    });
                }
                self.scopes.pop();
            }
            StmtKind::TypeSwitch {
                init,
                binding,
                expr,
                clauses,
            } => {
                self.scopes.push();
                if let Some(init) = init {
                    self.stmt(init);
                }
                let subject = self.expr(expr, None);
                for clause in clauses {
                    self.clause(clause, |checker, clause| {
                        let Some(binding) = binding else { return };
                        let ty = match clause.types.as_slice() {
                            [single] if *single != TypeExpr::Name("nil".into()) => {
                                Some(checker.resolve_type(single))
                            }
                            _ => subject,
                        };
                        checker.declare_value(binding, ty, Entity::Var);
                    });
                }
                self.scopes.pop();
            }
            StmtKind::Select(clauses) => {
                for clause in clauses {
                    self.clause(clause, |checker, clause| {
                        if let Some(comm) = &clause.comm {
                            checker.stmt(comm);
                        }
                    });
                }
            }
            StmtKind::Labeled(inner) => self.stmt(inner),
            StmtKind::Branch => {}
        }
    }

    /// Checks one clause in its own scope; `header` handles the part
    /// before the colon.
    fn clause(&mut self, clause: &CaseClause, header: impl FnOnce(&mut Self, &CaseClause)) {
        self.scopes.push();
        header(self, clause);
        self.block_stmts(&clause.body);
        self.scopes.pop();
    }

    fn declare_value(&mut self, name: &Ident, ty: Option<TypeId>, make: fn(TypeId) -> Entity) {
        let entity = ty.map_or(Entity::Unresolved, make);
        self.scopes.declare(&name.name, entity);
    }

    fn assign(&mut self, lhs: &[Expr], op: &AssignOp, rhs: &[Expr]) {
        if *op != AssignOp::Define {
            let targets: Vec<Option<TypeId>> =
                lhs.iter().map(|target| self.expr(target, None)).collect();
            self.rhs_types(lhs.len(), rhs, Some(&targets));
            return;
        }

        let types = self.rhs_types(lhs.len(), rhs, None);
        for (target, ty) in lhs.iter().zip(types) {
            let ExprKind::Ident(name) = &target.kind else {
                continue;
            };
            match ty {
                Some(ty) => {
                    self.types.record_type(target.id, ty);
                    self.scopes.declare(name, Entity::Var(ty));
                }
                None => self.scopes.declare(name, Entity::Unresolved),
            }
        }
    }

    /// Types the right-hand side of an assignment of `count` targets.
    ///
    /// A single multi-value call, or a comma-ok form, is spread across the
    /// targets.
    fn rhs_types(
        &mut self,
        count: usize,
        rhs: &[Expr],
        expected: Option<&[Option<TypeId>]>,
    ) -> Vec<Option<TypeId>> {
        if let [value] = rhs {
            if count > 1 {
                let ty = self.expr(value, None);
                return match ty.and_then(|t| self.under(t)) {
                    Some(TypeKind::Tuple(elems)) => elems
                        .into_iter()
                        .map(Some)
                        .chain(std::iter::repeat(None))
                        .take(count)
                        .collect(),
                    _ if count == 2 && is_comma_ok(value) => vec![ty, Some(self.basic("bool"))],
                    _ => vec![None; count],
                };
            }
        }

        rhs.iter()
            .enumerate()
            .map(|(i, value)| {
                let want = expected.and_then(|e| e.get(i).copied().flatten());
                self.expr(value, want)
            })
            .collect()
    }

    /// Types of the names declared by one `var`/`const` spec.
    pub(super) fn value_spec(&mut self, spec: &ValueSpec) -> Vec<Option<TypeId>> {
        let declared = spec.ty.as_ref().map(|ty| self.resolve_type(ty));
        if spec.values.is_empty() {
            return vec![declared; spec.names.len()];
        }

        let expected = declared.map(|ty| vec![Some(ty); spec.names.len()]);
        let inferred = self.rhs_types(spec.names.len(), &spec.values, expected.as_deref());
        (0..spec.names.len())
            .map(|i| declared.or_else(|| inferred.get(i).copied().flatten()))
            .collect()
    }

    fn local_types(&mut self, specs: &[TypeSpec]) {
        for spec in specs {
            if spec.alias {
                let ty = self.resolve_type(&spec.ty);
                self.scopes.declare(&spec.name.name, Entity::Type(ty));
                continue;
            }
            let id = self.arena.named(self.package, spec.name.name.as_str());
            self.scopes.declare(&spec.name.name, Entity::Type(id));
            let underlying = self.resolve_type(&spec.ty);
            self.arena.set_underlying(id, underlying);
        }
    }

    fn range(
        &mut self,
        key: Option<&Expr>,
        value: Option<&Expr>,
        define: bool,
        expr: &Expr,
        body: &Block,
    ) {
        let subject = self.expr(expr, None);
        let shape = match subject.and_then(|s| self.under(s)) {
            Some(TypeKind::Pointer(ptr)) => self.under(ptr),
            other => other,
        };
        let (key_ty, value_ty) = match shape {
            Some(TypeKind::Slice(elem) | TypeKind::Array(elem)) => (Some(self.basic("int")), Some(elem)),
            Some(TypeKind::Map(k, v)) => (Some(k), Some(v)),
            Some(TypeKind::Chan(elem)) => (Some(elem), None),
            Some(TypeKind::Basic(name)) if name == "string" => {
                (Some(self.basic("int")), Some(self.basic("int32")))
            }
            Some(TypeKind::Basic(_)) => (subject, None),
            _ => (None, None),
        };

        self.scopes.push();
        if define {
            for (target, ty) in [(key, key_ty), (value, value_ty)] {
                let Some(target) = target else { continue };
                let ExprKind::Ident(name) = &target.kind else {
                    continue;
                };
                if let Some(ty) = ty {
                    self.types.record_type(target.id, ty);
                }
                self.scopes
                    .declare(name, ty.map_or(Entity::Unresolved, Entity::Var));
            }
        } else {
            for target in key.into_iter().chain(value) {
                self.expr(target, None);
            }
        }
        self.block_stmts(&body.stmts);
        self.scopes.pop();
    }
}

/// `v, ok := m[k]`, `x.(T)` and `<-ch` yield an extra boolean.
fn is_comma_ok(expr: &Expr) -> bool {
    matches!(
        expr.unparen().kind,
        ExprKind::Index { .. }
            | ExprKind::TypeAssert { .. }
            | ExprKind::Unary {
                op: UnaryOp::Recv,
                ..
            }
    )
}
