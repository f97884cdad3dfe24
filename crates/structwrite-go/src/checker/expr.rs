//! Expression typing.

use std::collections::HashSet;

use structwrite_core::model::ast::{Block, Element, Expr, ExprKind, LitKind, Param, TypeExpr, UnaryOp};
use structwrite_core::model::{TypeId, TypeKind};

use super::scope::{Builtin, Entity};
use super::FileChecker;

/// Embedding depth searched when resolving promoted fields and methods.
const MAX_EMBED_DEPTH: usize = 8;

/// Result of looking up `x.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Member {
    /// A field, reached through `path` (outermost first).
    Field { path: Vec<usize>, ty: TypeId },
    /// A method value.
    Method(TypeId),
}

impl FileChecker<'_> {
    /// Types `expr` and records the result.
    ///
    /// `expected` is the type the context requires; it types elided
    /// composite literals such as the inner `{...}` of `[]*T{{...}}`.
    pub(super) fn expr(&mut self, expr: &Expr, expected: Option<TypeId>) -> Option<TypeId> {
        let ty = self.expr_kind(expr, expected);
        if let Some(ty) = ty {
            self.types.record_type(expr.id, ty);
        }
        ty
    }

    fn expr_kind(&mut self, expr: &Expr, expected: Option<TypeId>) -> Option<TypeId> {
        match &expr.kind {
            ExprKind::Ident(name) => self.lookup(name)?.value_type(),
            ExprKind::Lit(kind) => Some(self.literal(*kind)),
            ExprKind::Selector { operand, field } => self.selector(expr, operand, &field.name),
            ExprKind::Index { operand, index } => self.index(operand, index),
            ExprKind::Slice { operand, bounds } => {
                for bound in bounds {
                    self.expr(bound, None);
                }
                self.slice(operand)
            }
            ExprKind::Call {
                func,
                args,
                type_arg,
            } => self.call(func, args, type_arg.as_ref()),
            ExprKind::Unary { op, operand } => self.unary(*op, operand, expected),
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.expr(lhs, None);
                let right = self.expr(rhs, left);
                match op.as_str() {
                    "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||" => Some(self.basic("bool")),
                    "<<" | ">>" => left,
                    _ => left.or(right),
                }
            }
            ExprKind::Paren(inner) => self.expr(inner, expected),
            ExprKind::CompositeLit { ty, elems } => self.composite(ty.as_ref(), elems, expected),
            ExprKind::FuncLit {
                params,
                results,
                body,
            } => Some(self.func_lit(params, results, body)),
            ExprKind::TypeAssert { operand, ty } => {
                self.expr(operand, None);
                ty.as_ref().map(|ty| self.resolve_type(ty))
            }
            ExprKind::Conversion { ty, operand } => {
                let target = self.resolve_type(ty);
                self.expr(operand, None);
                Some(target)
            }
            ExprKind::Bad => None,
        }
    }

    fn literal(&mut self, kind: LitKind) -> TypeId {
        self.basic(match kind {
            LitKind::Int => "int",
            LitKind::Float => "float64",
            LitKind::Imag => "complex128",
            LitKind::Rune => "int32",
            LitKind::Str => "string",
        })
    }

    fn selector(&mut self, expr: &Expr, operand: &Expr, name: &str) -> Option<TypeId> {
        if let Some(package) = operand.as_ident() {
            if let Some(Entity::Import(path)) = self.lookup(package) {
                return self.index.member(&path, name)?.value_type();
            }
        }

        let receiver = self.expr(operand, None)?;
        match self.lookup_member(receiver, name)? {
            Member::Field { path, ty } => {
                self.types.record_selection(expr.id, path);
                Some(ty)
            }
            Member::Method(sig) => Some(sig),
        }
    }

    /// Finds field or method `name` of `receiver`, searching embedded
    /// fields breadth first the way Go promotes them.
    pub(super) fn lookup_member(&self, receiver: TypeId, name: &str) -> Option<Member> {
        let mut level = vec![(self.deref(receiver), Vec::new())];
        let mut seen = HashSet::new();

        for _ in 0..MAX_EMBED_DEPTH {
            let mut found = None;
            let mut next = Vec::new();

            for (ty, path) in &level {
                if !seen.insert(*ty) {
                    continue;
                }
                if let Some(sig) = self.index.method(*ty, name) {
                    found.get_or_insert(Member::Method(sig));
                    continue;
                }
                let Some(fields) = self.struct_fields(*ty) else {
                    continue;
                };
                for (i, field) in fields.iter().enumerate() {
                    let mut field_path = path.clone();
                    field_path.push(i);
                    if field.name == name {
                        found.get_or_insert(Member::Field {
                            path: field_path,
                            ty: field.ty,
                        });
                    } else if field.embedded {
                        next.push((self.deref(field.ty), field_path));
                    }
                }
            }

            if found.is_some() || next.is_empty() {
                return found;
            }
            level = next;
        }
        None
    }

    fn index(&mut self, operand: &Expr, index: &Expr) -> Option<TypeId> {
        let Some(container) = self.expr(operand, None) else {
            self.expr(index, None);
            return None;
        };

        let shape = match self.under(container) {
            Some(TypeKind::Pointer(elem)) => self.under(elem),
            other => other,
        };
        let (key, elem) = match shape {
            Some(TypeKind::Slice(elem) | TypeKind::Array(elem)) => (Some(self.basic("int")), Some(elem)),
            Some(TypeKind::Map(key, value)) => (Some(key), Some(value)),
            Some(TypeKind::Basic(name)) if name == "string" => {
                (Some(self.basic("int")), Some(self.basic("uint8")))
            }
            // Instantiation of a generic function.
            Some(TypeKind::Signature { .. }) => (None, Some(container)),
            _ => (None, None),
        };
        self.expr(index, key);
        elem
    }

    fn slice(&mut self, operand: &Expr) -> Option<TypeId> {
        let sliced = self.expr(operand, None)?;
        match self.under(sliced)? {
            TypeKind::Slice(_) | TypeKind::Basic(_) => Some(sliced),
            TypeKind::Array(elem) => Some(self.arena.slice(elem)),
            TypeKind::Pointer(ptr) => match self.under(ptr)? {
                TypeKind::Array(elem) => Some(self.arena.slice(elem)),
                _ => None,
            },
            _ => None,
        }
    }

    fn call(&mut self, func: &Expr, args: &[Expr], type_arg: Option<&TypeExpr>) -> Option<TypeId> {
        if let Some(name) = func.as_ident() {
            if let Some(Entity::Builtin(builtin)) = self.lookup(name) {
                return self.builtin(builtin, args, type_arg);
            }
        }

        if let Some(target) = self.expr_as_type(func) {
            for arg in args {
                self.expr(arg, None);
            }
            return Some(target);
        }

        let callee = self.expr(func, None);
        let Some(TypeKind::Signature { params, results }) = callee.and_then(|c| self.under(c)) else {
            for arg in args {
                self.expr(arg, None);
            }
            return None;
        };

        for (i, arg) in args.iter().enumerate() {
            let expected = params.get(i).or(params.last()).copied();
            self.expr(arg, expected);
        }
        match results.as_slice() {
            [] => None,
            [single] => Some(*single),
            _ => Some(self.arena.tuple(results.clone())),
        }
    }

    fn builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
        type_arg: Option<&TypeExpr>,
    ) -> Option<TypeId> {
        let takes_type = matches!(builtin, Builtin::New | Builtin::Make);
        let type_arg = match type_arg {
            Some(ty) => Some(self.resolve_type(ty)),
            None if takes_type => args.first().and_then(|arg| self.expr_as_type(arg)),
            None => None,
        };

        let arg_types: Vec<Option<TypeId>> = args.iter().map(|arg| self.expr(arg, None)).collect();

        match builtin {
            Builtin::New => type_arg.map(|ty| self.arena.pointer(ty)),
            Builtin::Make => type_arg,
            Builtin::Len | Builtin::Cap | Builtin::Copy => Some(self.basic("int")),
            Builtin::Append | Builtin::Min | Builtin::Max => arg_types.first().copied().flatten(),
            Builtin::Complex => Some(self.basic("complex128")),
            Builtin::Real | Builtin::Imag => Some(self.basic("float64")),
            Builtin::Recover => Some(self.arena.opaque("any")),
            Builtin::Clear
            | Builtin::Close
            | Builtin::Delete
            | Builtin::Panic
            | Builtin::Print
            | Builtin::Println => None,
        }
    }

    /// Interprets an expression that names a type: `T`, `pkg.T`, `(*T)`.
    fn expr_as_type(&mut self, expr: &Expr) -> Option<TypeId> {
        match &expr.kind {
            ExprKind::Ident(name) => match self.lookup(name)? {
                Entity::Type(ty) => Some(ty),
                _ => None,
            },
            ExprKind::Selector { operand, field } => {
                let package = operand.as_ident()?;
                self.qualified_type(package, &field.name)
            }
            ExprKind::Paren(inner) => self.expr_as_type(inner),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let elem = self.expr_as_type(operand)?;
                Some(self.arena.pointer(elem))
            }
            ExprKind::Index { operand, .. } => self.expr_as_type(operand),
            _ => None,
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, expected: Option<TypeId>) -> Option<TypeId> {
        match op {
            UnaryOp::Addr => {
                let inner = expected.map(|ty| self.deref(ty));
                let ty = self.expr(operand, inner)?;
                Some(self.arena.pointer(ty))
            }
            UnaryOp::Deref => {
                let ty = self.expr(operand, None)?;
                match self.under(ty)? {
                    TypeKind::Pointer(elem) => Some(elem),
                    _ => None,
                }
            }
            UnaryOp::Recv => {
                let ty = self.expr(operand, None)?;
                match self.under(ty)? {
                    TypeKind::Chan(elem) => Some(elem),
                    _ => None,
                }
            }
            UnaryOp::Not => {
                self.expr(operand, None);
                Some(self.basic("bool"))
            }
            UnaryOp::Arith => self.expr(operand, expected),
        }
    }

    /// Types a composite literal and its elements.
    ///
    /// An elided literal takes the expected type unchanged, so the inner
    /// literal of `[]*T{{...}}` is typed `*T` while its elements are checked
    /// against the fields of `T`.
    fn composite(
        &mut self,
        ty: Option<&TypeExpr>,
        elems: &[Element],
        expected: Option<TypeId>,
    ) -> Option<TypeId> {
        let lit_ty = match ty {
            Some(ty) => Some(self.resolve_type(ty)),
            None => expected,
        };
        let shape = lit_ty.and_then(|t| self.under(self.deref(t)));

        match shape {
            Some(TypeKind::Struct(fields)) => {
                for (i, elem) in elems.iter().enumerate() {
                    let field_ty = match elem.key.as_ref() {
                        Some(key) => key
                            .as_ident()
                            .and_then(|name| fields.iter().find(|f| f.name == name))
                            .map(|f| f.ty),
                        None => fields.get(i).map(|f| f.ty),
                    };
                    self.expr(&elem.value, field_ty);
                }
            }
            Some(TypeKind::Slice(value) | TypeKind::Array(value)) => {
                let int = self.basic("int");
                self.elements(elems, Some(int), Some(value));
            }
            Some(TypeKind::Map(key, value)) => self.elements(elems, Some(key), Some(value)),
            _ => {
                for elem in elems {
                    // Keys of an unknown literal may be field names.
                    if let Some(key) = elem.key.as_ref().filter(|k| k.as_ident().is_none()) {
                        self.expr(key, None);
                    }
                    self.expr(&elem.value, None);
                }
            }
        }
        lit_ty
    }

    fn elements(&mut self, elems: &[Element], key: Option<TypeId>, value: Option<TypeId>) {
        for elem in elems {
            if let Some(k) = &elem.key {
                self.expr(k, key);
            }
            self.expr(&elem.value, value);
        }
    }

    fn func_lit(&mut self, params: &[Param], results: &[Param], body: &Block) -> TypeId {
        let sig = self.signature(params, results);
        let result_types = self.param_types(results);

        self.scopes.push();
        self.declare_params(params);
        self.declare_params(results);
        let outer = std::mem::replace(&mut self.results, result_types);
        self.block_stmts(&body.stmts);
        self.results = outer;
        self.scopes.pop();

        sig
    }
}
