//! Type resolution capability consumed by the detection engine.
//!
//! The engine never talks to a type checker directly. It asks a
//! [`TypeResolver`] three questions (type of an expression, structure of a
//! type, index path of a field selection) and derives everything else from
//! the provided methods.

use std::collections::HashMap;

use super::ast::ExprId;
use super::ty::{Field, NamedType, TypeArena, TypeId, TypeKind};

/// Read-only access to resolved type information for one file.
pub trait TypeResolver {
    /// Static type of an expression, or `None` when resolution failed.
    fn type_of(&self, expr: ExprId) -> Option<TypeId>;

    /// Structure of a type.
    fn kind(&self, ty: TypeId) -> Option<&TypeKind>;

    /// Field index path recorded for a selector expression.
    ///
    /// A path of length one is a direct field access; longer paths describe
    /// promotion through embedded fields, outermost first.
    fn selection(&self, expr: ExprId) -> Option<&[usize]>;

    /// Strips exactly one level of pointer indirection.
    fn dereference(&self, ty: TypeId) -> TypeId {
        match self.kind(ty) {
            Some(TypeKind::Pointer(elem)) => *elem,
            _ => ty,
        }
    }

    /// The named type reached after stripping one pointer level, if any.
    fn underlying(&self, ty: TypeId) -> Option<&NamedType> {
        match self.kind(self.dereference(ty)) {
            Some(TypeKind::Named(named)) => Some(named),
            _ => None,
        }
    }

    /// Fields of a struct type, looking through named types.
    fn struct_fields(&self, ty: TypeId) -> Option<&[Field]> {
        let mut current = ty;
        for _ in 0..32 {
            match self.kind(current)? {
                TypeKind::Struct(fields) => return Some(fields),
                TypeKind::Named(NamedType {
                    underlying: Some(next),
                    ..
                }) => current = *next,
                _ => return None,
            }
        }
        None
    }

    /// The field at `index` of a struct type.
    fn field_at(&self, ty: TypeId, index: usize) -> Option<&Field> {
        self.struct_fields(ty)?.get(index)
    }
}

/// Per-file results of type checking.
#[derive(Debug, Clone, Default)]
pub struct FileTypes {
    exprs: HashMap<ExprId, TypeId>,
    selections: HashMap<ExprId, Vec<usize>>,
}

impl FileTypes {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of an expression.
    pub fn record_type(&mut self, expr: ExprId, ty: TypeId) {
        self.exprs.insert(expr, ty);
    }

    /// Records the index path of a field selection.
    pub fn record_selection(&mut self, expr: ExprId, path: Vec<usize>) {
        self.selections.insert(expr, path);
    }

    /// Recorded type of an expression.
    #[must_use]
    pub fn type_of(&self, expr: ExprId) -> Option<TypeId> {
        self.exprs.get(&expr).copied()
    }

    /// Recorded index path of a selection.
    #[must_use]
    pub fn selection(&self, expr: ExprId) -> Option<&[usize]> {
        self.selections.get(&expr).map(Vec::as_slice)
    }
}

/// A file's type tables viewed against the program-wide arena.
#[derive(Debug, Clone, Copy)]
pub struct CheckedFile<'a> {
    /// Program-wide type storage.
    pub arena: &'a TypeArena,
    /// Tables for this file.
    pub types: &'a FileTypes,
}

impl<'a> CheckedFile<'a> {
    /// Pairs an arena with a file's tables.
    #[must_use]
    pub fn new(arena: &'a TypeArena, types: &'a FileTypes) -> Self {
        Self { arena, types }
    }
}

impl TypeResolver for CheckedFile<'_> {
    fn type_of(&self, expr: ExprId) -> Option<TypeId> {
        self.types.type_of(expr)
    }

    fn kind(&self, ty: TypeId) -> Option<&TypeKind> {
        self.arena.get(ty)
    }

    fn selection(&self, expr: ExprId) -> Option<&[usize]> {
        self.types.selection(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dereference_strips_one_level_only() {
        let mut arena = TypeArena::new();
        let t = arena.named("m", "T");
        let p = arena.pointer(t);
        let pp = arena.pointer(p);
        let types = FileTypes::new();
        let file = CheckedFile::new(&arena, &types);

        assert_eq!(file.dereference(p), t);
        assert_eq!(file.dereference(pp), p);
        assert_eq!(file.dereference(t), t);
    }

    #[test]
    fn underlying_returns_named_only() {
        let mut arena = TypeArena::new();
        let t = arena.named("m", "T");
        let p = arena.pointer(t);
        let int = arena.basic("int");
        let s = arena.slice(t);
        let types = FileTypes::new();
        let file = CheckedFile::new(&arena, &types);

        assert_eq!(file.underlying(p).map(|n| n.name.as_str()), Some("T"));
        assert!(file.underlying(int).is_none());
        assert!(file.underlying(s).is_none());
    }

    #[test]
    fn field_lookup_sees_through_named() {
        let mut arena = TypeArena::new();
        let int = arena.basic("int");
        let st = arena.structure(vec![Field {
            name: "A".into(),
            ty: int,
            embedded: false,
        }]);
        let t = arena.named("m", "T");
        arena.set_underlying(t, st);
        let types = FileTypes::new();
        let file = CheckedFile::new(&arena, &types);

        assert_eq!(file.field_at(t, 0).map(|f| f.name.as_str()), Some("A"));
        assert!(file.field_at(t, 1).is_none());
        assert!(file.field_at(int, 0).is_none());
    }

    #[test]
    fn missing_entries_are_absent() {
        let arena = TypeArena::new();
        let types = FileTypes::new();
        let file = CheckedFile::new(&arena, &types);
        assert!(file.type_of(ExprId(7)).is_none());
        assert!(file.selection(ExprId(7)).is_none());
        assert!(file.kind(TypeId(3)).is_none());
    }
}
