//! Semantic types produced by a front-end's type checker.

use std::collections::HashMap;

/// Handle to a type stored in a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name. Embedded fields use the embedded type's name.
    pub name: String,
    /// Declared type.
    pub ty: TypeId,
    /// Whether the field is embedded.
    pub embedded: bool,
}

/// A declared named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    /// Import path of the declaring package (empty for predeclared types).
    pub package: String,
    /// Simple name.
    pub name: String,
    /// Underlying type, once resolved.
    pub underlying: Option<TypeId>,
}

impl NamedType {
    /// Fully-qualified name in `package.Name` form.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Type structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Predeclared basic type (`int`, `string`, `bool`, ...).
    Basic(String),
    /// Declared named type.
    Named(NamedType),
    /// `*T`
    Pointer(TypeId),
    /// `[]T`
    Slice(TypeId),
    /// `[N]T`
    Array(TypeId),
    /// `map[K]V`
    Map(TypeId, TypeId),
    /// `chan T`
    Chan(TypeId),
    /// Struct with fields in declaration order.
    Struct(Vec<Field>),
    /// Function signature.
    Signature {
        /// Parameter types.
        params: Vec<TypeId>,
        /// Result types.
        results: Vec<TypeId>,
    },
    /// Multiple values returned by a call.
    Tuple(Vec<TypeId>),
    /// A type the checker does not model further (interfaces, type parameters).
    Opaque(String),
}

/// Interning key for structural types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Basic(String),
    Pointer(TypeId),
    Slice(TypeId),
    Array(TypeId),
    Map(TypeId, TypeId),
    Chan(TypeId),
    Signature(Vec<TypeId>, Vec<TypeId>),
    Tuple(Vec<TypeId>),
    Opaque(String),
}

/// Storage for all types of one analysed program.
///
/// Named and struct types get a fresh id per declaration; every other type
/// is interned so identical shapes share an id.
#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    kinds: Vec<TypeKind>,
    interned: HashMap<Key, TypeId>,
}

impl TypeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Looks up a type.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&TypeKind> {
        self.kinds.get(id.0 as usize)
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(u32::try_from(self.kinds.len()).unwrap_or(u32::MAX));
        self.kinds.push(kind);
        id
    }

    fn intern(&mut self, key: Key, kind: TypeKind) -> TypeId {
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = self.push(kind);
        self.interned.insert(key, id);
        id
    }

    /// Declares a new named type with an unresolved underlying type.
    pub fn named(&mut self, package: impl Into<String>, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Named(NamedType {
            package: package.into(),
            name: name.into(),
            underlying: None,
        }))
    }

    /// Sets the underlying type of a named type. No-op for other kinds.
    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) {
        if let Some(TypeKind::Named(n)) = self.kinds.get_mut(named.0 as usize) {
            n.underlying = Some(underlying);
        }
    }

    /// Adds a struct type.
    pub fn structure(&mut self, fields: Vec<Field>) -> TypeId {
        self.push(TypeKind::Struct(fields))
    }

    /// Interns a basic type.
    pub fn basic(&mut self, name: &str) -> TypeId {
        self.intern(Key::Basic(name.to_owned()), TypeKind::Basic(name.to_owned()))
    }

    /// Interns `*elem`.
    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.intern(Key::Pointer(elem), TypeKind::Pointer(elem))
    }

    /// Interns `[]elem`.
    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(Key::Slice(elem), TypeKind::Slice(elem))
    }

    /// Interns `[N]elem`. Lengths are not distinguished.
    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.intern(Key::Array(elem), TypeKind::Array(elem))
    }

    /// Interns `map[key]value`.
    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(Key::Map(key, value), TypeKind::Map(key, value))
    }

    /// Interns `chan elem`.
    pub fn chan(&mut self, elem: TypeId) -> TypeId {
        self.intern(Key::Chan(elem), TypeKind::Chan(elem))
    }

    /// Interns a function signature.
    pub fn signature(&mut self, params: Vec<TypeId>, results: Vec<TypeId>) -> TypeId {
        self.intern(
            Key::Signature(params.clone(), results.clone()),
            TypeKind::Signature { params, results },
        )
    }

    /// Interns a tuple of call results.
    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.intern(Key::Tuple(elems.clone()), TypeKind::Tuple(elems))
    }

    /// Interns an opaque type.
    pub fn opaque(&mut self, description: &str) -> TypeId {
        self.intern(
            Key::Opaque(description.to_owned()),
            TypeKind::Opaque(description.to_owned()),
        )
    }

    /// Follows named types to their underlying structure.
    ///
    /// Stops after a bounded number of hops so malformed cycles
    /// (`type A B; type B A`) cannot loop.
    #[must_use]
    pub fn resolve_underlying(&self, mut id: TypeId) -> TypeId {
        for _ in 0..32 {
            match self.get(id) {
                Some(TypeKind::Named(NamedType {
                    underlying: Some(next),
                    ..
                })) => id = *next,
                _ => break,
            }
        }
        id
    }

    /// Renders a type the way Go prints it, for logs and tests.
    #[must_use]
    pub fn display(&self, id: TypeId) -> String {
        self.display_depth(id, 0)
    }

    fn display_depth(&self, id: TypeId, depth: usize) -> String {
        if depth > 8 {
            return "...".to_owned();
        }
        let d = depth + 1;
        match self.get(id) {
            None => "<invalid>".to_owned(),
            Some(TypeKind::Basic(name) | TypeKind::Opaque(name)) => name.clone(),
            Some(TypeKind::Named(named)) => named.qualified_name(),
            Some(TypeKind::Pointer(e)) => format!("*{}", self.display_depth(*e, d)),
            Some(TypeKind::Slice(e)) => format!("[]{}", self.display_depth(*e, d)),
            Some(TypeKind::Array(e)) => format!("[N]{}", self.display_depth(*e, d)),
            Some(TypeKind::Chan(e)) => format!("chan {}", self.display_depth(*e, d)),
            Some(TypeKind::Map(k, v)) => format!(
                "map[{}]{}",
                self.display_depth(*k, d),
                self.display_depth(*v, d)
            ),
            Some(TypeKind::Struct(fields)) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        if f.embedded {
                            self.display_depth(f.ty, d)
                        } else {
                            format!("{} {}", f.name, self.display_depth(f.ty, d))
                        }
                    })
                    .collect();
                format!("struct{{{}}}", inner.join("; "))
            }
            Some(TypeKind::Signature { params, results }) => {
                let p: Vec<String> = params.iter().map(|t| self.display_depth(*t, d)).collect();
                let r: Vec<String> = results.iter().map(|t| self.display_depth(*t, d)).collect();
                match r.len() {
                    0 => format!("func({})", p.join(", ")),
                    1 => format!("func({}) {}", p.join(", "), r[0]),
                    _ => format!("func({}) ({})", p.join(", "), r.join(", ")),
                }
            }
            Some(TypeKind::Tuple(elems)) => {
                let e: Vec<String> = elems.iter().map(|t| self.display_depth(*t, d)).collect();
                format!("({})", e.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_types_are_interned() {
        let mut arena = TypeArena::new();
        let int = arena.basic("int");
        assert_eq!(arena.basic("int"), int);
        assert_eq!(arena.pointer(int), arena.pointer(int));
        assert_eq!(arena.map(int, int), arena.map(int, int));
        assert_ne!(arena.slice(int), arena.array(int));
    }

    #[test]
    fn named_types_keep_identity() {
        let mut arena = TypeArena::new();
        let a = arena.named("example.com/m", "T");
        let b = arena.named("example.com/m", "T");
        assert_ne!(a, b);
    }

    #[test]
    fn resolves_underlying_through_named_chain() {
        let mut arena = TypeArena::new();
        let int = arena.basic("int");
        let s = arena.structure(vec![Field {
            name: "A".into(),
            ty: int,
            embedded: false,
        }]);
        let t = arena.named("m", "T");
        let u = arena.named("m", "U");
        arena.set_underlying(t, s);
        arena.set_underlying(u, t);
        assert_eq!(arena.resolve_underlying(u), s);
        assert_eq!(arena.display(s), "struct{A int}");
    }

    #[test]
    fn cyclic_named_types_terminate() {
        let mut arena = TypeArena::new();
        let a = arena.named("m", "A");
        let b = arena.named("m", "B");
        arena.set_underlying(a, b);
        arena.set_underlying(b, a);
        let _ = arena.resolve_underlying(a);
    }

    #[test]
    fn display_matches_go_notation() {
        let mut arena = TypeArena::new();
        let t = arena.named("github.com/username/linttestmodule", "NonWritable");
        let p = arena.pointer(t);
        let s = arena.slice(p);
        assert_eq!(
            arena.display(s),
            "[]*github.com/username/linttestmodule.NonWritable"
        );
    }
}
