//! Name resolution tables: predeclared identifiers, package members and
//! lexical block scopes.

use std::collections::HashMap;

use structwrite_core::model::{TypeArena, TypeId};

/// What a name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entity {
    Var(TypeId),
    Const(TypeId),
    Type(TypeId),
    Func(TypeId),
    /// Imported package, by import path.
    Import(String),
    Builtin(Builtin),
    Nil,
    /// Declared, but its type could not be inferred.
    Unresolved,
}

impl Entity {
    /// Type of the entity when used as a value.
    pub(crate) fn value_type(&self) -> Option<TypeId> {
        match self {
            Self::Var(ty) | Self::Const(ty) | Self::Func(ty) => Some(*ty),
            _ => None,
        }
    }
}

/// Predeclared functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Append,
    Cap,
    Clear,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

const BUILTINS: &[(&str, Builtin)] = &[
    ("append", Builtin::Append),
    ("cap", Builtin::Cap),
    ("clear", Builtin::Clear),
    ("close", Builtin::Close),
    ("complex", Builtin::Complex),
    ("copy", Builtin::Copy),
    ("delete", Builtin::Delete),
    ("imag", Builtin::Imag),
    ("len", Builtin::Len),
    ("make", Builtin::Make),
    ("max", Builtin::Max),
    ("min", Builtin::Min),
    ("new", Builtin::New),
    ("panic", Builtin::Panic),
    ("print", Builtin::Print),
    ("println", Builtin::Println),
    ("real", Builtin::Real),
    ("recover", Builtin::Recover),
];

const BASIC_TYPES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
];

/// Members of one package, by name.
pub(crate) type Members = HashMap<String, Entity>;

/// Program-wide declarations shared by every file checker.
#[derive(Debug, Default)]
pub(crate) struct Index {
    pub universe: Members,
    /// Package members keyed by import path.
    pub packages: HashMap<String, Members>,
    /// Package names keyed by import path.
    pub names: HashMap<String, String>,
    /// Method signatures keyed by receiver base type.
    pub methods: HashMap<TypeId, HashMap<String, TypeId>>,
}

impl Index {
    pub(crate) fn new(arena: &mut TypeArena) -> Self {
        let mut universe = Members::new();
        for name in BASIC_TYPES {
            universe.insert((*name).to_owned(), Entity::Type(arena.basic(name)));
        }
        universe.insert("byte".into(), Entity::Type(arena.basic("uint8")));
        universe.insert("rune".into(), Entity::Type(arena.basic("int32")));
        universe.insert("any".into(), Entity::Type(arena.opaque("any")));
        universe.insert("comparable".into(), Entity::Type(arena.opaque("comparable")));

        let error = arena.named("", "error");
        let iface = arena.opaque("interface{ Error() string }");
        arena.set_underlying(error, iface);
        universe.insert("error".into(), Entity::Type(error));

        let bool_ty = arena.basic("bool");
        universe.insert("true".into(), Entity::Const(bool_ty));
        universe.insert("false".into(), Entity::Const(bool_ty));
        universe.insert("iota".into(), Entity::Const(arena.basic("int")));
        universe.insert("nil".into(), Entity::Nil);

        for (name, builtin) in BUILTINS {
            universe.insert((*name).to_owned(), Entity::Builtin(*builtin));
        }

        Self {
            universe,
            ..Self::default()
        }
    }

    pub(crate) fn member(&self, package: &str, name: &str) -> Option<&Entity> {
        self.packages.get(package)?.get(name)
    }

    pub(crate) fn method(&self, receiver: TypeId, name: &str) -> Option<TypeId> {
        self.methods.get(&receiver)?.get(name).copied()
    }
}

/// Stack of lexical block scopes inside a function.
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    stack: Vec<HashMap<String, Entity>>,
}

impl Scopes {
    pub(crate) fn push(&mut self) {
        self.stack.push(HashMap::new());
    }

    pub(crate) fn pop(&mut self) {
        self.stack.pop();
    }

    /// Declares `name` in the innermost scope. The blank identifier is ignored.
    pub(crate) fn declare(&mut self, name: &str, entity: Entity) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.stack.last_mut() {
            scope.insert(name.to_owned(), entity);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Entity> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut arena = TypeArena::new();
        let int = arena.basic("int");
        let s = arena.basic("string");

        let mut scopes = Scopes::default();
        scopes.push();
        scopes.declare("x", Entity::Var(int));
        scopes.push();
        scopes.declare("x", Entity::Var(s));
        assert_eq!(scopes.lookup("x"), Some(&Entity::Var(s)));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(&Entity::Var(int)));
    }

    #[test]
    fn blank_is_never_declared() {
        let mut scopes = Scopes::default();
        scopes.push();
        scopes.declare("_", Entity::Nil);
        assert!(scopes.lookup("_").is_none());
    }

    #[test]
    fn universe_aliases_byte_and_rune() {
        let mut arena = TypeArena::new();
        let index = Index::new(&mut arena);
        assert_eq!(
            index.universe.get("byte"),
            Some(&Entity::Type(arena.basic("uint8")))
        );
        assert_eq!(
            index.universe.get("rune"),
            Some(&Entity::Type(arena.basic("int32")))
        );
        assert_eq!(index.universe.get("new"), Some(&Entity::Builtin(Builtin::New)));
    }
}
