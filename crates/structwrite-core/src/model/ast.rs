//! Language-neutral syntax tree consumed by the detection engine.
//!
//! Front-ends lower their concrete syntax into these nodes. The shapes follow
//! the Go AST closely (struct embedding, composite literals, multi-value
//! assignment) but nothing here is tied to a particular parser.

use std::path::PathBuf;

/// Source position of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize, len: usize) -> Self {
        Self {
            line,
            column,
            offset,
            len,
        }
    }

    /// Byte offset one past the last byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether `offset` falls inside this span (inclusive of both ends).
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        self.offset <= offset && offset <= self.end()
    }
}

/// Identifier of an expression, unique within one [`SourceFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// A name with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The identifier text.
    pub name: String,
    /// Where it appears.
    pub span: Span,
}

impl Ident {
    /// Creates an identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// One parsed source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Path of the file on disk.
    pub path: PathBuf,
    /// Declared package name.
    pub package: String,
    /// Import declarations.
    pub imports: Vec<Import>,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Iterates over the function and method declarations of this file.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }
}

/// An import of another package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Explicit local name (`_`, `.` or an alias), if any.
    pub name: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

impl Import {
    /// The name the import is referenced by inside the file.
    ///
    /// Falls back to the last path segment when no alias is given.
    #[must_use]
    pub fn local_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    /// Function or method.
    Func(FuncDecl),
    /// `type` declaration group.
    Type(Vec<TypeSpec>),
    /// `var` declaration group.
    Var(Vec<ValueSpec>),
    /// `const` declaration group.
    Const(Vec<ValueSpec>),
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    /// Declared name.
    pub name: Ident,
    /// Doc comment lines directly above the declaration, verbatim.
    pub doc: Vec<String>,
    /// Method receiver, if this is a method.
    pub receiver: Option<Param>,
    /// Parameters.
    pub params: Vec<Param>,
    /// Results.
    pub results: Vec<Param>,
    /// Body, absent for external (assembly) declarations.
    pub body: Option<Block>,
    /// Span of the whole declaration.
    pub span: Span,
}

impl FuncDecl {
    /// Whether this declaration is a method.
    #[must_use]
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

/// A parameter group such as `a, b int` or an unnamed `*T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared names, empty for unnamed parameters.
    pub names: Vec<Ident>,
    /// Declared type.
    pub ty: TypeExpr,
    /// Whether this is a variadic `...T` parameter.
    pub variadic: bool,
}

/// A single `type Name T` or `type Name = T` spec.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    /// Declared name.
    pub name: Ident,
    /// Right-hand side.
    pub ty: TypeExpr,
    /// Whether this is an alias declaration.
    pub alias: bool,
}

/// A `var` or `const` spec.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    /// Declared names.
    pub names: Vec<Ident>,
    /// Explicit type, if any.
    pub ty: Option<TypeExpr>,
    /// Initializer expressions.
    pub values: Vec<Expr>,
}

/// A syntactic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Unqualified type name (`T`, `int`). Type arguments are dropped.
    Name(String),
    /// Package-qualified type name (`pkg.T`).
    Qualified {
        /// Package local name.
        package: String,
        /// Type name.
        name: String,
    },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T` or `[...]T`
    Array(Box<TypeExpr>),
    /// `map[K]V`
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// `chan T`
    Chan(Box<TypeExpr>),
    /// `func(...) ...`
    Func {
        /// Parameters.
        params: Vec<Param>,
        /// Results.
        results: Vec<Param>,
    },
    /// `struct { ... }`
    Struct(Vec<FieldDecl>),
    /// Anything the engine does not model (interfaces, type parameters).
    Opaque(String),
}

/// A field group inside a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field names; empty for an embedded field.
    pub names: Vec<String>,
    /// Field type. For embedded fields this is `T`, `*T` or `pkg.T`.
    pub ty: TypeExpr,
}

impl FieldDecl {
    /// Whether this field is embedded (anonymous).
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A braced statement list.
#[derive(Debug, Clone, Default)]
pub struct Block {
    /// Statements in order.
    pub stmts: Vec<Stmt>,
    /// Span from `{` to `}`.
    pub span: Span,
}

/// Assignment operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `|=`, ... (operator text without `=`).
    Compound(String),
}

/// A statement.
#[derive(Debug, Clone)]
pub struct Stmt {
    /// Statement kind.
    pub kind: StmtKind,
    /// Span of the statement.
    pub span: Span,
}

/// One `case`/`default` clause of a switch or select.
#[derive(Debug, Clone, Default)]
pub struct CaseClause {
    /// Case expressions (empty for `default`).
    pub exprs: Vec<Expr>,
    /// Case types, for type switches.
    pub types: Vec<TypeExpr>,
    /// Communication statement for `select` cases.
    pub comm: Option<Box<Stmt>>,
    /// Clause body.
    pub body: Vec<Stmt>,
}

/// Statement kinds.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `lhs op rhs`
    Assign {
        /// Targets.
        lhs: Vec<Expr>,
        /// Operator.
        op: AssignOp,
        /// Values.
        rhs: Vec<Expr>,
    },
    /// `x++` / `x--`
    IncDec(Expr),
    /// Local `var` declaration.
    Var(Vec<ValueSpec>),
    /// Local `const` declaration.
    Const(Vec<ValueSpec>),
    /// Local `type` declaration.
    Type(Vec<TypeSpec>),
    /// Expression statement.
    Expr(Expr),
    /// `ch <- v`
    Send(Expr, Expr),
    /// `return ...`
    Return(Vec<Expr>),
    /// `go f()`
    Go(Expr),
    /// `defer f()`
    Defer(Expr),
    /// Nested block.
    Block(Block),
    /// `if init; cond { } else ...`
    If {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Condition.
        cond: Expr,
        /// Then branch.
        then: Block,
        /// `else` branch: a block or another `if`.
        els: Option<Box<Stmt>>,
    },
    /// Three-clause or condition-only `for`.
    For {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Condition.
        cond: Option<Expr>,
        /// Post statement.
        post: Option<Box<Stmt>>,
        /// Loop body.
        body: Block,
    },
    /// `for k, v := range x`
    Range {
        /// Key target.
        key: Option<Expr>,
        /// Value target.
        value: Option<Expr>,
        /// Whether the targets are declared with `:=`.
        define: bool,
        /// Ranged expression.
        expr: Expr,
        /// Loop body.
        body: Block,
    },
    /// Expression switch.
    Switch {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Tag expression.
        tag: Option<Expr>,
        /// Clauses.
        clauses: Vec<CaseClause>,
    },
    /// `switch v := x.(type)`
    TypeSwitch {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Bound name.
        binding: Option<Ident>,
        /// Operand of the type assertion.
        expr: Expr,
        /// Clauses.
        clauses: Vec<CaseClause>,
    },
    /// `select { ... }`
    Select(Vec<CaseClause>),
    /// `label: stmt`
    Labeled(Box<Stmt>),
    /// `break`, `continue`, `goto`, `fallthrough`, empty statements.
    Branch,
}

/// An expression.
#[derive(Debug, Clone)]
pub struct Expr {
    /// Identity used to key type information.
    pub id: ExprId,
    /// Expression kind.
    pub kind: ExprKind,
    /// Source span.
    pub span: Span,
}

/// Unary operators the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&x`
    Addr,
    /// `*x`
    Deref,
    /// `<-ch`
    Recv,
    /// `!x`
    Not,
    /// `-x`, `+x`, `^x`
    Arith,
}

/// Basic literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    /// Integer literal.
    Int,
    /// Floating-point literal.
    Float,
    /// Imaginary literal.
    Imag,
    /// Rune literal.
    Rune,
    /// String literal.
    Str,
}

/// One element of a composite literal.
#[derive(Debug, Clone)]
pub struct Element {
    /// Key (field name, index or map key).
    pub key: Option<Expr>,
    /// Value.
    pub value: Expr,
}

/// Expression kinds.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Identifier reference.
    Ident(String),
    /// `x.f`
    Selector {
        /// Receiver.
        operand: Box<Expr>,
        /// Selected name.
        field: Ident,
    },
    /// `x[i]`
    Index {
        /// Container.
        operand: Box<Expr>,
        /// Index or key.
        index: Box<Expr>,
    },
    /// `x[i:j]`
    Slice {
        /// Sliced operand.
        operand: Box<Expr>,
        /// Bounds that are present.
        bounds: Vec<Expr>,
    },
    /// `f(args)`
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Arguments.
        args: Vec<Expr>,
        /// Type argument for builtins such as `new(T)` or `make(T)`.
        type_arg: Option<TypeExpr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator text.
        op: String,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `(x)`
    Paren(Box<Expr>),
    /// `T{...}`, `&T{...}` (as `Unary(Addr)` around it) or elided `{...}`.
    CompositeLit {
        /// Literal type; `None` when elided inside an outer literal.
        ty: Option<TypeExpr>,
        /// Elements.
        elems: Vec<Element>,
    },
    /// `func(...) { ... }`
    FuncLit {
        /// Parameters.
        params: Vec<Param>,
        /// Results.
        results: Vec<Param>,
        /// Body.
        body: Block,
    },
    /// `x.(T)`; `ty` is `None` for `x.(type)`.
    TypeAssert {
        /// Operand.
        operand: Box<Expr>,
        /// Asserted type.
        ty: Option<TypeExpr>,
    },
    /// `T(x)` where `T` is syntactically a type (`[]byte(s)`, `(*T)(p)`).
    Conversion {
        /// Target type.
        ty: TypeExpr,
        /// Converted value.
        operand: Box<Expr>,
    },
    /// Basic literal.
    Lit(LitKind),
    /// Anything the front-end could not lower.
    Bad,
}

impl Expr {
    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    /// Returns the identifier name if this is a bare identifier.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &self.unparen().kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
