//! Go parser: lowers tree-sitter syntax trees into the structwrite AST.

use std::path::Path;

use structwrite_core::model::ast::{
    AssignOp, Block, CaseClause, Decl, Element, Expr, ExprId, ExprKind, FieldDecl, FuncDecl,
    Ident, Import, LitKind, Param, SourceFile, Span, Stmt, StmtKind, TypeExpr, TypeSpec, UnaryOp,
    ValueSpec,
};
use tree_sitter::{Language, Node, Parser};

/// Errors produced while parsing one Go file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar is incompatible with the linked tree-sitter runtime.
    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree")]
    NoTree,

    /// The source has a syntax error.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        column: usize,
    },
}

/// Parses Go source files into [`SourceFile`]s.
pub struct GoParser {
    language: Language,
}

impl GoParser {
    /// Creates a new Go parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Parses and lowers one file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] if the file contains a syntax error.
    pub fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();
        if let Some(error) = first_error(root) {
            let position = error.start_position();
            return Err(ParseError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let mut lowerer = Lowerer { src: source, next_id: 0 };
        Ok(lowerer.file(root, path))
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn span(node: Node<'_>) -> Span {
    let start = node.start_position();
    Span::new(
        start.row + 1,
        start.column + 1,
        node.start_byte(),
        node.end_byte() - node.start_byte(),
    )
}

/// Named children, comments excluded.
fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Whether `node` has an anonymous child token of the given kind.
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

fn is_type_node(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "qualified_type"
            | "pointer_type"
            | "slice_type"
            | "array_type"
            | "implicit_length_array_type"
            | "map_type"
            | "channel_type"
            | "struct_type"
            | "interface_type"
            | "function_type"
            | "generic_type"
            | "parenthesized_type"
            | "negated_type"
    )
}

struct Lowerer<'s> {
    src: &'s str,
    next_id: u32,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.src.as_bytes()).unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident::new(self.text(node), span(node))
    }

    fn field_ident(&self, node: Node<'_>, field: &str) -> Ident {
        node.child_by_field_name(field)
            .map_or_else(|| Ident::new("_", span(node)), |n| self.ident(n))
    }

    fn field_idents(&self, node: Node<'_>, field: &str) -> Vec<Ident> {
        field_children(node, field)
            .into_iter()
            .map(|n| self.ident(n))
            .collect()
    }

    fn make(&mut self, kind: ExprKind, node: Node<'_>) -> Expr {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        Expr {
            id,
            kind,
            span: span(node),
        }
    }

    // ---- declarations ----

    fn file(&mut self, root: Node<'_>, path: &Path) -> SourceFile {
        let mut file = SourceFile {
            path: path.to_path_buf(),
            ..SourceFile::default()
        };
        for node in named(root) {
            match node.kind() {
                "package_clause" => {
                    if let Some(name) = named(node).first() {
                        file.package = self.text(*name).to_owned();
                    }
                }
                "import_declaration" => self.imports(node, &mut file.imports),
                "function_declaration" | "method_declaration" => {
                    file.decls.push(Decl::Func(self.func_decl(node)));
                }
                "type_declaration" => file.decls.push(Decl::Type(self.type_specs(node))),
                "var_declaration" => file.decls.push(Decl::Var(self.value_specs(node))),
                "const_declaration" => file.decls.push(Decl::Const(self.value_specs(node))),
                _ => {}
            }
        }
        file
    }

    fn imports(&self, node: Node<'_>, out: &mut Vec<Import>) {
        for child in named(node) {
            match child.kind() {
                "import_spec" => {
                    let Some(path) = child.child_by_field_name("path") else {
                        continue;
                    };
                    out.push(Import {
                        name: child
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_owned()),
                        path: self.text(path).trim_matches(|c| c == '"' || c == '`').to_owned(),
                    });
                }
                "import_spec_list" => self.imports(child, out),
                _ => {}
            }
        }
    }

    fn func_decl(&mut self, node: Node<'_>) -> FuncDecl {
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| self.params(list).into_iter().next());
        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.params(list))
            .unwrap_or_default();
        FuncDecl {
            name: self.field_ident(node, "name"),
            doc: self.doc_comments(node),
            receiver,
            params,
            results: self.results(node),
            body: node.child_by_field_name("body").map(|b| self.block(b)),
            span: span(node),
        }
    }

    /// Comment lines directly above `node`, with no blank line in between.
    fn doc_comments(&self, node: Node<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut next_row = node.start_position().row;
        let mut prev = node.prev_sibling();
        while let Some(comment) = prev.filter(|p| p.kind() == "comment") {
            if comment.end_position().row + 1 != next_row {
                break;
            }
            lines.push(self.text(comment).to_owned());
            next_row = comment.start_position().row;
            prev = comment.prev_sibling();
        }
        lines.reverse();
        lines
    }

    fn params(&self, list: Node<'_>) -> Vec<Param> {
        named(list)
            .into_iter()
            .filter(|decl| {
                matches!(
                    decl.kind(),
                    "parameter_declaration" | "variadic_parameter_declaration"
                )
            })
            .map(|decl| Param {
                names: self.field_idents(decl, "name"),
                ty: self.field_ty(decl, "type"),
                variadic: decl.kind() == "variadic_parameter_declaration",
            })
            .collect()
    }

    fn results(&self, node: Node<'_>) -> Vec<Param> {
        match node.child_by_field_name("result") {
            Some(list) if list.kind() == "parameter_list" => self.params(list),
            Some(ty) => vec![Param {
                names: Vec::new(),
                ty: self.ty(ty),
                variadic: false,
            }],
            None => Vec::new(),
        }
    }

    fn type_specs(&self, node: Node<'_>) -> Vec<TypeSpec> {
        let mut specs = Vec::new();
        for child in named(node) {
            match child.kind() {
                "type_spec" | "type_alias" => specs.push(TypeSpec {
                    name: self.field_ident(child, "name"),
                    ty: self.field_ty(child, "type"),
                    alias: child.kind() == "type_alias",
                }),
                "type_spec_list" => specs.extend(self.type_specs(child)),
                _ => {}
            }
        }
        specs
    }

    fn value_specs(&mut self, node: Node<'_>) -> Vec<ValueSpec> {
        let mut specs = Vec::new();
        for child in named(node) {
            match child.kind() {
                "var_spec" | "const_spec" => specs.push(ValueSpec {
                    names: self.field_idents(child, "name"),
                    ty: child.child_by_field_name("type").map(|t| self.ty(t)),
                    values: self.field_list(child, "value"),
                }),
                "var_spec_list" | "const_spec_list" => specs.extend(self.value_specs(child)),
                _ => {}
            }
        }
        specs
    }

    // ---- types ----

    fn field_ty(&self, node: Node<'_>, field: &str) -> TypeExpr {
        node.child_by_field_name(field)
            .map_or_else(|| TypeExpr::Opaque(String::new()), |t| self.ty(t))
    }

    fn first_ty(&self, node: Node<'_>) -> TypeExpr {
        named(node)
            .first()
            .map_or_else(|| TypeExpr::Opaque(String::new()), |t| self.ty(*t))
    }

    fn ty(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::Name(self.text(node).to_owned()),
            "qualified_type" => TypeExpr::Qualified {
                package: self.field_ident(node, "package").name,
                name: self.field_ident(node, "name").name,
            },
            "pointer_type" => TypeExpr::Pointer(Box::new(self.first_ty(node))),
            "slice_type" => TypeExpr::Slice(Box::new(self.field_ty(node, "element"))),
            "array_type" | "implicit_length_array_type" => {
                TypeExpr::Array(Box::new(self.field_ty(node, "element")))
            }
            "map_type" => TypeExpr::Map(
                Box::new(self.field_ty(node, "key")),
                Box::new(self.field_ty(node, "value")),
            ),
            "channel_type" => TypeExpr::Chan(Box::new(self.field_ty(node, "value"))),
            "function_type" => TypeExpr::Func {
                params: node
                    .child_by_field_name("parameters")
                    .map(|p| self.params(p))
                    .unwrap_or_default(),
                results: self.results(node),
            },
            "struct_type" => TypeExpr::Struct(self.struct_fields(node)),
            "generic_type" => self.field_ty(node, "type"),
            "parenthesized_type" => self.first_ty(node),
            _ => TypeExpr::Opaque(self.text(node).to_owned()),
        }
    }

    fn struct_fields(&self, node: Node<'_>) -> Vec<FieldDecl> {
        let Some(list) = named(node)
            .into_iter()
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return Vec::new();
        };
        named(list)
            .into_iter()
            .filter(|n| n.kind() == "field_declaration")
            .map(|decl| {
                let names: Vec<String> = self
                    .field_idents(decl, "name")
                    .into_iter()
                    .map(|i| i.name)
                    .collect();
                let mut ty = self.field_ty(decl, "type");
                if names.is_empty() && has_token(decl, "*") {
                    ty = TypeExpr::Pointer(Box::new(ty));
                }
                FieldDecl { names, ty }
            })
            .collect()
    }

    // ---- statements ----

    fn block(&mut self, node: Node<'_>) -> Block {
        Block {
            stmts: self.stmts(node),
            span: span(node),
        }
    }

    fn field_block(&mut self, node: Node<'_>, field: &str) -> Block {
        node.child_by_field_name(field)
            .map(|b| self.block(b))
            .unwrap_or_default()
    }

    fn stmts(&mut self, node: Node<'_>) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        for child in named(node) {
            if child.kind() == "statement_list" {
                stmts.extend(self.stmts(child));
            } else {
                stmts.push(self.stmt(child));
            }
        }
        stmts
    }

    fn boxed_stmt(&mut self, node: Node<'_>, field: &str) -> Option<Box<Stmt>> {
        node.child_by_field_name(field)
            .map(|n| Box::new(self.stmt(n)))
    }

    fn stmt(&mut self, node: Node<'_>) -> Stmt {
        let kind = match node.kind() {
            "expression_statement" | "go_statement" | "defer_statement" | "inc_statement"
            | "dec_statement" => {
                let Some(inner) = named(node).first().copied() else {
                    return Stmt {
                        kind: StmtKind::Branch,
                        span: span(node),
                    };
                };
                let expr = self.expr(inner);
                match node.kind() {
                    "go_statement" => StmtKind::Go(expr),
                    "defer_statement" => StmtKind::Defer(expr),
                    "inc_statement" | "dec_statement" => StmtKind::IncDec(expr),
                    _ => StmtKind::Expr(expr),
                }
            }
            "send_statement" => StmtKind::Send(
                self.field_expr(node, "channel"),
                self.field_expr(node, "value"),
            ),
            "assignment_statement" => {
                let lhs = self.field_list(node, "left");
                let op = node
                    .child_by_field_name("operator")
                    .map_or("=", |o| self.text(o));
                let op = if op == "=" {
                    AssignOp::Assign
                } else {
                    AssignOp::Compound(op.trim_end_matches('=').to_owned())
                };
                StmtKind::Assign {
                    lhs,
                    op,
                    rhs: self.field_list(node, "right"),
                }
            }
            "short_var_declaration" => StmtKind::Assign {
                lhs: self.field_list(node, "left"),
                op: AssignOp::Define,
                rhs: self.field_list(node, "right"),
            },
            "var_declaration" => StmtKind::Var(self.value_specs(node)),
            "const_declaration" => StmtKind::Const(self.value_specs(node)),
            "type_declaration" => StmtKind::Type(self.type_specs(node)),
            "return_statement" => StmtKind::Return(
                named(node)
                    .first()
                    .map(|list| self.expr_list(*list))
                    .unwrap_or_default(),
            ),
            "block" => StmtKind::Block(self.block(node)),
            "if_statement" => StmtKind::If {
                init: self.boxed_stmt(node, "initializer"),
                cond: self.field_expr(node, "condition"),
                then: self.field_block(node, "consequence"),
                els: self.boxed_stmt(node, "alternative"),
            },
            "for_statement" => self.for_stmt(node),
            "expression_switch_statement" => StmtKind::Switch {
                init: self.boxed_stmt(node, "initializer"),
                tag: node.child_by_field_name("value").map(|v| self.expr(v)),
                clauses: self.clauses(node),
            },
            "type_switch_statement" => StmtKind::TypeSwitch {
                init: self.boxed_stmt(node, "initializer"),
                binding: node
                    .child_by_field_name("alias")
                    .and_then(|list| named(list).first().map(|n| self.ident(*n))),
                expr: self.field_expr(node, "value"),
                clauses: self.clauses(node),
            },
            "select_statement" => StmtKind::Select(self.clauses(node)),
            "labeled_statement" => {
                match named(node).into_iter().find(|n| n.kind() != "label_name") {
                    Some(inner) => StmtKind::Labeled(Box::new(self.stmt(inner))),
                    None => StmtKind::Branch,
                }
            }
            _ => StmtKind::Branch,
        };
        Stmt {
            kind,
            span: span(node),
        }
    }

    fn for_stmt(&mut self, node: Node<'_>) -> StmtKind {
        let body_id = node.child_by_field_name("body").map(|b| b.id());
        let header = named(node)
            .into_iter()
            .find(|n| Some(n.id()) != body_id);

        match header {
            Some(clause) if clause.kind() == "for_clause" => {
                let init = self.boxed_stmt(clause, "initializer");
                let cond = clause.child_by_field_name("condition").map(|c| self.expr(c));
                let post = self.boxed_stmt(clause, "update");
                StmtKind::For {
                    init,
                    cond,
                    post,
                    body: self.field_block(node, "body"),
                }
            }
            Some(clause) if clause.kind() == "range_clause" => {
                let mut targets = self.field_list(clause, "left").into_iter();
                let key = targets.next();
                let value = targets.next();
                let expr = self.field_expr(clause, "right");
                StmtKind::Range {
                    key,
                    value,
                    define: has_token(clause, ":="),
                    expr,
                    body: self.field_block(node, "body"),
                }
            }
            Some(cond) => {
                let cond = self.expr(cond);
                StmtKind::For {
                    init: None,
                    cond: Some(cond),
                    post: None,
                    body: self.field_block(node, "body"),
                }
            }
            None => StmtKind::For {
                init: None,
                cond: None,
                post: None,
                body: self.field_block(node, "body"),
            },
        }
    }

    fn clauses(&mut self, node: Node<'_>) -> Vec<CaseClause> {
        named(node)
            .into_iter()
            .filter(|c| {
                matches!(
                    c.kind(),
                    "expression_case" | "default_case" | "type_case" | "communication_case"
                )
            })
            .map(|c| self.clause(c))
            .collect()
    }

    fn clause(&mut self, node: Node<'_>) -> CaseClause {
        let mut clause = CaseClause::default();
        let mut header = Vec::new();

        if let Some(values) = node.child_by_field_name("value") {
            header.push(values.id());
            clause.exprs = self.expr_list(values);
        }
        for ty in field_children(node, "type") {
            header.push(ty.id());
            clause.types.push(self.ty(ty));
        }
        if let Some(comm) = node.child_by_field_name("communication") {
            header.push(comm.id());
            clause.comm = Some(Box::new(self.comm(comm)));
        }

        for child in named(node) {
            if header.contains(&child.id()) {
                continue;
            }
            if child.kind() == "statement_list" {
                clause.body.extend(self.stmts(child));
            } else {
                clause.body.push(self.stmt(child));
            }
        }
        clause
    }

    fn comm(&mut self, node: Node<'_>) -> Stmt {
        if node.kind() != "receive_statement" {
            return self.stmt(node);
        }
        let lhs = self.field_list(node, "left");
        let value = self.field_expr(node, "right");
        let kind = if lhs.is_empty() {
            StmtKind::Expr(value)
        } else {
            StmtKind::Assign {
                lhs,
                op: if has_token(node, ":=") {
                    AssignOp::Define
                } else {
                    AssignOp::Assign
                },
                rhs: vec![value],
            }
        };
        Stmt {
            kind,
            span: span(node),
        }
    }

    // ---- expressions ----

    fn expr_list(&mut self, node: Node<'_>) -> Vec<Expr> {
        if node.kind() == "expression_list" {
            named(node).into_iter().map(|n| self.expr(n)).collect()
        } else {
            vec![self.expr(node)]
        }
    }

    fn field_list(&mut self, node: Node<'_>, field: &str) -> Vec<Expr> {
        node.child_by_field_name(field)
            .map(|list| self.expr_list(list))
            .unwrap_or_default()
    }

    fn field_expr(&mut self, node: Node<'_>, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.expr(child),
            None => self.make(ExprKind::Bad, node),
        }
    }

    fn boxed(&mut self, node: Node<'_>, field: &str) -> Box<Expr> {
        Box::new(self.field_expr(node, field))
    }

    fn expr(&mut self, node: Node<'_>) -> Expr {
        let kind = match node.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier"
            | "nil" | "true" | "false" | "iota" => ExprKind::Ident(self.text(node).to_owned()),
            "int_literal" => ExprKind::Lit(LitKind::Int),
            "float_literal" => ExprKind::Lit(LitKind::Float),
            "imaginary_literal" => ExprKind::Lit(LitKind::Imag),
            "rune_literal" => ExprKind::Lit(LitKind::Rune),
            "interpreted_string_literal" | "raw_string_literal" => ExprKind::Lit(LitKind::Str),
            "parenthesized_expression" => match named(node).first() {
                Some(inner) => ExprKind::Paren(Box::new(self.expr(*inner))),
                None => ExprKind::Bad,
            },
            "selector_expression" => ExprKind::Selector {
                operand: self.boxed(node, "operand"),
                field: self.field_ident(node, "field"),
            },
            "index_expression" => ExprKind::Index {
                operand: self.boxed(node, "operand"),
                index: self.boxed(node, "index"),
            },
            "slice_expression" => {
                let operand = self.boxed(node, "operand");
                let bounds = ["start", "end", "capacity"]
                    .into_iter()
                    .filter_map(|field| node.child_by_field_name(field))
                    .map(|bound| self.expr(bound))
                    .collect();
                ExprKind::Slice { operand, bounds }
            }
            "call_expression" => self.call(node),
            "unary_expression" => {
                let op = match node.child_by_field_name("operator").map(|o| self.text(o)) {
                    Some("&") => UnaryOp::Addr,
                    Some("*") => UnaryOp::Deref,
                    Some("<-") => UnaryOp::Recv,
                    Some("!") => UnaryOp::Not,
                    _ => UnaryOp::Arith,
                };
                ExprKind::Unary {
                    op,
                    operand: self.boxed(node, "operand"),
                }
            }
            "binary_expression" => ExprKind::Binary {
                op: node
                    .child_by_field_name("operator")
                    .map(|o| self.text(o).to_owned())
                    .unwrap_or_default(),
                lhs: self.boxed(node, "left"),
                rhs: self.boxed(node, "right"),
            },
            "composite_literal" => ExprKind::CompositeLit {
                ty: node.child_by_field_name("type").map(|t| self.ty(t)),
                elems: node
                    .child_by_field_name("body")
                    .map(|body| self.elements(body))
                    .unwrap_or_default(),
            },
            "literal_value" => ExprKind::CompositeLit {
                ty: None,
                elems: self.elements(node),
            },
            "func_literal" => ExprKind::FuncLit {
                params: node
                    .child_by_field_name("parameters")
                    .map(|p| self.params(p))
                    .unwrap_or_default(),
                results: self.results(node),
                body: self.field_block(node, "body"),
            },
            "type_assertion_expression" => ExprKind::TypeAssert {
                operand: self.boxed(node, "operand"),
                ty: node.child_by_field_name("type").map(|t| self.ty(t)),
            },
            "type_conversion_expression" => ExprKind::Conversion {
                ty: self.field_ty(node, "type"),
                operand: self.boxed(node, "operand"),
            },
            "variadic_argument" | "literal_element" | "type_instantiation_expression" => {
                match named(node).first() {
                    Some(inner) => return self.expr(*inner),
                    None => ExprKind::Bad,
                }
            }
            _ => ExprKind::Bad,
        };
        self.make(kind, node)
    }

    fn call(&mut self, node: Node<'_>) -> ExprKind {
        let func = self.boxed(node, "function");
        let takes_type = matches!(&func.kind, ExprKind::Ident(name) if name == "new" || name == "make");

        let mut args = Vec::new();
        let mut type_arg = None;
        if let Some(list) = node.child_by_field_name("arguments") {
            for (i, arg) in named(list).into_iter().enumerate() {
                if is_type_node(arg.kind()) {
                    if i == 0 && takes_type {
                        type_arg = Some(self.ty(arg));
                    }
                    continue;
                }
                args.push(self.expr(arg));
            }
        }
        ExprKind::Call {
            func,
            args,
            type_arg,
        }
    }

    fn elements(&mut self, node: Node<'_>) -> Vec<Element> {
        named(node)
            .into_iter()
            .filter_map(|child| match child.kind() {
                "keyed_element" => match named(child).as_slice() {
                    [] => None,
                    [value] => Some(Element {
                        key: None,
                        value: self.expr(*value),
                    }),
                    [key, .., value] => {
                        let key = self.expr(*key);
                        Some(Element {
                            key: Some(key),
                            value: self.expr(*value),
                        })
                    }
                },
                _ => Some(Element {
                    key: None,
                    value: self.expr(child),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceFile {
        GoParser::new()
            .parse(Path::new("t.go"), src)
            .expect("parse")
    }

    fn func<'f>(file: &'f SourceFile, name: &str) -> &'f FuncDecl {
        file.funcs().find(|f| f.name.name == name).expect("func")
    }

    #[test]
    fn package_and_imports() {
        let file = parse(
            "package model\n\nimport (\n\t\"fmt\"\n\tm \"example.com/app/model\"\n)\n",
        );
        assert_eq!(file.package, "model");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "fmt");
        assert_eq!(file.imports[1].name.as_deref(), Some("m"));
        assert_eq!(file.imports[1].local_name(), "m");
    }

    #[test]
    fn function_typed_parameter() {
        let file = parse("package p\n\nfunc each(visit func(int, ...string) error) {}\n");
        let param = |ty: &str, variadic| Param {
            names: Vec::new(),
            ty: TypeExpr::Name(ty.into()),
            variadic,
        };
        assert_eq!(
            func(&file, "each").params[0].ty,
            TypeExpr::Func {
                params: vec![param("int", false), param("string", true)],
                results: vec![param("error", false)],
            }
        );
    }

    #[test]
    fn struct_with_embedded_fields() {
        let file = parse("package p\n\ntype U struct {\n\tT\n\t*V\n\tA, B int\n}\n");
        let Decl::Type(specs) = &file.decls[0] else {
            panic!("expected type decl");
        };
        let TypeExpr::Struct(fields) = &specs[0].ty else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
        assert!(fields[0].is_embedded());
        assert_eq!(fields[0].ty, TypeExpr::Name("T".into()));
        assert_eq!(
            fields[1].ty,
            TypeExpr::Pointer(Box::new(TypeExpr::Name("V".into())))
        );
        assert_eq!(fields[2].names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn method_receiver_and_doc() {
        let file = parse(
            "package p\n\n// SetA sets A.\n//structwrite:constructor\nfunc (t *T) SetA() {\n\tt.A = 1\n}\n",
        );
        let set = func(&file, "SetA");
        assert!(set.is_method());
        assert_eq!(
            set.doc,
            vec!["// SetA sets A.".to_string(), "//structwrite:constructor".to_string()]
        );
        let body = set.body.as_ref().unwrap();
        assert!(matches!(
            &body.stmts[0].kind,
            StmtKind::Assign { op: AssignOp::Assign, .. }
        ));
        assert_eq!(body.span.line, 5);
    }

    #[test]
    fn detached_comment_is_not_doc() {
        let file = parse("package p\n\n// unrelated\n\nfunc F() {}\n");
        assert!(func(&file, "F").doc.is_empty());
    }

    #[test]
    fn composite_literals_and_elision() {
        let file = parse("package p\n\nfunc f() {\n\txs := []*T{{A: 1}, &T{}}\n\t_ = xs\n}\n");
        let body = func(&file, "f").body.as_ref().unwrap();
        let StmtKind::Assign { rhs, op, .. } = &body.stmts[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Define);
        let ExprKind::CompositeLit { ty, elems } = &rhs[0].kind else {
            panic!("expected literal");
        };
        assert!(matches!(ty, Some(TypeExpr::Slice(_))));
        assert_eq!(elems.len(), 2);
        assert!(matches!(
            elems[0].value.kind,
            ExprKind::CompositeLit { ty: None, .. }
        ));
        assert!(matches!(
            elems[1].value.kind,
            ExprKind::Unary {
                op: UnaryOp::Addr,
                ..
            }
        ));
    }

    #[test]
    fn inc_and_compound_assignments() {
        let file = parse("package p\n\nfunc f(t *T) {\n\tt.N++\n\tt.N += 2\n}\n");
        let body = func(&file, "f").body.as_ref().unwrap();
        assert!(matches!(body.stmts[0].kind, StmtKind::IncDec(_)));
        assert!(matches!(
            &body.stmts[1].kind,
            StmtKind::Assign { op: AssignOp::Compound(op), .. } if op == "+"
        ));
    }

    #[test]
    fn range_clause() {
        let file = parse("package p\n\nfunc f(m map[string]int) {\n\tfor k, v := range m {\n\t\t_, _ = k, v\n\t}\n}\n");
        let body = func(&file, "f").body.as_ref().unwrap();
        let StmtKind::Range {
            key, value, define, ..
        } = &body.stmts[0].kind
        else {
            panic!("expected range");
        };
        assert!(*define);
        assert!(key.is_some() && value.is_some());
    }

    #[test]
    fn new_takes_a_type_argument() {
        let file = parse("package p\n\nfunc f() {\n\tp := new(T)\n\t_ = p\n}\n");
        let body = func(&file, "f").body.as_ref().unwrap();
        let StmtKind::Assign { rhs, .. } = &body.stmts[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Call { type_arg, .. } = &rhs[0].kind else {
            panic!("expected call");
        };
        assert_eq!(type_arg.as_ref(), Some(&TypeExpr::Name("T".into())));
    }

    #[test]
    fn expression_ids_are_unique() {
        let file = parse("package p\n\nfunc f(t *T) {\n\tt.A, t.B = g(), h()\n}\n");
        struct Ids(Vec<ExprId>);
        impl<'ast> structwrite_core::model::visit::Visit<'ast> for Ids {
            fn visit_expr(&mut self, e: &'ast Expr) {
                self.0.push(e.id);
                structwrite_core::model::visit::walk_expr(self, e);
            }
        }
        let mut ids = Ids(Vec::new());
        structwrite_core::model::visit::Visit::visit_file(&mut ids, &file);
        let mut sorted = ids.0.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.0.len());
        // two selectors, their `t` operands, two calls and their callees
        assert_eq!(ids.0.len(), 8);
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = GoParser::new()
            .parse(Path::new("bad.go"), "package p\n\nfunc f( {\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
