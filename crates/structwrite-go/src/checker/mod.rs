//! A small Go type checker.
//!
//! Computes just enough type information for the write analysis: the static
//! type of every expression, the embedding path of every field selection,
//! and the expected type of elided composite literals. Anything it cannot
//! resolve is left untyped, so the engine stays silent instead of guessing.
//!
//! Checking runs in phases over all packages at once:
//!
//! 1. declare every named type,
//! 2. resolve aliases and underlying types,
//! 3. collect function signatures, methods and explicitly typed globals,
//! 4. infer the remaining globals, then check every function body.

mod expr;
mod scope;
mod stmt;

use std::collections::HashMap;

use structwrite_core::model::ast::{Decl, FuncDecl, Param, SourceFile, TypeExpr, TypeSpec, ValueSpec};
use structwrite_core::model::{Field, FileTypes, TypeArena, TypeId, TypeKind};
use tracing::debug;

use scope::{Entity, Index, Scopes};

/// Files of one package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Import path.
    pub path: String,
    /// Package clause name.
    pub name: String,
    /// Parsed files.
    pub files: Vec<SourceFile>,
}

/// Output of [`check`].
#[derive(Debug, Default)]
pub struct CheckedProgram {
    /// All types of the program.
    pub arena: TypeArena,
    /// Type tables indexed like the input: `files[package][file]`.
    pub files: Vec<Vec<FileTypes>>,
}

/// Type-checks a set of packages together.
#[must_use]
pub fn check(packages: &[Package]) -> CheckedProgram {
    let mut arena = TypeArena::new();
    let mut index = Index::new(&mut arena);

    for pkg in packages {
        index.names.insert(pkg.path.clone(), pkg.name.clone());
        let members = index.packages.entry(pkg.path.clone()).or_default();
        for spec in pkg.files.iter().flat_map(type_specs).filter(|s| !s.alias) {
            let id = arena.named(pkg.path.as_str(), spec.name.name.as_str());
            members.insert(spec.name.name.clone(), Entity::Type(id));
        }
    }

    let imports: Vec<Vec<FileImports>> = packages
        .iter()
        .map(|pkg| {
            pkg.files
                .iter()
                .map(|file| FileImports::new(file, &index))
                .collect()
        })
        .collect();

    let mut program = ProgramChecker {
        arena,
        index,
        packages,
        imports,
    };
    program.resolve_types();
    program.collect_signatures();
    let files = program.check_values();

    debug!(
        "Checked {} packages, {} types",
        packages.len(),
        program.arena.len()
    );
    CheckedProgram {
        arena: program.arena,
        files,
    }
}

fn type_specs(file: &SourceFile) -> impl Iterator<Item = &TypeSpec> {
    file.decls.iter().flat_map(|decl| match decl {
        Decl::Type(specs) => specs.as_slice(),
        _ => &[][..],
    })
}

/// Import names visible in one file.
#[derive(Debug, Default)]
pub(crate) struct FileImports {
    named: HashMap<String, String>,
    dot: Vec<String>,
}

impl FileImports {
    fn new(file: &SourceFile, index: &Index) -> Self {
        let mut imports = Self::default();
        for import in &file.imports {
            match import.name.as_deref() {
                Some("_") => {}
                Some(".") => imports.dot.push(import.path.clone()),
                Some(alias) => {
                    imports.named.insert(alias.to_owned(), import.path.clone());
                }
                None => {
                    let name = index
                        .names
                        .get(&import.path)
                        .map_or_else(|| import.local_name().to_owned(), Clone::clone);
                    imports.named.insert(name, import.path.clone());
                }
            }
        }
        imports
    }
}

struct ProgramChecker<'p> {
    arena: TypeArena,
    index: Index,
    packages: &'p [Package],
    imports: Vec<Vec<FileImports>>,
}

impl<'p> ProgramChecker<'p> {
    fn file_checker(&mut self, pkg: usize, file: usize) -> FileChecker<'_> {
        FileChecker {
            arena: &mut self.arena,
            index: &self.index,
            package: &self.packages[pkg].path,
            imports: &self.imports[pkg][file],
            types: FileTypes::new(),
            scopes: Scopes::default(),
            results: Vec::new(),
        }
    }

    fn files(&self) -> Vec<(usize, usize, &'p SourceFile)> {
        let packages = self.packages;
        packages
            .iter()
            .enumerate()
            .flat_map(|(p, pkg)| pkg.files.iter().enumerate().map(move |(f, file)| (p, f, file)))
            .collect()
    }

    fn insert_member(&mut self, pkg: usize, name: &str, entity: Entity) {
        if name == "_" {
            return;
        }
        self.index
            .packages
            .entry(self.packages[pkg].path.clone())
            .or_default()
            .insert(name.to_owned(), entity);
    }

    /// Phase 2: aliases, then underlying types of declared types.
    fn resolve_types(&mut self) {
        // Two rounds let an alias refer to an alias declared later.
        for _ in 0..2 {
            for (p, f, file) in self.files() {
                for spec in type_specs(file).filter(|s| s.alias) {
                    let ty = self.file_checker(p, f).resolve_type(&spec.ty);
                    self.insert_member(p, &spec.name.name, Entity::Type(ty));
                }
            }
        }

        for (p, f, file) in self.files() {
            for spec in type_specs(file).filter(|s| !s.alias) {
                let Some(Entity::Type(id)) = self
                    .index
                    .member(&self.packages[p].path, &spec.name.name)
                    .cloned()
                else {
                    continue;
                };
                let underlying = self.file_checker(p, f).resolve_type(&spec.ty);
                if underlying != id {
                    self.arena.set_underlying(id, underlying);
                }
            }
        }
    }

    /// Phase 3: function signatures, methods and typed package variables.
    fn collect_signatures(&mut self) {
        for (p, f, file) in self.files() {
            for decl in &file.decls {
                match decl {
                    Decl::Func(func) => self.declare_func(p, f, func),
                    Decl::Var(specs) => {
                        for spec in specs {
                            let Some(ty) = &spec.ty else { continue };
                            let ty = self.file_checker(p, f).resolve_type(ty);
                            for name in &spec.names {
                                self.insert_member(p, &name.name, Entity::Var(ty));
                            }
                        }
                    }
                    Decl::Const(_) | Decl::Type(_) => {}
                }
            }
        }
    }

    fn declare_func(&mut self, p: usize, f: usize, func: &FuncDecl) {
        let mut checker = self.file_checker(p, f);
        let sig = checker.signature(&func.params, &func.results);
        let receiver = func
            .receiver
            .as_ref()
            .and_then(|recv| checker.receiver_base(&recv.ty));

        match (&func.receiver, receiver) {
            (None, _) => {
                if func.name.name != "init" {
                    self.insert_member(p, &func.name.name, Entity::Func(sig));
                }
            }
            (Some(_), Some(base)) => {
                self.index
                    .methods
                    .entry(base)
                    .or_default()
                    .insert(func.name.name.clone(), sig);
            }
            (Some(_), None) => {}
        }
    }

    /// Phase 4: package-level initializers in source order, then bodies.
    fn check_values(&mut self) -> Vec<Vec<FileTypes>> {
        let mut files: Vec<Vec<FileTypes>> = self
            .packages
            .iter()
            .map(|pkg| vec![FileTypes::new(); pkg.files.len()])
            .collect();

        for (p, f, file) in self.files() {
            for decl in &file.decls {
                let (specs, is_const) = match decl {
                    Decl::Var(specs) => (specs, false),
                    Decl::Const(specs) => (specs, true),
                    _ => continue,
                };
                let mut checker = self.file_checker(p, f);
                checker.types = std::mem::take(&mut files[p][f]);
                let declared = checker.value_group(specs, is_const);
                files[p][f] = checker.types;

                for (name, entity) in declared {
                    self.insert_member(p, &name, entity);
                }
            }
        }

        for (p, f, file) in self.files() {
            let mut checker = self.file_checker(p, f);
            checker.types = std::mem::take(&mut files[p][f]);
            for func in file.funcs() {
                checker.check_func(func);
            }
            files[p][f] = checker.types;
        }

        files
    }
}

/// Checks expressions of one file against the program-wide declarations.
pub(crate) struct FileChecker<'c> {
    arena: &'c mut TypeArena,
    index: &'c Index,
    package: &'c str,
    imports: &'c FileImports,
    types: FileTypes,
    scopes: Scopes,
    /// Result types of the function being checked.
    results: Vec<TypeId>,
}

impl FileChecker<'_> {
    fn lookup(&self, name: &str) -> Option<Entity> {
        if let Some(entity) = self.scopes.lookup(name) {
            return Some(entity.clone());
        }
        if let Some(entity) = self.index.member(self.package, name) {
            return Some(entity.clone());
        }
        if let Some(path) = self.imports.named.get(name) {
            return Some(Entity::Import(path.clone()));
        }
        self.imports
            .dot
            .iter()
            .find_map(|path| self.index.member(path, name))
            .or_else(|| self.index.universe.get(name))
            .cloned()
    }

    fn basic(&mut self, name: &str) -> TypeId {
        self.arena.basic(name)
    }

    /// Structure of `ty` after following named types.
    fn under(&self, ty: TypeId) -> Option<TypeKind> {
        self.arena
            .get(self.arena.resolve_underlying(ty))
            .cloned()
    }

    /// Strips one pointer level.
    fn deref(&self, ty: TypeId) -> TypeId {
        match self.arena.get(ty) {
            Some(TypeKind::Pointer(elem)) => *elem,
            _ => ty,
        }
    }

    fn struct_fields(&self, ty: TypeId) -> Option<&[Field]> {
        match self.arena.get(self.arena.resolve_underlying(ty))? {
            TypeKind::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Named type declared by `pkg.name`, when `pkg` is an import.
    fn qualified_type(&self, package: &str, name: &str) -> Option<TypeId> {
        let Some(Entity::Import(path)) = self.lookup(package) else {
            return None;
        };
        match self.index.member(&path, name)? {
            Entity::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    pub(crate) fn resolve_type(&mut self, ty: &TypeExpr) -> TypeId {
        match ty {
            TypeExpr::Name(name) => match self.lookup(name) {
                Some(Entity::Type(id)) => id,
                _ => self.arena.opaque(name),
            },
            TypeExpr::Qualified { package, name } => self
                .qualified_type(package, name)
                .unwrap_or_else(|| self.arena.opaque(&format!("{package}.{name}"))),
            TypeExpr::Pointer(elem) => {
                let elem = self.resolve_type(elem);
                self.arena.pointer(elem)
            }
            TypeExpr::Slice(elem) => {
                let elem = self.resolve_type(elem);
                self.arena.slice(elem)
            }
            TypeExpr::Array(elem) => {
                let elem = self.resolve_type(elem);
                self.arena.array(elem)
            }
            TypeExpr::Map(key, value) => {
                let key = self.resolve_type(key);
                let value = self.resolve_type(value);
                self.arena.map(key, value)
            }
            TypeExpr::Chan(elem) => {
                let elem = self.resolve_type(elem);
                self.arena.chan(elem)
            }
            TypeExpr::Func { params, results } => self.signature(params, results),
            TypeExpr::Struct(decls) => {
                let mut fields = Vec::new();
                for decl in decls {
                    let ty = self.resolve_type(&decl.ty);
                    if decl.is_embedded() {
                        fields.push(Field {
                            name: embedded_name(&decl.ty).to_owned(),
                            ty,
                            embedded: true,
                        });
                    } else {
                        fields.extend(decl.names.iter().map(|name| Field {
                            name: name.clone(),
                            ty,
                            embedded: false,
                        }));
                    }
                }
                self.arena.structure(fields)
            }
            TypeExpr::Opaque(text) => self.arena.opaque(text),
        }
    }

    /// Type of one parameter group; variadic groups become slices.
    fn param_type(&mut self, param: &Param) -> TypeId {
        let ty = self.resolve_type(&param.ty);
        if param.variadic {
            self.arena.slice(ty)
        } else {
            ty
        }
    }

    fn param_types(&mut self, params: &[Param]) -> Vec<TypeId> {
        let mut types = Vec::new();
        for param in params {
            let ty = self.param_type(param);
            types.extend(std::iter::repeat(ty).take(param.names.len().max(1)));
        }
        types
    }

    fn signature(&mut self, params: &[Param], results: &[Param]) -> TypeId {
        let params = self.param_types(params);
        let results = self.param_types(results);
        self.arena.signature(params, results)
    }

    fn declare_params(&mut self, params: &[Param]) {
        for param in params {
            let ty = self.param_type(param);
            for name in &param.names {
                self.scopes.declare(&name.name, Entity::Var(ty));
            }
        }
    }

    /// Named type a method receiver is declared on.
    fn receiver_base(&self, ty: &TypeExpr) -> Option<TypeId> {
        let base = match ty {
            TypeExpr::Pointer(inner) => inner.as_ref(),
            other => other,
        };
        let TypeExpr::Name(name) = base else {
            return None;
        };
        match self.index.member(self.package, name)? {
            Entity::Type(id) if matches!(self.arena.get(*id), Some(TypeKind::Named(_))) => {
                Some(*id)
            }
            _ => None,
        }
    }

    fn check_func(&mut self, func: &FuncDecl) {
        let Some(body) = &func.body else {
            return;
        };
        self.scopes.push();
        if let Some(receiver) = &func.receiver {
            self.declare_params(std::slice::from_ref(receiver));
        }
        self.declare_params(&func.params);
        self.declare_params(&func.results);
        self.results = self.param_types(&func.results);
        self.block_stmts(&body.stmts);
        self.results.clear();
        self.scopes.pop();
    }

    /// Checks a `var` or `const` group and returns the declared names.
    fn value_group(&mut self, specs: &[ValueSpec], is_const: bool) -> Vec<(String, Entity)> {
        let mut declared = Vec::new();
        let mut inherited: Option<TypeId> = None;
        for spec in specs {
            let types = if is_const && spec.values.is_empty() {
                vec![inherited; spec.names.len()]
            } else {
                self.value_spec(spec)
            };
            if is_const {
                inherited = types.first().copied().flatten();
            }
            for (name, ty) in spec.names.iter().zip(types) {
                let entity = match (ty, is_const) {
                    (Some(ty), true) => Entity::Const(ty),
                    (Some(ty), false) => Entity::Var(ty),
                    (None, _) => Entity::Unresolved,
                };
                declared.push((name.name.clone(), entity));
            }
        }
        declared
    }
}

/// Field name of an embedded field: the type name without package or `*`.
fn embedded_name(ty: &TypeExpr) -> &str {
    match ty {
        TypeExpr::Name(name) | TypeExpr::Qualified { name, .. } => name,
        TypeExpr::Pointer(inner) => embedded_name(inner),
        _ => "",
    }
}
