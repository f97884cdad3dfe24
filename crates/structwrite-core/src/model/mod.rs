//! Program model shared by front-ends and the detection engine.

pub mod ast;
pub mod resolve;
pub mod ty;
pub mod visit;

pub use resolve::{CheckedFile, FileTypes, TypeResolver};
pub use ty::{Field, NamedType, TypeArena, TypeId, TypeKind};
