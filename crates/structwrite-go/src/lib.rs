//! # structwrite-go
//!
//! Tree-sitter based Go front-end for structwrite.
//!
//! This crate turns Go source into the program model `structwrite-core`
//! consumes:
//!
//! - [`GoParser`] lowers tree-sitter syntax trees into the core AST
//! - [`checker`] computes expression types and field selections across
//!   all packages of a run
//! - [`ModuleResolver`] maps directories to import paths
//! - [`GoFrontend`] ties them together behind [`structwrite_core::Frontend`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checker;
mod frontend;
mod module;
mod parser;

pub use frontend::GoFrontend;
pub use module::{parse_module_directive, ModuleResolver};
pub use parser::{GoParser, ParseError};
