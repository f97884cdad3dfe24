//! # structwrite-core
//!
//! Detection engine for the `structwrite` lint: field writes and composite
//! literal constructions of tracked struct types are only allowed inside
//! constructor functions.
//!
//! This crate is language-neutral. A [`Frontend`] lowers source files into
//! the [`model`] and supplies type information through
//! [`TypeResolver`](model::TypeResolver); the [`engine`] does the rest.
//!
//! - [`StructWrite`] rule and its building blocks in [`engine`]
//! - [`Rule`] trait for per-file rules over a type-checked tree
//! - [`Analyzer`] for file discovery and parallel execution
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use structwrite_core::{Analyzer, Config, StructWrite};
//! use structwrite_go::GoFrontend;
//!
//! let config = Config::from_file("structwrite.toml".as_ref())?;
//! let analyzer = Analyzer::builder()
//!     .rule(StructWrite::from_settings(&config.structwrite)?)
//!     .frontend(GoFrontend::new())
//!     .config(config)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod frontend;
mod rule;
mod types;

pub mod engine;
pub mod model;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, Settings};
pub use context::FileContext;
pub use engine::StructWrite;
pub use frontend::{CheckedUnit, Frontend, FrontendError, LoadedProgram, ParseFailure};
pub use rule::{Rule, RuleBox};
pub use types::{
    Label, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
pub use utils::nolint::AllowCheck;
