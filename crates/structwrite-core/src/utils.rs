//! Utility functions for rule implementations.

pub mod nolint;

#[doc(inline)]
pub use nolint::{check_nolint, AllowCheck};
