//! Frontend symbol resolution
//!
//! This module contains the symbol layer and the constraint / member checks built on it.
//! Lexing, parsing and statement binding live outside this crate and feed it declarations.

pub mod core;
pub mod typecheck;

pub use self::core::type_system::{Compilation, SymbolError};
