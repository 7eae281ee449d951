//! # normcode-compiler
//!
//! Compiles NormCode plans, an indentation-structured notation for describing
//! computations, into two JSON tables: a concept table and an inference table.
//!
//! ## Testing
//!
//! For testing guidelines and the sample plans, see the [testing module](normcode::testing).

pub mod normcode;

pub use normcode::config::{CompilerConfig, Loader};
pub use normcode::error::CompileError;
pub use normcode::pipeline::{CompiledPlan, Compiler};
