//! Main module for the NormCode compiler

pub mod annotation;
pub mod ast;
pub mod building;
pub mod config;
pub mod error;
pub mod lexing;
pub mod parsing;
pub mod pipeline;
pub mod position;
pub mod references;
pub mod reindex;
pub mod testing;
