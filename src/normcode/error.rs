//! Compiler error types.
//!
//! Only I/O, JSON encoding and configuration problems are errors. Malformed plan content never
//! fails compilation: it degrades into informal concepts, warnings and dropped rows.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The input plan does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The input plan exists but could not be read.
    #[error("Failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output artifact could not be written.
    #[error("Failed writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CompileError {
    /// Map a read failure, distinguishing a missing file.
    pub fn reading(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => CompileError::NotFound { path },
            _ => CompileError::Read { path, source },
        }
    }

    pub fn writing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Write {
            path: path.into(),
            source,
        }
    }
}
