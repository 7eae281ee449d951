//! Testing utilities
//!
//! Plan sources used by tests live in `docs/samples/` and are loaded through [NormSources]
//! rather than written inline, so that when the surface syntax changes there is one place to
//! update. Inline plans are fine for single-line classifier cases.
//!
//! ```rust,ignore
//! use normcode_compiler::normcode::testing::NormSources;
//!
//! let source = NormSources::get_string("000-specification.ncds")?;
//! let plan = NormSources::compile("010-imperative-bindings.ncds")?;
//! ```

use crate::normcode::error::CompileError;
use crate::normcode::pipeline::{CompiledPlan, Compiler};
use std::fs;
use std::path::PathBuf;

pub const AVAILABLE_SAMPLES: &[&str] = &[
    "000-specification.ncds",
    "010-imperative-bindings.ncds",
    "020-grouping-across.ncds",
    "030-loop-accumulate.ncds",
    "040-timing-judgement.ncds",
    "050-full-plan.ncds",
];

/// Access to the curated sample plans.
pub struct NormSources;

impl NormSources {
    fn samples_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("docs/samples")
    }

    pub fn sample_path(filename: &str) -> PathBuf {
        Self::samples_dir().join(filename)
    }

    fn validate_sample(filename: &str) -> Result<(), CompileError> {
        if AVAILABLE_SAMPLES.contains(&filename) {
            Ok(())
        } else {
            Err(CompileError::NotFound {
                path: Self::sample_path(filename),
            })
        }
    }

    pub fn get_string(filename: &str) -> Result<String, CompileError> {
        Self::validate_sample(filename)?;
        let path = Self::sample_path(filename);
        fs::read_to_string(&path).map_err(|e| CompileError::reading(path, e))
    }

    /// Compile a sample with the default configuration.
    pub fn compile(filename: &str) -> Result<CompiledPlan, CompileError> {
        let source = Self::get_string(filename)?;
        Ok(Compiler::default().compile(&source))
    }

    pub fn list_samples() -> Vec<&'static str> {
        AVAILABLE_SAMPLES.to_vec()
    }
}
