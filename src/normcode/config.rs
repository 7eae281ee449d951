//! Compiler configuration
//!
//! `defaults/normcode.default.toml` is embedded into the crate so docs and runtime behavior
//! stay in sync. Callers layer user files and single-key overrides on top of it via
//! [`Loader`] before deserializing into [`CompilerConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/normcode.default.toml");

/// Top-level configuration consumed by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerConfig {
    pub parser: ParserConfig,
    pub tables: TablesConfig,
    pub inference: InferenceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParserConfig {
    pub indent_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TablesConfig {
    pub none_axis: String,
    pub dummy_reference: String,
    pub disambiguator_start: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InferenceConfig {
    pub unresolved: UnresolvedLevel,
}

/// How loudly clusters with an unresolvable sequence type are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedLevel {
    Warn,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            parser: ParserConfig { indent_width: 4 },
            tables: TablesConfig {
                none_axis: "_none_axis".to_string(),
                dummy_reference: "%(dummy)".to_string(),
                disambiguator_start: 0,
            },
            inference: InferenceConfig {
                unresolved: UnresolvedLevel::Warn,
            },
            output: OutputConfig { pretty: true },
        }
    }
}

/// Name of the optional configuration file picked up from a plan's directory.
pub const PLAN_CONFIG_FILE: &str = "normcode.toml";

impl CompilerConfig {
    /// The embedded defaults, deserialized through the same path as user files.
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Loader::new().build()
    }
}

/// Layers, lowest first: embedded defaults, `normcode.toml` beside the plan, an explicit
/// file, then single-key overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Loader {
            builder: Config::builder().add_source(defaults),
        }
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer the plan directory's `normcode.toml`, if there is one.
    pub fn beside_plan(self, plan: &Path) -> Self {
        let dir = plan.parent().unwrap_or_else(|| Path::new(""));
        self.layer(&dir.join(PLAN_CONFIG_FILE), false)
    }

    /// Layer an explicit configuration file, which must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<CompilerConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
