//! Compilation pipeline
//!
//!     source text
//!         -> scan + merge            (parsing::structure)    positioned, classified lines
//!         -> build_clusters          (parsing::clusters)     inference clusters
//!         -> build_concept_table     (building::concepts)    concept rows
//!         -> build_inference_table   (building::inferences)  inference rows
//!
//!     Every stage is a pure function of its input except the concept table, which draws
//!     reference disambiguators from the compiler's [ReferenceIds] generator. A [Compiler]
//!     owns that generator so repeated compilations keep handing out fresh identifiers.

use crate::normcode::ast::{ConceptEntry, InferenceCluster, InferenceEntry};
use crate::normcode::building::{build_concept_table, build_inference_table};
use crate::normcode::config::CompilerConfig;
use crate::normcode::error::CompileError;
use crate::normcode::parsing::{build_clusters, parse};
use crate::normcode::references::{CounterIds, ReferenceIds};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// The artifacts of one compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledPlan {
    pub clusters: Vec<InferenceCluster>,
    pub concepts: Vec<ConceptEntry>,
    pub inferences: Vec<InferenceEntry>,
}

pub struct Compiler {
    config: CompilerConfig,
    ids: Box<dyn ReferenceIds>,
}

impl Compiler {
    /// A compiler whose disambiguators count up from the configured start.
    pub fn new(config: CompilerConfig) -> Self {
        let ids = CounterIds::starting_at(config.tables.disambiguator_start);
        Self::with_ids(config, Box::new(ids))
    }

    pub fn with_ids(config: CompilerConfig, ids: Box<dyn ReferenceIds>) -> Self {
        Compiler { config, ids }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile plan text. Never fails: malformed content degrades into warnings.
    pub fn compile(&mut self, source: &str) -> CompiledPlan {
        let lines = parse(source, self.config.parser.indent_width);
        let clusters = build_clusters(&lines);
        debug!(lines = lines.len(), clusters = clusters.len(), "built clusters");

        let concepts = build_concept_table(&clusters, &self.config.tables, self.ids.as_mut());
        let inferences = build_inference_table(&clusters, &concepts, &self.config);
        info!(
            concepts = concepts.len(),
            inferences = inferences.len(),
            "compiled plan"
        );

        CompiledPlan {
            clusters,
            concepts,
            inferences,
        }
    }

    pub fn compile_file(&mut self, path: &Path) -> Result<CompiledPlan, CompileError> {
        let source = fs::read_to_string(path).map_err(|e| CompileError::reading(path, e))?;
        info!(path = %path.display(), "compiling");
        Ok(self.compile(&source))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// Serialize to JSON, pretty-printed or compact.
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, CompileError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Write a JSON artifact, with a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), CompileError> {
    let mut json = to_json(value, pretty)?;
    json.push('\n');
    fs::write(path, json).map_err(|e| CompileError::writing(path, e))?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

impl CompiledPlan {
    /// Write the concept and inference tables.
    pub fn write_tables(
        &self,
        concepts_path: &Path,
        inferences_path: &Path,
        pretty: bool,
    ) -> Result<(), CompileError> {
        write_json(concepts_path, &self.concepts, pretty)?;
        write_json(inferences_path, &self.inferences, pretty)
    }

    /// Write the intermediate clusters, for inspecting how a plan was grouped.
    pub fn write_clusters(&self, path: &Path, pretty: bool) -> Result<(), CompileError> {
        write_json(path, &self.clusters, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normcode::ast::WorkingInterpretation;
    use crate::normcode::references::CounterIds;

    const PLAN: &str = "\
:<: {result}
    <= $.(...) %>({source})
    <- {source}
";

    #[test]
    fn test_compile_produces_both_tables() {
        let plan = Compiler::default().compile(PLAN);
        assert_eq!(plan.clusters.len(), 1);
        assert_eq!(plan.concepts.len(), 3);
        assert_eq!(plan.inferences.len(), 1);
    }

    #[test]
    fn test_compile_file_reports_missing_input() {
        let err = Compiler::default()
            .compile_file(Path::new("no/such/plan.ncds"))
            .unwrap_err();
        assert!(matches!(err, CompileError::NotFound { .. }));
    }

    #[test]
    fn test_disambiguators_continue_across_compilations() {
        let plan = ":<: {x}\n    <= ::(do) | %{v_input_provision}: p.md\n";
        let mut compiler = Compiler::with_ids(
            CompilerConfig::default(),
            Box::new(CounterIds::starting_at(5)),
        );
        let first = compiler.compile(plan);
        let second = compiler.compile(plan);
        let reference = |plan: &CompiledPlan| plan.concepts[1].reference_data.clone();
        assert_eq!(reference(&first), Some(serde_json::json!("%{prompt_location}005(p.md)")));
        assert_eq!(reference(&second), Some(serde_json::json!("%{prompt_location}006(p.md)")));
    }

    #[test]
    fn test_comparison_proposition_as_timing_condition() {
        let plan = Compiler::default().compile(
            "\
:<: {alert}
    <= @if %>(<count > 5>)
    <- <count > 5>
",
        );
        let condition = plan
            .concepts
            .iter()
            .find(|c| c.kind == "<>")
            .unwrap();
        assert_eq!(condition.concept_name, "<count > 5>");
        assert_eq!(condition.natural_name, "count > 5");

        let WorkingInterpretation::Timing(timing) = &plan.inferences[0].working_interpretation
        else {
            panic!("expected a timing interpretation");
        };
        assert_eq!(timing.condition.as_deref(), Some("<count > 5>"));
    }

    #[test]
    fn test_write_tables() {
        let dir = tempfile::tempdir().unwrap();
        let concepts = dir.path().join("c.json");
        let inferences = dir.path().join("i.json");
        Compiler::default()
            .compile(PLAN)
            .write_tables(&concepts, &inferences, false)
            .unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&inferences).unwrap()).unwrap();
        assert_eq!(written[0]["sequence"], "assigning");
        assert_eq!(written[0]["working_interpretation"]["marker"], ".");
        assert!(fs::read_to_string(&concepts).unwrap().ends_with('\n'));
    }
}
