//! Inference table builder
//!
//!     Every cluster becomes one row, provided its sequence type resolves. Operators nested
//!     as "other" children of a cluster are promoted into parentless rows of their own, one
//!     level deep. A promoted row infers its operator's `%>(..)` source when the concept
//!     table has a row for it, else a placeholder named after its position. Rows are
//!     sorted by numeric position.

use crate::normcode::ast::{ConceptEntry, InferenceCluster, InferenceEntry};
use crate::normcode::building::sequence::resolve_sequence;
use crate::normcode::building::syntax::extract_syntax;
use crate::normcode::config::{CompilerConfig, UnresolvedLevel};
use crate::normcode::lexing::brackets::{as_reference, bare_name, bracket_kind, positional_with};
use crate::normcode::lexing::ConceptKind;
use tracing::{debug, warn};

/// Whether a reference names a concept-table row: bracketed references by raw name,
/// everything else by its full text.
pub fn resolves(reference: &str, concepts: &[ConceptEntry]) -> bool {
    match bracket_kind(reference) {
        Some(_) => {
            let raw = bare_name(reference);
            concepts
                .iter()
                .any(|c| c.natural_name == raw && c.concept_name.starts_with(['{', '[', '<']))
        }
        None => concepts.iter().any(|c| c.concept_name == reference),
    }
}

pub fn placeholder(cluster: &InferenceCluster) -> String {
    format!("{{_inferred_{}}}", cluster.position)
}

/// The concept a cluster infers. Promoted clusters have no parent; they fall back to the
/// operator's single `%>(..)` source if the concept table knows it, then to a placeholder
/// named after the position.
pub fn concept_to_infer(cluster: &InferenceCluster, concepts: &[ConceptEntry]) -> String {
    if let Some(parent) = &cluster.concept_to_infer {
        return parent.reference();
    }
    match positional_with(cluster.function_concept.stripped(), "%>", &['(']) {
        Some(arg) => {
            let source = as_reference(&arg.content, ConceptKind::Object);
            if resolves(&source, concepts) {
                source
            } else {
                debug!(
                    position = %cluster.position,
                    source = %source,
                    "promoted source has no concept row, using a placeholder"
                );
                placeholder(cluster)
            }
        }
        None => placeholder(cluster),
    }
}

fn report_unresolved(cluster: &InferenceCluster, level: UnresolvedLevel) {
    let operator = cluster.function_concept.stripped();
    match level {
        UnresolvedLevel::Warn => warn!(
            position = %cluster.position,
            operator,
            "dropping cluster with unresolved sequence type"
        ),
        UnresolvedLevel::Debug => debug!(
            position = %cluster.position,
            operator,
            "dropping cluster with unresolved sequence type"
        ),
    }
}

/// Compile one cluster into a row, or `None` when its sequence type cannot be resolved.
pub fn compile_cluster(
    cluster: &InferenceCluster,
    concepts: &[ConceptEntry],
    config: &CompilerConfig,
) -> Option<InferenceEntry> {
    let Some((sequence, tier)) = resolve_sequence(&cluster.function_concept) else {
        report_unresolved(cluster, config.inference.unresolved);
        return None;
    };
    debug!(position = %cluster.position, %sequence, ?tier, "resolved sequence type");

    Some(InferenceEntry {
        position: cluster.position.clone(),
        sequence,
        concept_to_infer: concept_to_infer(cluster, concepts),
        function_concept: cluster.function_concept.stripped().to_string(),
        value_concepts: cluster
            .value_concepts
            .iter()
            .map(|value| value.reference())
            .collect(),
        context_concepts: cluster
            .context_concepts()
            .map(|context| context.reference())
            .collect(),
        working_interpretation: extract_syntax(sequence, cluster, &config.tables.none_axis),
    })
}

/// Build the inference table from the clusters of a plan and its concept table.
pub fn build_inference_table(
    clusters: &[InferenceCluster],
    concepts: &[ConceptEntry],
    config: &CompilerConfig,
) -> Vec<InferenceEntry> {
    let mut rows = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        rows.extend(compile_cluster(cluster, concepts, config));
        for nested in cluster.nested_operators() {
            rows.extend(compile_cluster(&InferenceCluster::promoted(nested), concepts, config));
        }
    }
    rows.sort_by(|a, b| a.position.cmp(&b.position));
    rows
}
