//! Timing interpretation

use crate::normcode::ast::{InferenceCluster, TimingMarker, TimingSyntax};
use crate::normcode::lexing::brackets::{
    as_reference, bare_name, bracket_kind, positional, positional_with,
};
use crate::normcode::lexing::ConceptKind;

const MARKERS: [(&str, TimingMarker); 3] = [
    ("@if!", TimingMarker::IfNot),
    ("@if", TimingMarker::If),
    ("@after", TimingMarker::After),
];

const PREFIXES: [&str; 4] = ["@if!", "@if", "@after", "@by"];

fn condition_argument(text: &str) -> Option<String> {
    if let Some(arg) = positional(text, "%>") {
        return Some(arg.content);
    }
    PREFIXES
        .iter()
        .find(|prefix| text.starts_with(**prefix))
        .and_then(|prefix| positional_with(text, prefix, &['(']))
        .map(|arg| arg.content)
}

fn as_condition(arg: &str) -> String {
    match bracket_kind(arg) {
        Some(ConceptKind::Proposition) => arg.trim().to_string(),
        _ => ConceptKind::Proposition.format_name(bare_name(arg)),
    }
}

pub fn extract(cluster: &InferenceCluster) -> TimingSyntax {
    let text = cluster.function_concept.stripped();
    let marker = MARKERS
        .iter()
        .find(|(prefix, _)| text.contains(prefix))
        .map(|(_, marker)| *marker);

    // Conditions are propositions; dependencies of `@after` and `@by` are objects.
    let condition = condition_argument(text).map(|arg| match marker {
        Some(TimingMarker::If) | Some(TimingMarker::IfNot) => as_condition(&arg),
        _ => as_reference(&arg, ConceptKind::Object),
    });

    TimingSyntax { marker, condition }
}
