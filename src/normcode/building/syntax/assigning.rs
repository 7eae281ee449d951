//! Assigning interpretation
//!
//! The assignment marker comes from the operator prefix (`$.` gives `.`). What else is read
//! depends on the marker:
//!
//! - specification (`.`): the source, from an `assign_sources` annotation, an inline
//!   `%>[a, b]` list, or a single `%>(a)`; a missing source is reported and left null
//! - continuation (`+`): destination `%<(..)`, source `%>(..)` and axis `%:(..)`
//! - abstraction (`%`): a face value and the axis names of the concept being inferred
//! - identity, selection and nominalization: a single `%>(..)` source

use crate::normcode::annotation::{literal_annotations, parse_axis_list, parse_literal, unquote};
use crate::normcode::ast::{AssigningSyntax, InferenceCluster};
use crate::normcode::lexing::brackets::{
    as_reference, positional, positional_with, split_top_level, strip_enclosing,
};
use crate::normcode::lexing::markers::match_operator_prefix;
use crate::normcode::lexing::{ConceptKind, OperatorKind};
use serde_json::Value;
use tracing::{debug, warn};

pub const ASSIGN_SOURCES_KEY: &str = "assign_sources";
const IDENTITY_MARKER: &str = "=";

fn single_source(text: &str) -> Option<String> {
    positional_with(text, "%>", &['('])
        .map(|arg| as_reference(&arg.content, ConceptKind::Object))
}

fn string_list(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Read an `assign_sources` annotation: JSON first, then a bracket-aware split.
fn annotated_sources(annotation: &str) -> Option<Value> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(annotation) {
        return (!items.is_empty()).then(|| string_list(items));
    }
    let inner = strip_enclosing(annotation, '[').unwrap_or(annotation);
    let items: Vec<String> = split_top_level(inner, ',')
        .iter()
        .map(|item| unquote(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    (!items.is_empty()).then(|| string_list(items))
}

fn specification_source(cluster: &InferenceCluster, text: &str) -> Value {
    let function = &cluster.function_concept;
    if let Some(sources) = function
        .annotations()
        .get(ASSIGN_SOURCES_KEY)
        .and_then(annotated_sources)
    {
        return sources;
    }
    if let Some(list) = positional_with(text, "%>", &['[']) {
        let items = split_top_level(&list.content, ',');
        if !items.is_empty() {
            return string_list(items);
        }
    }
    if let Some(source) = single_source(text) {
        return Value::String(source);
    }
    warn!(
        position = %cluster.position,
        operator = text,
        "specification without an assign source"
    );
    Value::Null
}

fn face_value(cluster: &InferenceCluster, text: &str) -> Option<Value> {
    let literal = literal_annotations(&cluster.function_concept.comments, Some("%"))
        .into_iter()
        .next()
        .or_else(|| {
            cluster.concept_to_infer.as_ref().and_then(|parent| {
                literal_annotations(&parent.comments, Some("%"))
                    .into_iter()
                    .next()
            })
        });
    if let Some(literal) = literal {
        return Some(literal.value);
    }
    positional_with(text, "%>", &['('])
        .or_else(|| positional_with(text, "$%", &['(']))
        .map(|arg| parse_literal(&arg.content))
}

pub fn extract(cluster: &InferenceCluster, none_axis: &str) -> AssigningSyntax {
    let function = &cluster.function_concept;
    let text = function.stripped();
    let kind = function
        .classification
        .operator_kind
        .or_else(|| match_operator_prefix(text));

    let marker = match kind.and_then(|k| k.assigning_marker()) {
        Some(marker) => marker,
        None => {
            debug!(
                position = %cluster.position,
                operator = text,
                "no assignment marker, treating as identity"
            );
            IDENTITY_MARKER
        }
    };

    let mut syntax = AssigningSyntax {
        marker: marker.to_string(),
        ..AssigningSyntax::default()
    };

    match kind {
        Some(OperatorKind::Specification) => {
            syntax.assign_source = Some(specification_source(cluster, text));
        }
        Some(OperatorKind::Continuation) => {
            syntax.assign_destination =
                positional(text, "%<").map(|arg| as_reference(&arg.content, ConceptKind::Object));
            syntax.assign_source = single_source(text).map(Value::String);
            syntax.by_axis = positional(text, "%:").map(|arg| unquote(&arg.content).to_string());
        }
        Some(OperatorKind::Abstraction) => {
            syntax.face_value = face_value(cluster, text);
            let axes = cluster
                .concept_to_infer
                .as_ref()
                .and_then(|parent| {
                    parent
                        .annotations()
                        .get("axis")
                        .map(|axis| parse_axis_list(axis, none_axis).flatten())
                })
                .unwrap_or_else(|| vec![none_axis.to_string()]);
            syntax.axis_names = Some(axes);
        }
        _ => {
            syntax.assign_source = single_source(text).map(Value::String);
        }
    }
    syntax
}
