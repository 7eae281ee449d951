//! Imperative and judgement interpretation
//!
//! Value order is resolved in this order:
//! 1. an explicit `%{value_order}: [{a}, {b}]` annotation on the function concept
//! 2. binding tags `<:{N}>`: when any value concept carries one, only bound values are
//!    ordered (unbound siblings are excluded)
//! 3. positional order of all value concepts
//!
//! Each value concept may carry selector annotations, collected under its formatted name.
//! Judgements additionally read their `<{..}>` combinator into an assertion condition.

use crate::normcode::annotation::{is_truthy, unquote};
use crate::normcode::ast::{
    AssertionCondition, ClassifiedLine, ImperativeSyntax, InferenceCluster, ValueSelector,
};
use crate::normcode::lexing::brackets::{split_top_level, strip_enclosing};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

pub const VALUE_ORDER_KEY: &str = "value_order";
pub const ALL_TRUE: &str = "ALL True";

static BINDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"<:\{(\d+)\}>").unwrap());
static COMBINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<\{(.*)\}>|\{<(.*)>\})\s*$").unwrap());

/// The binding position declared by a `<:{N}>` tag.
pub fn binding_of(line: &ClassifiedLine) -> Option<usize> {
    BINDING
        .captures(&line.content)
        .and_then(|caps| caps[1].parse().ok())
}

fn explicit_order(annotation: &str) -> BTreeMap<String, usize> {
    let inner = strip_enclosing(annotation, '[').unwrap_or(annotation);
    split_top_level(inner, ',')
        .iter()
        .enumerate()
        .map(|(idx, token)| (unquote(token).trim().to_string(), idx + 1))
        .collect()
}

/// Resolve the value-order map of a cluster.
pub fn value_order(cluster: &InferenceCluster) -> BTreeMap<String, usize> {
    let annotations = cluster.function_concept.annotations();
    if let Some(explicit) = annotations.get(VALUE_ORDER_KEY) {
        return explicit_order(explicit);
    }

    let bound: Vec<(String, usize)> = cluster
        .value_concepts
        .iter()
        .filter_map(|value| binding_of(value).map(|n| (value.reference(), n)))
        .collect();
    if !bound.is_empty() {
        let excluded = cluster.value_concepts.len() - bound.len();
        if excluded > 0 {
            debug!(position = %cluster.position, excluded, "excluding unbound value concepts");
        }
        return bound.into_iter().collect();
    }

    cluster
        .value_concepts
        .iter()
        .enumerate()
        .map(|(idx, value)| (value.reference(), idx + 1))
        .collect()
}

fn selector_of(value: &ClassifiedLine) -> Option<ValueSelector> {
    let annotations = value.annotations();
    let selector = ValueSelector {
        source: annotations.get("selector_source").map(str::to_string),
        key: annotations.get("selector_key").map(str::to_string),
        index: annotations
            .get("selector_index")
            .and_then(|index| index.trim().parse().ok()),
        packed: annotations.get("selector_packed").is_some_and(is_truthy),
        unpack: annotations.get("selector_unpack").is_some_and(is_truthy),
    };
    (selector != ValueSelector::default()).then_some(selector)
}

/// The assertion condition of a judgement.
pub fn assertion_condition(text: &str) -> Option<AssertionCondition> {
    if text.contains(ALL_TRUE) {
        return Some(AssertionCondition {
            quantifier: Some("all".to_string()),
            condition: "True".to_string(),
        });
    }
    let caps = COMBINATOR.captures(text)?;
    let condition = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    Some(AssertionCondition {
        quantifier: None,
        condition: condition.to_string(),
    })
}

pub fn extract(cluster: &InferenceCluster, judgement: bool) -> ImperativeSyntax {
    let value_selectors = cluster
        .value_concepts
        .iter()
        .filter_map(|value| selector_of(value).map(|s| (value.reference(), s)))
        .collect();

    ImperativeSyntax {
        value_order: value_order(cluster),
        value_selectors,
        assertion_condition: if judgement {
            assertion_condition(cluster.function_concept.stripped())
        } else {
            None
        },
    }
}
