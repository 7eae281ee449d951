//! Concept table builder
//!
//!     Builds one row per distinct concept mentioned by any cluster. Identity is the raw name
//!     for semantic concepts and the full line text for operators, so the same name mentioned
//!     at several places folds into a single row carrying every position.
//!
//!     The build runs in two passes:
//!
//!         1. Collect mentions: first-seen line, the richest comment set, all positions and
//!            whether the concept is the final output or an external input. Parents whose
//!            role marker is derived are recorded as produced.
//!         2. Emit rows. Groundedness is derived from that record alone: a concept is ground
//!            exactly when no cluster produces it. Annotations claiming groundedness on a
//!            produced concept are reported and ignored.
//!
//!     Rows are sorted by their first position.

use crate::normcode::annotation::{literal_annotations, parse_axis_list, AxisList, Annotations};
use crate::normcode::ast::{ClassifiedLine, ConceptEntry, InferenceCluster};
use crate::normcode::config::TablesConfig;
use crate::normcode::lexing::ConceptKind;
use crate::normcode::lexing::RoleMarker;
use crate::normcode::position::{sort_key_of, Position};
use crate::normcode::references::{file_location, perceptual_sign, ReferenceIds};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

pub const PARADIGM: &str = "paradigm";
pub const OPERATOR: &str = "operator";
pub const INPUT_PROVISION_KEY: &str = "v_input_provision";

static NAME_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^:"]+:\s*"([^"]*)"$"#).unwrap());
static NATURAL_CURRENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^::\((.*)\)$").unwrap());
static NATURAL_COMBINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^::\((.*)\)\s*(?:<\{.*\}>|\{<.*>\})$").unwrap());
static NATURAL_LEGACY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^::\{(.*)\}$").unwrap());

/// Everything pass 1 learns about one concept.
#[derive(Debug, Clone)]
struct Mention {
    line: ClassifiedLine,
    comments: Vec<String>,
    positions: BTreeSet<Position>,
    is_final: bool,
    is_external: bool,
}

impl Mention {
    fn new(line: &ClassifiedLine) -> Self {
        Mention {
            line: line.clone(),
            comments: line.comments.clone(),
            positions: BTreeSet::new(),
            is_final: false,
            is_external: false,
        }
    }

    fn absorb(&mut self, line: &ClassifiedLine) {
        if line.comments.len() > self.comments.len() {
            self.comments = line.comments.clone();
        }
        self.positions.insert(line.position.clone());
        match line.role_marker() {
            Some(RoleMarker::RootFinal) => self.is_final = true,
            Some(RoleMarker::RootExternal) => self.is_external = true,
            _ => {}
        }
    }
}

/// The natural-language name of an operator.
pub fn natural_operator_name(text: &str) -> String {
    [&NATURAL_CURRENT, &NATURAL_COMBINATOR, &NATURAL_LEGACY]
        .iter()
        .find_map(|pattern| pattern.captures(text).map(|caps| caps[1].trim().to_string()))
        .unwrap_or_else(|| text.to_string())
}

/// A `name: "value"` concept carries its literal value in its own name.
pub fn name_literal(name: &str) -> Option<&str> {
    NAME_LITERAL
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str())
}

pub struct ConceptTableBuilder<'a> {
    tables: &'a TablesConfig,
    ids: &'a mut dyn ReferenceIds,
}

impl<'a> ConceptTableBuilder<'a> {
    pub fn new(tables: &'a TablesConfig, ids: &'a mut dyn ReferenceIds) -> Self {
        ConceptTableBuilder { tables, ids }
    }

    pub fn build(&mut self, clusters: &[InferenceCluster]) -> Vec<ConceptEntry> {
        let (mentions, produced) = collect(clusters);
        let mut rows: Vec<ConceptEntry> = mentions
            .iter()
            .map(|mention| {
                let is_produced = produced.contains(&mention.line.concept_key());
                if mention.line.kind().is_function_like() {
                    self.operator_row(mention, is_produced)
                } else {
                    self.semantic_row(mention, is_produced)
                }
            })
            .collect();
        rows.sort_by(|a, b| sort_key_of(a.first_position()).cmp(&sort_key_of(b.first_position())));
        rows
    }

    fn none_axes(&self) -> Vec<String> {
        vec![self.tables.none_axis.clone()]
    }

    fn semantic_row(&mut self, mention: &Mention, produced: bool) -> ConceptEntry {
        let line = &mention.line;
        let name = line.name();
        let annotations = Annotations::from_comments(&mention.comments);
        let literal_name = name_literal(line.stripped());

        let explicit_ground = mention.is_external
            || annotations.flag("ground")
            || annotations.ground_comment
            || annotations.get("file_location").is_some()
            || literal_name.is_some();
        if produced && explicit_ground {
            warn!(
                concept = name,
                "ground marking on a concept produced by an inference is ignored"
            );
        }

        let reference_data = annotations
            .get("file_location")
            .map(|path| Value::String(file_location(path)))
            .or_else(|| {
                literal_annotations(&mention.comments, None)
                    .into_iter()
                    .find(|literal| literal.name.is_empty() || literal.name == name)
                    .map(|literal| literal.value)
            })
            .or_else(|| literal_name.map(|value| Value::String(format!("%({})", value))));

        let axes = annotations
            .get("axis")
            .map(|axis| parse_axis_list(axis, &self.tables.none_axis))
            .unwrap_or_else(|| AxisList::none(&self.tables.none_axis))
            .flatten();

        ConceptEntry {
            concept_name: line.classification.formatted_name(),
            kind: line.classification.kind_marker().to_string(),
            positions: mention.positions.iter().cloned().collect(),
            is_ground: !produced,
            is_final: mention.is_final,
            is_invariant: annotations.flag("invariant"),
            reference_data,
            axis_name: axes.first().cloned().unwrap_or_default(),
            reference_axis_names: axes,
            element_type: annotations.get("element_type").map(str::to_string),
            natural_name: name.to_string(),
        }
    }

    fn operator_row(&mut self, mention: &Mention, produced: bool) -> ConceptEntry {
        let line = &mention.line;
        let text = line.stripped();
        let paradigm = matches!(line.kind(), ConceptKind::Imperative | ConceptKind::Judgement);
        let annotations = Annotations::from_comments(&mention.comments);

        let reference = match annotations.get(INPUT_PROVISION_KEY).filter(|p| !p.is_empty()) {
            Some(path) if paradigm => perceptual_sign(path, &mut *self.ids),
            _ => self.tables.dummy_reference.clone(),
        };
        if produced {
            debug!(operator = text, "operator is also produced by an inference");
        }

        ConceptEntry {
            concept_name: text.to_string(),
            kind: line.classification.kind_marker().to_string(),
            positions: mention.positions.iter().cloned().collect(),
            is_ground: !produced,
            is_final: mention.is_final,
            is_invariant: true,
            reference_data: Some(Value::String(reference)),
            axis_name: self.tables.none_axis.clone(),
            reference_axis_names: self.none_axes(),
            element_type: Some(if paradigm { PARADIGM } else { OPERATOR }.to_string()),
            natural_name: natural_operator_name(text),
        }
    }
}

/// Pass 1: fold every mention into one record per identity key, in first-seen order.
fn collect(clusters: &[InferenceCluster]) -> (Vec<Mention>, HashSet<String>) {
    let mut mentions: Vec<Mention> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut produced = HashSet::new();

    for cluster in clusters {
        if let Some(parent) = &cluster.concept_to_infer {
            if parent.role_marker().is_some_and(|marker| marker.is_derived()) {
                produced.insert(parent.concept_key());
            }
        }
        for line in cluster.mentions() {
            if line.kind() == ConceptKind::Comment {
                debug!(position = %line.position, "skipping comment-shaped role line");
                continue;
            }
            let key = line.concept_key();
            let slot = *index.entry(key).or_insert_with(|| {
                mentions.push(Mention::new(line));
                mentions.len() - 1
            });
            mentions[slot].absorb(line);
        }
    }

    (mentions, produced)
}

/// Build the concept table with the given reference disambiguators.
pub fn build_concept_table(
    clusters: &[InferenceCluster],
    tables: &TablesConfig,
    ids: &mut dyn ReferenceIds,
) -> Vec<ConceptEntry> {
    ConceptTableBuilder::new(tables, ids).build(clusters)
}
