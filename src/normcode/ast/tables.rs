//! Output table rows
//!
//!     The concept table and the inference table are the compiler's two artifacts. Field names
//!     here are the JSON contract with the execution engine that loads them.

use crate::normcode::position::Position;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One row of the concept table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptEntry {
    /// Name wrapped in its kind's brackets (stripped text for operators).
    pub concept_name: String,
    /// Kind marker: `{}`, `[]`, `<>`, `::({})`, `$.` ...
    pub kind: String,
    /// Every position the concept was mentioned at, numerically sorted.
    pub positions: Vec<Position>,
    pub is_ground: bool,
    pub is_final: bool,
    pub is_invariant: bool,
    pub reference_data: Option<Value>,
    pub axis_name: String,
    pub reference_axis_names: Vec<String>,
    pub element_type: Option<String>,
    /// The unformatted name; unique across the table.
    pub natural_name: String,
}

impl ConceptEntry {
    pub fn first_position(&self) -> Option<&Position> {
        self.positions.first()
    }
}

/// The six sequence categories an inference can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceType {
    Imperative,
    Judgement,
    Assigning,
    Grouping,
    Timing,
    Looping,
}

impl SequenceType {
    pub const ALL: [SequenceType; 6] = [
        SequenceType::Imperative,
        SequenceType::Judgement,
        SequenceType::Assigning,
        SequenceType::Grouping,
        SequenceType::Timing,
        SequenceType::Looping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Imperative => "imperative",
            SequenceType::Judgement => "judgement",
            SequenceType::Assigning => "assigning",
            SequenceType::Grouping => "grouping",
            SequenceType::Timing => "timing",
            SequenceType::Looping => "looping",
        }
    }

    /// Parse an explicit `?{sequence}` tag value.
    pub fn from_tag(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the inference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceEntry {
    pub position: Position,
    pub sequence: SequenceType,
    pub concept_to_infer: String,
    pub function_concept: String,
    pub value_concepts: Vec<String>,
    pub context_concepts: Vec<String>,
    pub working_interpretation: WorkingInterpretation,
}

/// Sequence-specific payload of an inference row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkingInterpretation {
    Imperative(ImperativeSyntax),
    Assigning(AssigningSyntax),
    Grouping(GroupingSyntax),
    Timing(TimingSyntax),
    Looping(LoopingSyntax),
}

/// Selector annotations of one value concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    pub packed: bool,
    pub unpack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantifier: Option<String>,
    pub condition: String,
}

/// Imperative and judgement interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImperativeSyntax {
    pub value_order: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub value_selectors: BTreeMap<String, ValueSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_condition: Option<AssertionCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssigningSyntax {
    pub marker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_source: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_axis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupMarker {
    #[serde(rename = "in")]
    In,
    #[serde(rename = "across")]
    Across,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupingSyntax {
    pub marker: GroupMarker,
    pub sources: Vec<String>,
    /// Exactly one axis-collapse entry per value concept.
    pub by_axes: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimingMarker {
    #[serde(rename = "if")]
    If,
    #[serde(rename = "if!")]
    IfNot,
    #[serde(rename = "after")]
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingSyntax {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<TimingMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopingSyntax {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_result: Option<String>,
    pub loop_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_base_axis: Option<String>,
}
