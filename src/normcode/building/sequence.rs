//! Sequence-type resolution
//!
//!     Every cluster is compiled by one of six syntax extractors, chosen from its function
//!     concept. Resolution walks a fixed list of tiers and stops at the first that answers:
//!
//!         1. an explicit `?{sequence}: ...` tag on the function concept
//!         2. text heuristics on the stripped operator text, in [HEURISTICS] order
//!         3. the operator kind recorded by the classifier
//!         4. a bare `::` body, which is an imperative
//!
//!     A function concept none of the tiers recognize leaves the cluster unresolved.

use crate::normcode::ast::{ClassifiedLine, SequenceType};
use crate::normcode::lexing::line_classification::is_judgement;
use crate::normcode::lexing::OperatorKind;
use tracing::debug;

pub const SEQUENCE_TAG: &str = "sequence";

/// The tier that resolved a sequence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    InlineTag,
    TextHeuristic,
    OperatorKind,
    DoubleColon,
}

pub const RESOLUTION_TIERS: [ResolutionTier; 4] = [
    ResolutionTier::InlineTag,
    ResolutionTier::TextHeuristic,
    ResolutionTier::OperatorKind,
    ResolutionTier::DoubleColon,
];

/// Text patterns recognized in tier 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    JudgementCombinator,
    GroupingMarkers,
    LoopingMarkerPair,
    AssigningMarkers,
    TimingMarkers,
}

pub const HEURISTICS: [(Heuristic, SequenceType); 5] = [
    (Heuristic::JudgementCombinator, SequenceType::Judgement),
    (Heuristic::GroupingMarkers, SequenceType::Grouping),
    (Heuristic::LoopingMarkerPair, SequenceType::Looping),
    (Heuristic::AssigningMarkers, SequenceType::Assigning),
    (Heuristic::TimingMarkers, SequenceType::Timing),
];

const GROUPING_MARKERS: [&str; 2] = ["&[{}]", "&[#]"];
const ASSIGNING_MARKERS: [&str; 6] = ["$=", "$%", "$.", "$+", "$-", "$::"];
const TIMING_MARKERS: [&str; 3] = ["@if", "@after", "@by"];

impl Heuristic {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Heuristic::JudgementCombinator => is_judgement(text),
            Heuristic::GroupingMarkers => GROUPING_MARKERS.iter().any(|m| text.contains(m)),
            Heuristic::LoopingMarkerPair => text.contains("*every") && text.contains("%>("),
            Heuristic::AssigningMarkers => ASSIGNING_MARKERS.iter().any(|m| text.starts_with(m)),
            Heuristic::TimingMarkers => TIMING_MARKERS.iter().any(|m| text.starts_with(m)),
        }
    }
}

/// Tier 3 lookup table.
pub fn sequence_for_operator(kind: OperatorKind) -> SequenceType {
    match kind {
        OperatorKind::Identity
        | OperatorKind::Abstraction
        | OperatorKind::Specification
        | OperatorKind::Continuation
        | OperatorKind::Selection
        | OperatorKind::Nominalization => SequenceType::Assigning,
        OperatorKind::GroupIn | OperatorKind::GroupAcross => SequenceType::Grouping,
        OperatorKind::TimingIfNot
        | OperatorKind::TimingIf
        | OperatorKind::TimingAfter
        | OperatorKind::TimingBy => SequenceType::Timing,
        OperatorKind::Looping => SequenceType::Looping,
    }
}

fn try_tier(tier: ResolutionTier, function: &ClassifiedLine) -> Option<SequenceType> {
    let text = function.stripped();
    match tier {
        ResolutionTier::InlineTag => {
            let annotations = function.annotations();
            let tag = annotations.tag(SEQUENCE_TAG)?;
            let resolved = SequenceType::from_tag(tag);
            if resolved.is_none() {
                debug!(position = %function.position, tag, "ignoring unknown sequence tag");
            }
            resolved
        }
        ResolutionTier::TextHeuristic => HEURISTICS
            .iter()
            .find(|(heuristic, _)| heuristic.matches(text))
            .map(|(_, sequence)| *sequence),
        ResolutionTier::OperatorKind => function
            .classification
            .operator_kind
            .map(sequence_for_operator),
        ResolutionTier::DoubleColon => text.starts_with("::").then_some(SequenceType::Imperative),
    }
}

/// Resolve the sequence type of a function concept.
pub fn resolve_sequence(function: &ClassifiedLine) -> Option<(SequenceType, ResolutionTier)> {
    RESOLUTION_TIERS
        .iter()
        .find_map(|&tier| try_tier(tier, function).map(|sequence| (sequence, tier)))
}
