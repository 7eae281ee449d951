//! Working-interpretation extractors, one per sequence type

pub mod assigning;
pub mod grouping;
pub mod imperative;
pub mod looping;
pub mod timing;

use crate::normcode::ast::{InferenceCluster, SequenceType, WorkingInterpretation};

/// Extract the working interpretation of a cluster already resolved to `sequence`.
pub fn extract_syntax(
    sequence: SequenceType,
    cluster: &InferenceCluster,
    none_axis: &str,
) -> WorkingInterpretation {
    match sequence {
        SequenceType::Imperative => {
            WorkingInterpretation::Imperative(imperative::extract(cluster, false))
        }
        SequenceType::Judgement => {
            WorkingInterpretation::Imperative(imperative::extract(cluster, true))
        }
        SequenceType::Assigning => {
            WorkingInterpretation::Assigning(assigning::extract(cluster, none_axis))
        }
        SequenceType::Grouping => {
            WorkingInterpretation::Grouping(grouping::extract(cluster, none_axis))
        }
        SequenceType::Timing => WorkingInterpretation::Timing(timing::extract(cluster)),
        SequenceType::Looping => WorkingInterpretation::Looping(looping::extract(cluster, none_axis)),
    }
}
