//! Inference clusters

use crate::normcode::ast::line::ClassifiedLine;
use crate::normcode::lexing::RoleMarker;
use crate::normcode::position::Position;
use serde::{Deserialize, Serialize};

/// One parent concept with its operator, value and other children.
///
/// Only clusters with a function concept exist; the parent is absent for the synthetic
/// clusters built when a nested operator is promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceCluster {
    pub position: Position,
    pub concept_to_infer: Option<ClassifiedLine>,
    pub function_concept: ClassifiedLine,
    pub value_concepts: Vec<ClassifiedLine>,
    pub other_concepts: Vec<ClassifiedLine>,
}

impl InferenceCluster {
    /// A parentless cluster around a single nested operator.
    pub fn promoted(operator: &ClassifiedLine) -> Self {
        InferenceCluster {
            position: operator.position.clone(),
            concept_to_infer: None,
            function_concept: operator.clone(),
            value_concepts: Vec::new(),
            other_concepts: Vec::new(),
        }
    }

    /// Other concepts that are context concepts rather than nested operators.
    pub fn context_concepts(&self) -> impl Iterator<Item = &ClassifiedLine> {
        self.other_concepts
            .iter()
            .filter(|line| !line.has_marker(RoleMarker::Operator))
    }

    /// Other concepts that carry the operator marker and are promoted to their own rows.
    pub fn nested_operators(&self) -> impl Iterator<Item = &ClassifiedLine> {
        self.other_concepts
            .iter()
            .filter(|line| line.has_marker(RoleMarker::Operator))
    }

    /// Every concept mentioned by the cluster, parent first.
    pub fn mentions(&self) -> impl Iterator<Item = &ClassifiedLine> {
        self.concept_to_infer
            .iter()
            .chain(self.value_concepts.iter())
            .chain(self.other_concepts.iter())
            .chain(std::iter::once(&self.function_concept))
    }
}
