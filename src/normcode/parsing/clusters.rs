//! Cluster building
//!
//! Reconstructs parent/child relations from line depth and groups each parent with its
//! children. A depth stack is kept while walking the lines in order: entries whose depth is
//! not strictly less than the current line's are popped, and whatever remains on top is the
//! parent.
//!
//! Children are sorted into three groups, preserving document order:
//! - the first child carrying `<=` is the function concept
//! - children carrying `<-` are value concepts
//! - everything else (context concepts, further operators) goes to the other concepts
//!
//! Only parents with a function concept yield a cluster.

use crate::normcode::ast::{ClassifiedLine, InferenceCluster};
use crate::normcode::lexing::RoleMarker;
use tracing::debug;

/// Child indices per line index.
pub fn child_map(lines: &[ClassifiedLine]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); lines.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        while stack.last().is_some_and(|&(_, depth)| depth >= line.depth) {
            stack.pop();
        }
        if let Some(&(parent, _)) = stack.last() {
            children[parent].push(idx);
        }
        stack.push((idx, line.depth));
    }

    children
}

/// Group lines into inference clusters, in parent document order.
pub fn build_clusters(lines: &[ClassifiedLine]) -> Vec<InferenceCluster> {
    let children = child_map(lines);
    let mut clusters = Vec::new();

    for (parent_idx, child_indices) in children.iter().enumerate() {
        if child_indices.is_empty() {
            continue;
        }

        let mut function_concept: Option<&ClassifiedLine> = None;
        let mut value_concepts = Vec::new();
        let mut other_concepts = Vec::new();

        for &child_idx in child_indices {
            let child = &lines[child_idx];
            match child.role_marker() {
                Some(RoleMarker::Operator) if function_concept.is_none() => {
                    function_concept = Some(child);
                }
                Some(RoleMarker::Value) => value_concepts.push(child.clone()),
                _ => other_concepts.push(child.clone()),
            }
        }

        let parent = &lines[parent_idx];
        match function_concept {
            Some(function) => clusters.push(InferenceCluster {
                position: parent.position.clone(),
                concept_to_infer: Some(parent.clone()),
                function_concept: function.clone(),
                value_concepts,
                other_concepts,
            }),
            None => debug!(
                position = %parent.position,
                "parent without a function concept does not form a cluster"
            ),
        }
    }

    clusters
}
