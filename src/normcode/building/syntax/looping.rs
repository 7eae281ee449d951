//! Looping interpretation
//!
//! A `*every` operator iterates over the relation named by `%>(..)` and collects into
//! `%<(..)`. Its context concepts refer back to the loop through source references:
//! `<$(base)*>` is the current element and `<$(base)*-1>` the state carried from the
//! previous iteration.

use crate::normcode::annotation::parse_axis_list;
use crate::normcode::ast::{ClassifiedLine, InferenceCluster, LoopingSyntax};
use crate::normcode::lexing::brackets::{as_reference, positional, positional_with};
use crate::normcode::lexing::ConceptKind;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_LOOP_INDEX: u32 = 1;

static SOURCE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\$\((.*)\)\*(-\d+)?>").unwrap());

/// What a context concept's source reference says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRole {
    CurrentElement,
    CarryState,
}

/// Classify a context concept by its source reference, if it has one.
pub fn loop_role(line: &ClassifiedLine) -> Option<LoopRole> {
    let caps = SOURCE_REFERENCE.captures(&line.content)?;
    Some(match caps.get(2) {
        Some(_) => LoopRole::CarryState,
        None => LoopRole::CurrentElement,
    })
}

pub fn extract(cluster: &InferenceCluster, none_axis: &str) -> LoopingSyntax {
    let function = &cluster.function_concept;
    let text = function.stripped();

    let mut current: Option<&ClassifiedLine> = None;
    let mut carry: Option<&ClassifiedLine> = None;
    for context in cluster.context_concepts() {
        match loop_role(context) {
            Some(LoopRole::CurrentElement) if current.is_none() => current = Some(context),
            Some(LoopRole::CarryState) if carry.is_none() => carry = Some(context),
            Some(_) => {}
            None => debug!(
                position = %context.position,
                "context concept without a loop source reference"
            ),
        }
    }

    let group_base_axis = function
        .annotations()
        .get("group_base")
        .map(str::to_string)
        .or_else(|| {
            current.and_then(|line| {
                line.annotations()
                    .get("axis")
                    .map(|axis| parse_axis_list(axis, none_axis).primary())
            })
        })
        .or_else(|| positional_with(text, "%:", &['(']).map(|arg| arg.content));

    LoopingSyntax {
        loop_base: positional_with(text, "%>", &['('])
            .map(|arg| as_reference(&arg.content, ConceptKind::Relation)),
        loop_result: positional(text, "%<").map(|arg| as_reference(&arg.content, ConceptKind::Object)),
        loop_index: positional_with(text, "%@", &['('])
            .and_then(|arg| arg.content.parse().ok())
            .unwrap_or(DEFAULT_LOOP_INDEX),
        current_element: current.map(|line| line.reference()),
        carry_state: carry.map(|line| line.reference()),
        group_base_axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normcode::parsing::{build_clusters, parse};

    const NONE: &str = "_none_axis";

    #[test]
    fn test_loop_with_current_element_and_carry_state() {
        let source = "\
:<: {total}
    <= *every %>(numbers) %<({total}) %@(2)
    <* {number}<$([numbers])*> | %{axis}: item
    <* {running sum}<$([numbers])*-1>
";
        let cluster = build_clusters(&parse(source, 4)).remove(0);
        let syntax = extract(&cluster, NONE);
        assert_eq!(syntax.loop_base.as_deref(), Some("[numbers]"));
        assert_eq!(syntax.loop_result.as_deref(), Some("{total}"));
        assert_eq!(syntax.loop_index, 2);
        assert_eq!(syntax.current_element.as_deref(), Some("{number}"));
        assert_eq!(syntax.carry_state.as_deref(), Some("{running sum}"));
        assert_eq!(syntax.group_base_axis.as_deref(), Some("item"));
    }

    #[test]
    fn test_loop_defaults() {
        let source = "\
:<: {total}
    <= *every %>([rows]) %:(date)
";
        let cluster = build_clusters(&parse(source, 4)).remove(0);
        let syntax = extract(&cluster, NONE);
        assert_eq!(syntax.loop_base.as_deref(), Some("[rows]"));
        assert_eq!(syntax.loop_index, DEFAULT_LOOP_INDEX);
        assert!(syntax.current_element.is_none());
        assert!(syntax.carry_state.is_none());
        assert_eq!(syntax.group_base_axis.as_deref(), Some("date"));
    }
}
