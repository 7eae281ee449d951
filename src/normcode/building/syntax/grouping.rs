//! Grouping interpretation
//!
//! `&[{}]` groups values *in* a shared structure and `&[#]` groups them *across* an axis.
//! Sources come from an inline `%>[a, b]` list, falling back to the value concepts.
//!
//! The axes each value collapses are resolved by the first [AxisTier] that applies, and the
//! result is always reconciled to exactly one entry per value concept.

use crate::normcode::annotation::{parse_axis_list, AxisList};
use crate::normcode::ast::{GroupMarker, GroupingSyntax, InferenceCluster};
use crate::normcode::lexing::brackets::{as_reference, positional_with, split_top_level};
use crate::normcode::lexing::{ConceptKind, OperatorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisTier {
    /// Every value concept carries its own `%{collapse}` annotation.
    PerValueCollapse,
    /// `%{by_axes}` on the function concept.
    FunctionAnnotation,
    /// An inline `%-[..]` modifier in the operator text.
    InlineModifier,
    /// Each value concept's declared `%{axis}`.
    ValueAxes,
}

pub const AXIS_TIERS: [AxisTier; 4] = [
    AxisTier::PerValueCollapse,
    AxisTier::FunctionAnnotation,
    AxisTier::InlineModifier,
    AxisTier::ValueAxes,
];

fn group_marker(cluster: &InferenceCluster, text: &str) -> GroupMarker {
    if text.contains("&[#]") {
        return GroupMarker::Across;
    }
    if text.contains("&[{}]") {
        return GroupMarker::In;
    }
    match cluster.function_concept.classification.operator_kind {
        Some(OperatorKind::GroupAcross) => GroupMarker::Across,
        _ => GroupMarker::In,
    }
}

fn sources(cluster: &InferenceCluster, text: &str) -> Vec<String> {
    if let Some(arg) = positional_with(text, "%>", &['[', '(']) {
        let items = if arg.bracket == '[' {
            split_top_level(&arg.content, ',')
        } else {
            vec![as_reference(&arg.content, ConceptKind::Object)]
        };
        if !items.is_empty() {
            return items;
        }
    }
    cluster
        .value_concepts
        .iter()
        .map(|value| value.reference())
        .collect()
}

fn try_tier(
    tier: AxisTier,
    cluster: &InferenceCluster,
    text: &str,
    none_axis: &str,
) -> Option<Vec<Vec<String>>> {
    let values = &cluster.value_concepts;
    match tier {
        AxisTier::PerValueCollapse => {
            let collapses: Vec<String> = values
                .iter()
                .filter_map(|value| value.annotations().get("collapse").map(str::to_string))
                .collect();
            (!values.is_empty() && collapses.len() == values.len()).then(|| {
                collapses
                    .iter()
                    .map(|collapse| parse_axis_list(collapse, none_axis).flatten())
                    .collect()
            })
        }
        AxisTier::FunctionAnnotation => cluster
            .function_concept
            .annotations()
            .get("by_axes")
            .map(|axes| parse_axis_list(axes, none_axis).per_target(values.len(), none_axis)),
        AxisTier::InlineModifier => positional_with(text, "%-", &['[']).map(|arg| {
            parse_axis_list(&format!("[{}]", arg.content), none_axis)
                .per_target(values.len(), none_axis)
        }),
        AxisTier::ValueAxes => Some(
            values
                .iter()
                .map(|value| {
                    value
                        .annotations()
                        .get("axis")
                        .map(|axis| parse_axis_list(axis, none_axis))
                        .unwrap_or_else(|| AxisList::none(none_axis))
                        .flatten()
                })
                .collect(),
        ),
    }
}

pub fn extract(cluster: &InferenceCluster, none_axis: &str) -> GroupingSyntax {
    let text = cluster.function_concept.stripped();
    let mut by_axes = AXIS_TIERS
        .iter()
        .find_map(|&tier| try_tier(tier, cluster, text, none_axis))
        .unwrap_or_default();
    by_axes.resize(cluster.value_concepts.len(), vec![none_axis.to_string()]);

    GroupingSyntax {
        marker: group_marker(cluster, text),
        sources: sources(cluster, text),
        by_axes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normcode::parsing::{build_clusters, parse};

    const NONE: &str = "_none_axis";

    fn extract_first(source: &str) -> GroupingSyntax {
        let cluster = build_clusters(&parse(source, 4)).remove(0);
        extract(&cluster, NONE)
    }

    #[test]
    fn test_across_with_inline_sources() {
        let syntax = extract_first(
            "\
:<: {pairs}
    <= &[#] %>[{a}, {b}]
    <- {a} | %{axis}: x
    <- {b}
",
        );
        assert_eq!(syntax.marker, GroupMarker::Across);
        assert_eq!(syntax.sources, vec!["{a}", "{b}"]);
        assert_eq!(syntax.by_axes, vec![vec!["x".to_string()], vec![NONE.to_string()]]);
    }

    #[test]
    fn test_inline_sources_with_apostrophe() {
        let syntax = extract_first(
            "\
:<: {pairs}
    <= &[#] %>[{user's rows}, {b}]
    <- {user's rows}
    <- {b}
",
        );
        assert_eq!(syntax.sources, vec!["{user's rows}", "{b}"]);
        assert_eq!(syntax.by_axes.len(), 2);
    }

    #[test]
    fn test_per_value_collapse_wins() {
        let syntax = extract_first(
            "\
:<: {bundle}
    <= &[{}] | %{by_axes}: [ignored]
    <- {a} | %{collapse}: [date]
    <- {b} | %{collapse}: region
",
        );
        assert_eq!(syntax.marker, GroupMarker::In);
        assert_eq!(syntax.sources, vec!["{a}", "{b}"]);
        assert_eq!(
            syntax.by_axes,
            vec![vec!["date".to_string()], vec!["region".to_string()]]
        );
    }

    #[test]
    fn test_function_annotation_is_reconciled() {
        let syntax = extract_first(
            "\
:<: {bundle}
    <= &[{}] | %{by_axes}: [[a], [b], [c]]
    <- {x}
    <- {y}
",
        );
        assert_eq!(syntax.by_axes.len(), 2);
        assert_eq!(syntax.by_axes[1], vec!["b".to_string()]);
    }

    #[test]
    fn test_inline_modifier_applies_to_every_value() {
        let syntax = extract_first(
            "\
:<: {bundle}
    <= &[#] %-[date]
    <- {x}
    <- {y}
    <- {z}
",
        );
        assert_eq!(syntax.by_axes, vec![vec!["date".to_string()]; 3]);
    }

    #[test]
    fn test_no_values_gives_empty_axes() {
        let syntax = extract_first(
            "\
:<: {bundle}
    <= &[{}] %>({only})
",
        );
        assert_eq!(syntax.sources, vec!["{only}"]);
        assert!(syntax.by_axes.is_empty());
    }
}
