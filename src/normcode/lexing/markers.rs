//! Marker tables
//!
//! Role markers, operator prefixes, concept kinds and comment prefixes of a NormCode line.
//! The classifier tries each table in the order listed here; the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line-leading role markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleMarker {
    /// `:<:` the plan's final output
    RootFinal,
    /// `:>:` an externally supplied input
    RootExternal,
    /// `<=` the function concept of its parent
    Operator,
    /// `<-` a value concept
    Value,
    /// `<*` a context concept
    Context,
}

/// Role markers in priority order.
pub const ROLE_MARKERS: [(&str, RoleMarker); 5] = [
    (":<:", RoleMarker::RootFinal),
    (":>:", RoleMarker::RootExternal),
    ("<=", RoleMarker::Operator),
    ("<-", RoleMarker::Value),
    ("<*", RoleMarker::Context),
];

impl RoleMarker {
    pub fn symbol(&self) -> &'static str {
        match self {
            RoleMarker::RootFinal => ":<:",
            RoleMarker::RootExternal => ":>:",
            RoleMarker::Operator => "<=",
            RoleMarker::Value => "<-",
            RoleMarker::Context => "<*",
        }
    }

    /// Whether a parent carrying this marker is computed by its cluster.
    pub fn is_derived(&self) -> bool {
        match self {
            RoleMarker::RootFinal | RoleMarker::Value | RoleMarker::Context => true,
            RoleMarker::RootExternal | RoleMarker::Operator => false,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, RoleMarker::RootExternal)
    }
}

/// Split a leading role marker off `text`.
pub fn strip_role_marker(text: &str) -> (Option<RoleMarker>, &str) {
    let trimmed = text.trim_start();
    for (symbol, marker) in ROLE_MARKERS {
        if let Some(rest) = trimmed.strip_prefix(symbol) {
            return (Some(marker), rest.trim_start());
        }
    }
    (None, trimmed)
}

/// Whether `text` begins with a role marker.
pub fn starts_with_role_marker(text: &str) -> bool {
    strip_role_marker(text).0.is_some()
}

/// The specific operator a function concept denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Identity,
    Abstraction,
    Specification,
    Continuation,
    Selection,
    Nominalization,
    GroupIn,
    GroupAcross,
    TimingIfNot,
    TimingIf,
    TimingAfter,
    TimingBy,
    Looping,
}

/// Operator prefixes in the order they are tested.
pub const OPERATOR_PREFIXES: [(&str, OperatorKind); 13] = [
    ("$=", OperatorKind::Identity),
    ("$%", OperatorKind::Abstraction),
    ("$.", OperatorKind::Specification),
    ("$+", OperatorKind::Continuation),
    ("$-", OperatorKind::Selection),
    ("$::", OperatorKind::Nominalization),
    ("&[{}]", OperatorKind::GroupIn),
    ("&[#]", OperatorKind::GroupAcross),
    ("@if!", OperatorKind::TimingIfNot),
    ("@if", OperatorKind::TimingIf),
    ("@after", OperatorKind::TimingAfter),
    ("@by", OperatorKind::TimingBy),
    ("*every", OperatorKind::Looping),
];

impl OperatorKind {
    pub fn prefix(&self) -> &'static str {
        OPERATOR_PREFIXES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(prefix, _)| *prefix)
            .unwrap_or("")
    }

    /// The assignment marker for assigning operators.
    pub fn assigning_marker(&self) -> Option<&'static str> {
        match self {
            OperatorKind::Identity => Some("="),
            OperatorKind::Abstraction => Some("%"),
            OperatorKind::Specification => Some("."),
            OperatorKind::Continuation => Some("+"),
            OperatorKind::Selection => Some("-"),
            OperatorKind::Nominalization => Some("::"),
            _ => None,
        }
    }
}

/// Match the leading operator prefix of `text`, if any.
pub fn match_operator_prefix(text: &str) -> Option<OperatorKind> {
    OPERATOR_PREFIXES
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

/// What kind of concept a main line denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    Operator,
    Judgement,
    Imperative,
    Subject,
    Proposition,
    Relation,
    Object,
    Comment,
    Informal,
}

impl ConceptKind {
    /// Function-like concepts are keyed and referenced by their raw text.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            ConceptKind::Operator | ConceptKind::Judgement | ConceptKind::Imperative
        )
    }

    /// Kind marker written to the concept table.
    pub fn marker(&self, operator: Option<OperatorKind>) -> &'static str {
        match self {
            ConceptKind::Operator => operator.map(|op| op.prefix()).unwrap_or("<="),
            ConceptKind::Judgement => "::(){}",
            ConceptKind::Imperative => "::({})",
            ConceptKind::Subject => ":S:",
            ConceptKind::Proposition => "<>",
            ConceptKind::Relation => "[]",
            ConceptKind::Object => "{}",
            ConceptKind::Comment => "//",
            ConceptKind::Informal => "?",
        }
    }

    /// Wrap a raw name in the kind's brackets.
    pub fn format_name(&self, name: &str) -> String {
        match self {
            ConceptKind::Proposition => format!("<{}>", name),
            ConceptKind::Relation => format!("[{}]", name),
            ConceptKind::Object => format!("{{{}}}", name),
            ConceptKind::Subject => format!("{}:", name),
            _ => name.to_string(),
        }
    }
}

impl fmt::Display for ConceptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConceptKind::Operator => "operator",
            ConceptKind::Judgement => "judgement",
            ConceptKind::Imperative => "imperative",
            ConceptKind::Subject => "subject",
            ConceptKind::Proposition => "proposition",
            ConceptKind::Relation => "relation",
            ConceptKind::Object => "object",
            ConceptKind::Comment => "comment",
            ConceptKind::Informal => "informal",
        };
        write!(f, "{}", name)
    }
}

/// Prefixes that mark a line's text as a comment rather than a concept.
pub const COMMENT_PREFIXES: [&str; 5] = ["...:", "?:", "/:", "|", "#"];

pub fn starts_with_comment_prefix(text: &str) -> bool {
    COMMENT_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_role_marker_priority() {
        assert_eq!(
            strip_role_marker(":<: {result}"),
            (Some(RoleMarker::RootFinal), "{result}")
        );
        assert_eq!(
            strip_role_marker("<- {source}"),
            (Some(RoleMarker::Value), "{source}")
        );
        assert_eq!(strip_role_marker("{plain}"), (None, "{plain}"));
    }

    #[test]
    fn test_operator_prefix_order_prefers_negated_conditional() {
        assert_eq!(
            match_operator_prefix("@if!(%>(<x>))"),
            Some(OperatorKind::TimingIfNot)
        );
        assert_eq!(match_operator_prefix("@if %>(<x>)"), Some(OperatorKind::TimingIf));
        assert_eq!(match_operator_prefix("::(do)"), None);
    }

    #[test]
    fn test_derived_markers() {
        assert!(RoleMarker::RootFinal.is_derived());
        assert!(RoleMarker::Value.is_derived());
        assert!(!RoleMarker::RootExternal.is_derived());
        assert!(RoleMarker::RootExternal.is_external());
    }

    #[test]
    fn test_format_name_by_kind() {
        assert_eq!(ConceptKind::Object.format_name("a"), "{a}");
        assert_eq!(ConceptKind::Relation.format_name("a"), "[a]");
        assert_eq!(ConceptKind::Proposition.format_name("a"), "<a>");
        assert_eq!(ConceptKind::Imperative.format_name("::(x)"), "::(x)");
    }
}
