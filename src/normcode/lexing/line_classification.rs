//! Line Classification
//!
//! Core classification logic for the content of a role line. The classifier is a pure
//! function: it never looks at neighbouring lines and never fails. Anything it cannot make
//! sense of becomes an `informal` concept with warnings attached.
//!
//! Classification follows this specific order (important for correctness):
//! 1. Strip a leading role marker (`:<:`, `:>:`, `<=`, `<-`, `<*`)
//! 2. Operator prefixes (assigning, grouping, timing, looping) in table order
//! 3. Double-colon concepts: judgement when a combinator follows the body, else imperative
//! 4. Subject (`name:`), proposition (`<..>`), relation (`[..]`), object (`{..}`)
//! 5. Comment prefixes
//! 6. Default to informal

use crate::normcode::lexing::brackets::find_matching;
use crate::normcode::lexing::markers::{
    match_operator_prefix, starts_with_comment_prefix, strip_role_marker, ConceptKind,
    OperatorKind, RoleMarker,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const WARN_UNCLOSED: &str = "unclosed bracket";
pub const WARN_UNRECOGNIZED: &str = "unrecognized concept form";
pub const WARN_AFTER_MARKER: &str = "unrecognized form after marker";

static JUDGEMENT_CURRENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^::\(.*\)\s*<\{.*\}>").unwrap());
static JUDGEMENT_LEGACY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^::\(.*\)\s*\{<.*>\}").unwrap());
static SUBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_ ]*?):(?:\s|$)").unwrap());

/// The result of classifying one line's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub role_marker: Option<RoleMarker>,
    pub concept_kind: ConceptKind,
    pub operator_kind: Option<OperatorKind>,
    /// Raw name: inner text for bracket forms, full text for function-like concepts.
    pub name: String,
    /// Text following a bracketed name, e.g. a binding tag `<:{1}>`.
    pub suffix: String,
    pub warnings: Vec<String>,
}

impl Classification {
    /// The name wrapped in its kind's brackets.
    pub fn formatted_name(&self) -> String {
        self.concept_kind.format_name(&self.name)
    }

    /// The kind marker written to the concept table.
    pub fn kind_marker(&self) -> &'static str {
        self.concept_kind.marker(self.operator_kind)
    }
}

/// Whether `text` is a judgement: a double-colon body followed by a `<{..}>` combinator
/// (or the legacy `{<..>}` form).
pub fn is_judgement(text: &str) -> bool {
    JUDGEMENT_CURRENT.is_match(text) || JUDGEMENT_LEGACY.is_match(text)
}

/// Classify the (already trimmed) content of a line.
pub fn classify(content: &str) -> Classification {
    let (role_marker, rest) = strip_role_marker(content.trim());
    let rest = rest.trim();

    let mut result = Classification {
        role_marker,
        concept_kind: ConceptKind::Informal,
        operator_kind: None,
        name: String::new(),
        suffix: String::new(),
        warnings: Vec::new(),
    };

    if let Some(kind) = match_operator_prefix(rest) {
        result.concept_kind = ConceptKind::Operator;
        result.operator_kind = Some(kind);
        result.name = rest.to_string();
        return result;
    }

    if rest.starts_with("::") {
        result.concept_kind = if is_judgement(rest) {
            ConceptKind::Judgement
        } else {
            ConceptKind::Imperative
        };
        result.name = rest.to_string();
        return result;
    }

    if let Some(caps) = SUBJECT.captures(rest) {
        result.concept_kind = ConceptKind::Subject;
        result.name = caps[1].trim().to_string();
        result.suffix = rest[caps.get(0).map_or(0, |m| m.end())..].trim().to_string();
        return result;
    }

    let bracket_kind = match rest.chars().next() {
        Some('<') => Some(ConceptKind::Proposition),
        Some('[') => Some(ConceptKind::Relation),
        Some('{') => Some(ConceptKind::Object),
        _ => None,
    };
    if let Some(kind) = bracket_kind {
        result.concept_kind = kind;
        match find_matching(rest, 0) {
            Some(end) => {
                result.name = rest[1..end].trim().to_string();
                result.suffix = rest[end + 1..].trim().to_string();
            }
            None => {
                result.name = rest[1..].trim().to_string();
                result.warnings.push(WARN_UNCLOSED.to_string());
            }
        }
        return result;
    }

    if starts_with_comment_prefix(rest) {
        result.concept_kind = ConceptKind::Comment;
        result.name = rest.to_string();
        return result;
    }

    result.warnings.push(WARN_UNRECOGNIZED.to_string());
    if role_marker.is_some() {
        result.warnings.push(WARN_AFTER_MARKER.to_string());
        result.name = rest.split_whitespace().next().unwrap_or("").to_string();
    } else {
        result.name = rest.to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_object_with_binding_suffix() {
        let c = classify("<- {numbers}<:{1}>");
        assert_eq!(c.role_marker, Some(RoleMarker::Value));
        assert_eq!(c.concept_kind, ConceptKind::Object);
        assert_eq!(c.name, "numbers");
        assert_eq!(c.suffix, "<:{1}>");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_classify_comparison_proposition_keeps_suffix() {
        let c = classify("<- <count > 5><:{2}>");
        assert_eq!(c.concept_kind, ConceptKind::Proposition);
        assert_eq!(c.name, "count > 5");
        assert_eq!(c.suffix, "<:{2}>");
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_classify_operator_keeps_full_text() {
        let c = classify("<= $.(...) %>({source})");
        assert_eq!(c.concept_kind, ConceptKind::Operator);
        assert_eq!(c.operator_kind, Some(OperatorKind::Specification));
        assert_eq!(c.name, "$.(...) %>({source})");
    }

    #[test]
    fn test_classify_judgement_current_and_legacy() {
        assert_eq!(
            classify("<= ::(the {sum} is positive)<{ALL True}>").concept_kind,
            ConceptKind::Judgement
        );
        assert_eq!(
            classify("<= ::(the {sum} is positive){<True>}").concept_kind,
            ConceptKind::Judgement
        );
        assert_eq!(
            classify("<= ::(add {a} and {b})").concept_kind,
            ConceptKind::Imperative
        );
    }

    #[test]
    fn test_classify_subject() {
        let c = classify("<- user agent: the caller");
        assert_eq!(c.concept_kind, ConceptKind::Subject);
        assert_eq!(c.name, "user agent");
        assert_eq!(c.formatted_name(), "user agent:");
    }

    #[test]
    fn test_classify_unclosed_relation_warns() {
        let c = classify("<- [numbers");
        assert_eq!(c.concept_kind, ConceptKind::Relation);
        assert_eq!(c.name, "numbers");
        assert_eq!(c.warnings, vec![WARN_UNCLOSED.to_string()]);
    }

    #[test]
    fn test_classify_informal_after_marker() {
        let c = classify("<- just some words");
        assert_eq!(c.concept_kind, ConceptKind::Informal);
        assert_eq!(c.name, "just");
        assert_eq!(
            c.warnings,
            vec![WARN_UNRECOGNIZED.to_string(), WARN_AFTER_MARKER.to_string()]
        );
    }

    #[test]
    fn test_classify_comment() {
        let c = classify("/: explains the step");
        assert_eq!(c.concept_kind, ConceptKind::Comment);
        assert_eq!(c.role_marker, None);
    }
}
