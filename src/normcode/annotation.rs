//! Annotation extraction
//!
//!     Role lines carry side information in their attached comments. Two forms are read:
//!
//!         | %{key}: value          keyed annotation
//!         | ?{key}: value          inline tag (position override, sequence override)
//!
//!     A keyed annotation whose key has the shape `literal<$M name>` is a literal annotation:
//!     its value is parsed as a structural literal (number, string or flat list) and every
//!     scalar is wrapped as `%(scalar)`. Values run up to the next unescaped `|`, so several
//!     annotations can share one inline comment.
//!
//!     Axis lists accept a scalar, a flat bracketed list or a list of lists and are never
//!     empty: missing or unparseable input yields the "no axis" sentinel.

use crate::normcode::lexing::brackets::{split_top_level, strip_enclosing};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

static KEYED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*%\{([^{}]+)\}:\s*((?:\\\||[^|])*)").unwrap());
static TAGGED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\?\{([^{}]+)\}:\s*((?:\\\||[^|])*)").unwrap());
static LITERAL_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^literal<\$(\S+)\s+(.+)>$").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());

fn clean_value(raw: &str) -> String {
    raw.trim().replace("\\|", "|")
}

/// Keyed `| %{key}: value` annotations. The first occurrence of a key wins.
pub fn keyed_annotations(comments: &[String]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for comment in comments {
        for caps in KEYED.captures_iter(comment) {
            result
                .entry(caps[1].trim().to_string())
                .or_insert_with(|| clean_value(&caps[2]));
        }
    }
    result
}

/// Inline `?{key}: value` tags. The first occurrence of a key wins.
pub fn inline_tags(comments: &[String]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    for comment in comments {
        for caps in TAGGED.captures_iter(comment) {
            result
                .entry(caps[1].trim().to_string())
                .or_insert_with(|| clean_value(&caps[2]));
        }
    }
    result
}

/// Whether a comment is the standalone ground marker `/: ground`.
pub fn is_ground_comment(comment: &str) -> bool {
    let body = comment.trim();
    let body = body.strip_prefix("/:").unwrap_or(body);
    body.trim().eq_ignore_ascii_case("ground")
}

/// Truthy flag values: `true`, `yes`, `1`, `on`.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}

/// Remove one pair of matching surrounding quotes.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// All annotations attached to one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub keyed: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    pub ground_comment: bool,
}

impl Annotations {
    pub fn from_comments(comments: &[String]) -> Self {
        Annotations {
            keyed: keyed_annotations(comments),
            tags: inline_tags(comments),
            ground_comment: comments.iter().any(|c| is_ground_comment(c)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keyed.get(key).map(String::as_str)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// A keyed annotation read as a boolean flag.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }
}

/// A `%{literal<$M name>}: value` annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralAnnotation {
    /// The assigning marker after `$`; empty for a plain `%{literal}` annotation.
    pub marker: String,
    /// The concept the literal belongs to; empty for a plain `%{literal}` annotation.
    pub name: String,
    pub value: Value,
}

/// Literal annotations, optionally restricted to one assigning marker.
pub fn literal_annotations(comments: &[String], marker_filter: Option<&str>) -> Vec<LiteralAnnotation> {
    let mut result = Vec::new();
    for comment in comments {
        for caps in KEYED.captures_iter(comment) {
            let key = caps[1].trim();
            let (marker, name) = if key == "literal" {
                (String::new(), String::new())
            } else if let Some(parts) = LITERAL_KEY.captures(key) {
                (parts[1].to_string(), parts[2].trim().to_string())
            } else {
                continue;
            };
            if marker_filter.is_some_and(|filter| filter != marker) {
                continue;
            }
            result.push(LiteralAnnotation {
                marker,
                name,
                value: parse_literal(&clean_value(&caps[2])),
            });
        }
    }
    result
}

fn wrap(scalar: &str) -> Value {
    Value::String(format!("%({})", scalar))
}

fn parse_scalar(text: &str) -> Option<Value> {
    let text = text.trim();
    if NUMBER.is_match(text) {
        return Some(wrap(text));
    }
    if matches!(text, "True" | "False" | "true" | "false" | "None" | "null") {
        return Some(wrap(text));
    }
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            if !inner.contains(quote) {
                return Some(wrap(inner));
            }
        }
    }
    None
}

/// Parse a structural literal, wrapping every scalar as `%(scalar)`. Input that is not a
/// number, a quoted string or a flat list of those is wrapped verbatim.
pub fn parse_literal(text: &str) -> Value {
    try_parse_literal(text).unwrap_or_else(|| wrap(text.trim()))
}

/// Structural parse without the raw-text fallback.
pub fn try_parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.starts_with('[') {
        let inner = strip_enclosing(text, '[')?;
        let items = split_top_level(inner, ',');
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if item.starts_with('[') {
                return None;
            }
            values.push(parse_scalar(&item)?);
        }
        return Some(Value::Array(values));
    }
    parse_scalar(text)
}

/// A parsed axis annotation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AxisList {
    Flat(Vec<String>),
    Nested(Vec<Vec<String>>),
}

impl AxisList {
    pub fn none(none_axis: &str) -> Self {
        AxisList::Flat(vec![none_axis.to_string()])
    }

    /// All axis names in order.
    pub fn flatten(&self) -> Vec<String> {
        match self {
            AxisList::Flat(axes) => axes.clone(),
            AxisList::Nested(groups) => groups.iter().flatten().cloned().collect(),
        }
    }

    pub fn primary(&self) -> String {
        self.flatten().into_iter().next().unwrap_or_default()
    }

    /// One axis group per target. A flat list applies to every target; a nested list is
    /// matched positionally, padded with the sentinel and truncated.
    pub fn per_target(&self, targets: usize, none_axis: &str) -> Vec<Vec<String>> {
        match self {
            AxisList::Flat(axes) => vec![axes.clone(); targets],
            AxisList::Nested(groups) => {
                let mut result: Vec<Vec<String>> = groups.iter().take(targets).cloned().collect();
                result.resize(targets, vec![none_axis.to_string()]);
                result
            }
        }
    }
}

fn parse_flat_axes(inner: &str) -> Vec<String> {
    split_top_level(inner, ',')
        .iter()
        .map(|item| unquote(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse an axis annotation value.
pub fn parse_axis_list(text: &str, none_axis: &str) -> AxisList {
    let text = text.trim();
    if text.is_empty() {
        return AxisList::none(none_axis);
    }
    if !text.starts_with('[') {
        let scalar = unquote(text).trim();
        if scalar.is_empty() {
            return AxisList::none(none_axis);
        }
        return AxisList::Flat(vec![scalar.to_string()]);
    }

    let Some(inner) = strip_enclosing(text, '[') else {
        return AxisList::none(none_axis);
    };
    let items = split_top_level(inner, ',');
    if items.iter().any(|item| item.starts_with('[')) {
        let mut groups = Vec::new();
        for item in &items {
            let group = match strip_enclosing(item, '[') {
                Some(group_inner) => parse_flat_axes(group_inner),
                None if item.starts_with('[') => return AxisList::none(none_axis),
                None => parse_flat_axes(item),
            };
            if group.is_empty() {
                groups.push(vec![none_axis.to_string()]);
            } else {
                groups.push(group);
            }
        }
        if groups.is_empty() {
            return AxisList::none(none_axis);
        }
        return AxisList::Nested(groups);
    }

    let axes = parse_flat_axes(inner);
    if axes.is_empty() {
        AxisList::none(none_axis)
    } else {
        AxisList::Flat(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &str = "_none_axis";

    fn comments(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_keyed_annotations_share_one_comment() {
        let found = keyed_annotations(&comments(&["| %{axis}: date | %{ground}: true"]));
        assert_eq!(found.get("axis").map(String::as_str), Some("date"));
        assert_eq!(found.get("ground").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_keyed_annotation_unescapes_pipes() {
        let found = keyed_annotations(&comments(&[r"| %{element_type}: a \| b"]));
        assert_eq!(found.get("element_type").map(String::as_str), Some("a | b"));
    }

    #[test]
    fn test_inline_tags() {
        let found = inline_tags(&comments(&["| ?{sequence}: grouping | ?{position}: 1.2"]));
        assert_eq!(found.get("sequence").map(String::as_str), Some("grouping"));
        assert_eq!(found.get("position").map(String::as_str), Some("1.2"));
    }

    #[test]
    fn test_literal_annotation_with_marker_filter() {
        let lines = comments(&[
            "| %{literal<$% threshold>}: 5",
            "| %{literal<$= label>}: \"fast\"",
        ]);
        let all = literal_annotations(&lines, None);
        assert_eq!(all.len(), 2);

        let abstraction = literal_annotations(&lines, Some("%"));
        assert_eq!(abstraction.len(), 1);
        assert_eq!(abstraction[0].name, "threshold");
        assert_eq!(abstraction[0].value, Value::String("%(5)".into()));
    }

    #[test]
    fn test_parse_literal_list_and_fallback() {
        assert_eq!(
            parse_literal("[1, 'a', \"b c\"]"),
            serde_json::json!(["%(1)", "%(a)", "%(b c)"])
        );
        assert_eq!(parse_literal("not a literal"), Value::String("%(not a literal)".into()));
        assert_eq!(parse_literal("[[1], 2]"), Value::String("%([[1], 2])".into()));
    }

    #[test]
    fn test_parse_axis_list_forms() {
        assert_eq!(parse_axis_list("date", NONE), AxisList::Flat(vec!["date".into()]));
        assert_eq!(
            parse_axis_list("['date', region]", NONE),
            AxisList::Flat(vec!["date".into(), "region".into()])
        );
        assert_eq!(
            parse_axis_list("[[a], [b, c]]", NONE),
            AxisList::Nested(vec![vec!["a".into()], vec!["b".into(), "c".into()]])
        );
        assert_eq!(parse_axis_list("", NONE), AxisList::none(NONE));
        assert_eq!(parse_axis_list("[", NONE), AxisList::none(NONE));
        assert_eq!(parse_axis_list("[]", NONE), AxisList::none(NONE));
    }

    #[test]
    fn test_per_target_pads_and_truncates() {
        let nested = AxisList::Nested(vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]]);
        assert_eq!(nested.per_target(2, NONE), vec![vec!["a"], vec!["b"]]);
        assert_eq!(
            AxisList::Nested(vec![vec!["a".into()]]).per_target(2, NONE),
            vec![vec!["a".to_string()], vec![NONE.to_string()]]
        );
        assert_eq!(
            AxisList::Flat(vec!["x".into()]).per_target(2, NONE),
            vec![vec!["x"], vec!["x"]]
        );
    }

    #[test]
    fn test_ground_comment() {
        assert!(is_ground_comment("/: Ground"));
        assert!(!is_ground_comment("/: grounded elsewhere"));
    }
}
