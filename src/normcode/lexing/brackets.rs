//! Bracket-aware scanning helpers
//!
//! Concept names nest freely (`{sum of [numbers]}`), so every extraction that cuts text at a
//! bracket or a comma has to track depth. These helpers are shared by the classifier and the
//! syntax extractors.

use crate::normcode::lexing::markers::ConceptKind;

/// The closing bracket for an opening one.
pub fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        _ => None,
    }
}

/// Suffix tags that may directly follow a proposition: bindings, loop references and
/// judgement combinators.
const SUFFIX_TAGS: [&str; 3] = ["<:{", "<$(", "<{"];

/// Byte index of the bracket closing the one at `open_idx`, counting only the same
/// bracket pair. Propositions close on their last `>` instead, see [proposition_end].
pub fn find_matching(text: &str, open_idx: usize) -> Option<usize> {
    let open = text[open_idx..].chars().next()?;
    if open == '<' {
        return proposition_end(text, open_idx);
    }
    let close = closing_for(open)?;
    let mut depth = 0usize;
    for (offset, ch) in text[open_idx..].char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_idx + offset);
            }
        }
    }
    None
}

/// A proposition body may compare (`<count > 5>`), so it closes on the last `>` outside
/// other brackets that comes before the first suffix tag.
fn proposition_end(text: &str, open_idx: usize) -> Option<usize> {
    let body = open_idx + 1;
    let mut depth = 0usize;
    let mut last_close = None;
    for (offset, ch) in text[body..].char_indices() {
        let idx = body + offset;
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => last_close = Some(idx),
            '<' if depth == 0
                && last_close.is_some()
                && SUFFIX_TAGS.iter().any(|tag| text[idx..].starts_with(tag)) =>
            {
                break
            }
            _ => {}
        }
    }
    last_close
}

/// Whether the next character starts a list item: nothing but whitespace since the start,
/// a `[` or a `,`.
fn opens_item(current: &str) -> bool {
    matches!(current.trim_end().chars().last(), None | Some('[') | Some(','))
}

/// Split on `separator` at bracket depth zero. A quote opening an item keeps that item
/// intact; quotes anywhere else are plain text. Pieces are trimmed and empty pieces dropped.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if opens_item(&current) => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Remove one pair of enclosing brackets `open`..`close` if they wrap the whole text.
pub fn strip_enclosing(text: &str, open: char) -> Option<&str> {
    let trimmed = text.trim();
    if !trimmed.starts_with(open) {
        return None;
    }
    let end = find_matching(trimmed, 0)?;
    if end + 1 == trimmed.len() {
        Some(&trimmed[1..end])
    } else {
        None
    }
}

/// An argument of a positional marker such as `%>(...)` or `%>[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalArg {
    /// The bracket that opened the argument: `(` or `[`.
    pub bracket: char,
    pub content: String,
}

/// Find the first `marker(`...`)` or `marker[`...`]` in `text`.
pub fn positional(text: &str, marker: &str) -> Option<PositionalArg> {
    positional_with(text, marker, &['(', '['])
}

/// Like [positional] but only accepts the given opening brackets.
pub fn positional_with(text: &str, marker: &str, brackets: &[char]) -> Option<PositionalArg> {
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(marker) {
        let start = search_from + found + marker.len();
        if let Some(open) = text[start..].chars().next() {
            if brackets.contains(&open) {
                if let Some(end) = find_matching(text, start) {
                    return Some(PositionalArg {
                        bracket: open,
                        content: text[start + 1..end].trim().to_string(),
                    });
                }
            }
        }
        search_from = start;
    }
    None
}

/// The concept kind implied by the first bracket of a reference token.
pub fn bracket_kind(token: &str) -> Option<ConceptKind> {
    match token.trim().chars().next()? {
        '{' => Some(ConceptKind::Object),
        '[' => Some(ConceptKind::Relation),
        '<' => Some(ConceptKind::Proposition),
        _ => None,
    }
}

/// Format a reference token: keep its bracket if it has one, otherwise wrap it as `default`.
pub fn as_reference(token: &str, default: ConceptKind) -> String {
    let token = token.trim();
    match bracket_kind(token) {
        Some(_) => token.to_string(),
        None => default.format_name(token),
    }
}

/// Remove any outer bracket from a reference token, leaving its bare name.
pub fn bare_name(token: &str) -> &str {
    let token = token.trim();
    if let Some(open) = token.chars().next() {
        if closing_for(open).is_some() {
            if let Some(inner) = strip_enclosing(token, open) {
                return inner.trim();
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_nested() {
        let text = "{sum of {a} and {b}} tail";
        assert_eq!(find_matching(text, 0), Some(19));
    }

    #[test]
    fn test_find_matching_unclosed() {
        assert_eq!(find_matching("[open", 0), None);
    }

    #[test]
    fn test_split_top_level_respects_brackets_and_quotes() {
        let parts = split_top_level("{a}, [b, c], \"d, e\", <f>", ',');
        assert_eq!(parts, vec!["{a}", "[b, c]", "\"d, e\"", "<f>"]);
    }

    #[test]
    fn test_split_top_level_apostrophes_are_text() {
        let parts = split_top_level("{user's rows}, {b}", ',');
        assert_eq!(parts, vec!["{user's rows}", "{b}"]);
        let parts = split_top_level("it's, [don't, stop], 'quoted, item'", ',');
        assert_eq!(parts, vec!["it's", "[don't, stop]", "'quoted, item'"]);
    }

    #[test]
    fn test_find_matching_proposition_with_comparison() {
        let text = "<count > 5>";
        assert_eq!(find_matching(text, 0), Some(text.len() - 1));
        let text = "<count > 5><:{1}>";
        assert_eq!(find_matching(text, 0), Some(10));
        let text = "<ready><$([items])*>";
        assert_eq!(find_matching(text, 0), Some(6));
        assert_eq!(bare_name("<count > 5>"), "count > 5");
    }

    #[test]
    fn test_positional_paren_and_square() {
        let text = "$. %>({source}) %<([target])";
        let source = positional(text, "%>").unwrap();
        assert_eq!(source.bracket, '(');
        assert_eq!(source.content, "{source}");
        assert_eq!(positional(text, "%<").unwrap().content, "[target]");
        assert!(positional(text, "%:").is_none());
    }

    #[test]
    fn test_positional_skips_marker_without_bracket() {
        let text = "%> oops %>({real})";
        assert_eq!(positional(text, "%>").unwrap().content, "{real}");
    }

    #[test]
    fn test_as_reference_wraps_bare_tokens() {
        assert_eq!(as_reference("items", ConceptKind::Relation), "[items]");
        assert_eq!(as_reference("{items}", ConceptKind::Relation), "{items}");
        assert_eq!(bare_name("<ready>"), "ready");
    }
}
