//! Position re-indexing
//!
//! Rewrites every role line so that it carries an explicit `?{position}: P` tag matching its
//! place in the indentation hierarchy. Existing tags are corrected in place; lines without
//! one get ` | ?{position}: P` appended. Positions are derived from indentation only, so
//! stale tags never influence the numbering and a second run changes nothing.

use crate::normcode::lexing::markers::starts_with_role_marker;
use crate::normcode::parsing::structure::{depth_of, find_unescaped_pipe};
use crate::normcode::position::PositionCounter;
use once_cell::sync::Lazy;
use regex::Regex;

static POSITION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\?\{position\}:[ \t]*)([^|\s]*)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexOutcome {
    pub text: String,
    /// Number of role lines whose text changed.
    pub updated: usize,
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn retag(body: &str, position: &str) -> String {
    if let Some(pipe) = find_unescaped_pipe(body) {
        let inline = &body[pipe..];
        if POSITION_TAG.is_match(inline) {
            let replaced = POSITION_TAG.replace(inline, |caps: &regex::Captures| {
                format!("{}{}", &caps[1], position)
            });
            return format!("{}{}", &body[..pipe], replaced);
        }
    }
    format!("{} | ?{{position}}: {}", body.trim_end(), position)
}

pub fn reindex(source: &str, indent_width: usize) -> ReindexOutcome {
    let mut counter = PositionCounter::new();
    let mut text = String::with_capacity(source.len());
    let mut updated = 0;

    for line in source.split_inclusive('\n') {
        let (body, ending) = split_line_ending(line);
        if !starts_with_role_marker(body.trim()) {
            text.push_str(line);
            continue;
        }
        let position = counter.next(depth_of(body, indent_width));
        let rewritten = retag(body, position.as_str());
        if rewritten != body {
            updated += 1;
        }
        text.push_str(&rewritten);
        text.push_str(ending);
    }

    ReindexOutcome { text, updated }
}
