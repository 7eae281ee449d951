//! Structural parsing
//!
//!     Turns raw plan text into positioned lines. This runs in two steps:
//!
//!     1. [scan] walks the physical lines and produces a flat sequence of [ScannedLine]s:
//!        one `main` entry per role line, one `inline_comment` entry for the text after the
//!        first unescaped `|` of a role line, and one `comment` entry per other line.
//!     2. [parse] classifies the main lines and merges every comment onto the main line it
//!        follows, producing [ClassifiedLine]s.
//!
//! Positions
//!
//!     Role lines are numbered by a per-depth counter stack (see [PositionCounter]). An
//!     explicit `?{position}: a.b.c` tag in the inline comment is adopted verbatim and resets
//!     the stack to its numeric components. Comment lines do not take part in numbering:
//!     they inherit the position of the nearest preceding role line.
//!
//!     Depth is the number of leading spaces divided by the indent width; a tab counts as a
//!     full indent.

use crate::normcode::annotation::inline_tags;
use crate::normcode::ast::{ClassifiedLine, LineRole, ScannedLine};
use crate::normcode::lexing::classify;
use crate::normcode::lexing::markers::starts_with_role_marker;
use crate::normcode::position::{Position, PositionCounter};
use tracing::debug;

pub const POSITION_TAG: &str = "position";
pub const SOURCE_TEXT_PREFIX: &str = "...:";

/// Leading indentation measured in spaces.
pub fn leading_spaces(line: &str, indent_width: usize) -> usize {
    let mut spaces = 0;
    for ch in line.chars() {
        match ch {
            ' ' => spaces += 1,
            '\t' => spaces += indent_width,
            _ => break,
        }
    }
    spaces
}

/// Depth of a physical line.
pub fn depth_of(line: &str, indent_width: usize) -> usize {
    leading_spaces(line, indent_width) / indent_width.max(1)
}

/// Byte index of the first `|` not preceded by a backslash.
pub fn find_unescaped_pipe(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '\\' => escaped = !escaped,
            '|' if !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

/// Split a role line into its main text and its inline comment (which keeps the `|`).
pub fn split_inline_comment(text: &str) -> (&str, Option<&str>) {
    match find_unescaped_pipe(text) {
        Some(idx) => {
            let inline = text[idx..].trim();
            (text[..idx].trim(), (inline.len() > 1).then_some(inline))
        }
        None => (text.trim(), None),
    }
}

/// The explicit position override carried by an inline comment, if any.
pub fn position_override(inline: &str) -> Option<Position> {
    inline_tags(&[inline.to_string()])
        .get(POSITION_TAG)
        .filter(|value| !value.is_empty())
        .map(|value| Position::new(value.as_str()))
}

/// Produce the flat, positioned line sequence.
pub fn scan(source: &str, indent_width: usize) -> Vec<ScannedLine> {
    let mut lines = Vec::new();
    let mut counter = PositionCounter::new();
    let mut current = Position::empty();

    for (idx, raw) in source.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let depth = depth_of(raw, indent_width);
        let line_number = idx + 1;

        if !starts_with_role_marker(trimmed) {
            lines.push(ScannedLine {
                position: current.clone(),
                depth,
                role: LineRole::Comment,
                text: trimmed.to_string(),
                line_number,
            });
            continue;
        }

        let (main, inline) = split_inline_comment(trimmed);
        let position = match inline.and_then(position_override) {
            Some(explicit) => {
                counter.reset_to(&explicit);
                explicit
            }
            None => counter.next(depth),
        };
        current = position.clone();

        lines.push(ScannedLine {
            position: position.clone(),
            depth,
            role: LineRole::Main,
            text: main.replace("\\|", "|"),
            line_number,
        });
        if let Some(inline) = inline {
            lines.push(ScannedLine {
                position: position_override(inline).unwrap_or(position),
                depth,
                role: LineRole::InlineComment,
                text: inline.to_string(),
                line_number,
            });
        }
    }

    lines
}

/// Classify main lines and attach comments to them.
pub fn merge(scanned: Vec<ScannedLine>) -> Vec<ClassifiedLine> {
    let mut result: Vec<ClassifiedLine> = Vec::new();
    let mut awaiting_source_text = false;

    for line in scanned {
        match line.role {
            LineRole::Main => {
                let classification = classify(&line.text);
                if !classification.warnings.is_empty() {
                    debug!(
                        line = line.line_number,
                        warnings = ?classification.warnings,
                        "classified line with warnings"
                    );
                }
                result.push(ClassifiedLine {
                    position: line.position,
                    depth: line.depth,
                    content: line.text,
                    classification,
                    comments: Vec::new(),
                    source_text: None,
                    line_number: line.line_number,
                });
                awaiting_source_text = true;
            }
            LineRole::InlineComment | LineRole::Comment => {
                let Some(owner) = result.last_mut() else {
                    debug!(line = line.line_number, "dropping comment before first role line");
                    continue;
                };
                if line.role == LineRole::Comment {
                    if awaiting_source_text {
                        if let Some(text) = line.text.strip_prefix(SOURCE_TEXT_PREFIX) {
                            owner.source_text = Some(text.trim().to_string());
                        }
                    }
                    awaiting_source_text = false;
                }
                owner.comments.push(line.text);
            }
        }
    }

    result
}

/// Scan and merge in one go.
pub fn parse(source: &str, indent_width: usize) -> Vec<ClassifiedLine> {
    merge(scan(source, indent_width))
}
