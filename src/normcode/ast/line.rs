//! Scanned and classified lines

use crate::normcode::annotation::Annotations;
use crate::normcode::lexing::markers::strip_role_marker;
use crate::normcode::lexing::{Classification, ConceptKind, RoleMarker};
use crate::normcode::position::Position;
use serde::{Deserialize, Serialize};

/// The structural role of a physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Main,
    Comment,
    InlineComment,
}

/// One entry of the flat scan: a main line, a comment line, or the inline comment split off
/// a main line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedLine {
    pub position: Position,
    pub depth: usize,
    pub role: LineRole,
    pub text: String,
    /// 1-based line number in the source.
    pub line_number: usize,
}

/// A main line with its classification and attached comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub position: Position,
    pub depth: usize,
    /// Main text including the role marker, without the inline comment.
    pub content: String,
    pub classification: Classification,
    pub comments: Vec<String>,
    /// Natural-language `...:` line directly following this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    pub line_number: usize,
}

impl ClassifiedLine {
    pub fn role_marker(&self) -> Option<RoleMarker> {
        self.classification.role_marker
    }

    pub fn kind(&self) -> ConceptKind {
        self.classification.concept_kind
    }

    pub fn name(&self) -> &str {
        &self.classification.name
    }

    pub fn has_marker(&self, marker: RoleMarker) -> bool {
        self.role_marker() == Some(marker)
    }

    /// The content with its role marker removed.
    pub fn stripped(&self) -> &str {
        strip_role_marker(&self.content).1.trim()
    }

    /// How other rows refer to this concept: function-like concepts by their stripped text,
    /// everything else by its bracketed name.
    pub fn reference(&self) -> String {
        if self.kind().is_function_like() {
            self.stripped().to_string()
        } else {
            self.classification.formatted_name()
        }
    }

    /// Identity key in the concept table: raw name, or the full text for function-like
    /// concepts.
    pub fn concept_key(&self) -> String {
        if self.kind().is_function_like() {
            self.content.clone()
        } else {
            self.classification.name.clone()
        }
    }

    pub fn annotations(&self) -> Annotations {
        Annotations::from_comments(&self.comments)
    }
}
