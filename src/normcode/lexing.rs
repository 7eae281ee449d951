//! Lexing: marker tables and line classification
//!
//!     NormCode is line-oriented. Each role line is classified on its own into a role marker,
//!     a concept kind, an optional operator kind and a raw name. The tables driving that
//!     classification live in [markers]; the classifier itself in [line_classification].

pub mod brackets;
pub mod line_classification;
pub mod markers;

pub use line_classification::{classify, Classification};
pub use markers::{ConceptKind, OperatorKind, RoleMarker};
