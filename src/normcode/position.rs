//! Hierarchical positions
//!
//!     Every role line in a plan gets a position: a dot-separated path of integers such as
//!     `1.2.1`. The path carries no meaning beyond total ordering and depth, so this module
//!     keeps the original text verbatim (explicit overrides are adopted as written) and
//!     derives a numeric key used for sorting the output tables.
//!
//!     Positions are assigned by a [PositionCounter]: a stack of per-depth counters. When a
//!     line arrives at depth `d`, the stack is extended with zeros up to `d`, anything deeper
//!     is dropped, the counter at `d` is incremented and the counters up to `d` are joined.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A dot-separated position path. An empty position sorts after every other position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn new(raw: impl Into<String>) -> Self {
        Position(raw.into().trim().to_string())
    }

    /// The position used for lines that precede every role line.
    pub fn empty() -> Self {
        Position(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric components of the path. Components that are not integers count as zero.
    pub fn components(&self) -> Vec<u64> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0
            .split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    }

    /// Number of components, i.e. the hierarchical depth plus one.
    pub fn len(&self) -> usize {
        self.components().len()
    }

    /// The sort key used by both output tables.
    pub fn sort_key(&self) -> SortKey {
        if self.0.is_empty() {
            SortKey::Missing
        } else {
            SortKey::Path(self.components())
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        Position::new(value)
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering key for table rows: numeric paths compare lexicographically, rows without a
/// position come last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Path(Vec<u64>),
    Missing,
}

/// Sort key of an optional first position.
pub fn sort_key_of(position: Option<&Position>) -> SortKey {
    position.map(Position::sort_key).unwrap_or(SortKey::Missing)
}

/// Per-depth counter stack used to number role lines.
#[derive(Debug, Clone, Default)]
pub struct PositionCounter {
    counters: Vec<u64>,
}

impl PositionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next position at `depth`.
    pub fn next(&mut self, depth: usize) -> Position {
        if self.counters.len() < depth + 1 {
            self.counters.resize(depth + 1, 0);
        }
        self.counters.truncate(depth + 1);
        self.counters[depth] += 1;

        let joined = self.counters[..=depth]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Position(joined)
    }

    /// Adopt an explicit override: the stack becomes the override's numeric components.
    pub fn reset_to(&mut self, position: &Position) {
        self.counters = position.components();
    }
}
