//! Reference strings and their disambiguators
//!
//!     Paradigm operators that name a vertical input provision get a perceptual-sign reference
//!     of the form `%{norm}ID(path)`. The `ID` only has to tell references apart, so it comes
//!     from an injected [ReferenceIds] generator rather than global randomness; the default
//!     [CounterIds] is a monotonic counter, which keeps compiler output reproducible.

use std::path::Path;

/// Source of short disambiguators for reference strings.
pub trait ReferenceIds {
    fn next_id(&mut self) -> String;
}

/// Monotonic counter rendered as three lowercase hex digits (wider once it overflows).
#[derive(Debug, Clone, Default)]
pub struct CounterIds {
    next: u32,
}

impl CounterIds {
    pub fn starting_at(start: u32) -> Self {
        CounterIds { next: start }
    }
}

impl ReferenceIds for CounterIds {
    fn next_id(&mut self) -> String {
        let id = format!("{:03x}", self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

const SCRIPT_EXTENSIONS: [&str; 6] = ["py", "rs", "js", "ts", "sh", "rb"];

/// The norm a file location is tagged with, inferred from its extension.
pub fn norm_for_path(path: &str) -> &'static str {
    let extension = Path::new(path.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("md") => "prompt_location",
        Some(ext) if SCRIPT_EXTENSIONS.contains(&ext) => "script_location",
        _ => "file_location",
    }
}

/// Build a perceptual-sign reference for a file.
pub fn perceptual_sign(path: &str, ids: &mut dyn ReferenceIds) -> String {
    format!("%{{{}}}{}({})", norm_for_path(path), ids.next_id(), path.trim())
}

/// Reference payload for a concept grounded in a file.
pub fn file_location(path: &str) -> String {
    format!("%{{file_location}}({})", path.trim())
}
