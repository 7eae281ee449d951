//! Parsing: positioned lines and inference clusters
//!
//!     Raw text goes through [structure] (positions, classification, comment merging) and
//!     then [clusters] (parent/child grouping). Nothing here looks ahead more than one line.

pub mod clusters;
pub mod structure;

pub use clusters::build_clusters;
pub use structure::{parse, scan};
