//! Table building
//!
//! Turns inference clusters into the two output tables:
//!
//! - [concepts]: one row per distinct concept with groundedness, reference data and axes
//! - [inferences]: one row per cluster with its sequence type and working interpretation
//!
//! [sequence] decides which of the [syntax] extractors interprets a cluster.

pub mod concepts;
pub mod inferences;
pub mod sequence;
pub mod syntax;

pub use concepts::{build_concept_table, ConceptTableBuilder};
pub use inferences::build_inference_table;
pub use sequence::resolve_sequence;
