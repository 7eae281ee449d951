//! Data model shared by the pipeline stages

pub mod cluster;
pub mod line;
pub mod tables;

pub use cluster::InferenceCluster;
pub use line::{ClassifiedLine, LineRole, ScannedLine};
pub use tables::*;
