//! Analysis of hard-disc Monte Carlo simulator logs.
//!
//! - `analyzer`: movement log parsing, per-object indexing, filtering and metric series
//! - `common`: configuration and series export
//! - `snapshot`: trajectory snapshot readers (pair distance, frame splitting)

pub mod analyzer;
pub mod common;
pub mod snapshot;
