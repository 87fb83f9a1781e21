//! Analyzer module for movement log parsing and metric extraction.
//!
//! Provides functionality for:
//! - Tokenizing and parsing movement log lines with per-version layouts
//! - Grouping records per object
//! - Filtering by step window, move outcome and move count
//! - Step-size, rotation, translation and acceptance-ratio series
//!
//! The whole log is processed in one synchronous batch; the index is read-only
//! once built, so metric kinds are extracted in parallel.

pub mod filter;
pub mod layout;
pub mod log_loader;
pub mod log_parser;
pub mod metrics;
pub mod object_index;
pub mod task;
pub mod tokenizer;
pub mod types;

pub use filter::FilterPolicy;
pub use layout::{FieldOffset, LineLayout};
pub use log_loader::{LogLoader, ParseReport, SkippedLine};
pub use log_parser::{ParseError, RecordParser};
pub use metrics::{Extraction, MetricError, MetricExtractor};
pub use object_index::ObjectIndex;
pub use task::{AnalysisReport, AnalysisRequest, analyze_file, analyze_reader};
pub use types::{AcceptanceFilter, DEFAULT_MAX_OBJECTS, LogRecord, MetricKind, MetricSeries};
