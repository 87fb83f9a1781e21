//! Configuration and export shared by the command-line front end and library users.

pub mod config;
pub mod export;

pub use config::{AnalyzerConfig, ConfigError, LayoutChoice};
pub use export::{ExportFormat, SeriesExport, SeriesSummary, write_export, write_exports};
