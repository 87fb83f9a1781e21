//! Batch analysis pipeline.
//!
//! Runs the stages in order:
//! - Log reading and line parsing
//! - Per-object indexing
//! - Metric extraction, one scoped thread per requested kind

use anyhow::{Context, anyhow};
use std::io::BufRead;
use std::path::Path;
use std::thread;

use super::filter::FilterPolicy;
use super::layout::LineLayout;
use super::log_loader::{LogLoader, ParseReport};
use super::log_parser::RecordParser;
use super::metrics::{Extraction, MetricExtractor};
use super::object_index::ObjectIndex;
use super::types::MetricKind;

/// What to compute for one log.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub layout: LineLayout,
    pub max_objects: usize,
    pub filter: FilterPolicy,
    pub kinds: Vec<MetricKind>,
}

/// Everything produced for one log.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Parse counts and skipped-line samples; the records themselves live in `index`.
    pub parse: ParseReport,
    pub index: ObjectIndex,
    /// One entry per requested kind, in request order.
    pub extractions: Vec<Extraction>,
}

impl AnalysisReport {
    pub fn extraction(&self, kind: MetricKind) -> Option<&Extraction> {
        self.extractions.iter().find(|e| e.kind == kind)
    }
}

/// Analyze a log file.
pub fn analyze_file(path: &Path, request: &AnalysisRequest) -> anyhow::Result<AnalysisReport> {
    log::info!("Analyzing {} ({} metric kinds)", path.display(), request.kinds.len());
    let loader = LogLoader::open(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
    analyze(loader, request)
}

/// Analyze a log from any buffered source.
pub fn analyze_reader<R: BufRead>(reader: R, request: &AnalysisRequest) -> anyhow::Result<AnalysisReport> {
    analyze(LogLoader::new(reader), request)
}

fn analyze<R: BufRead>(mut loader: LogLoader<R>, request: &AnalysisRequest) -> anyhow::Result<AnalysisReport> {
    let parser = RecordParser::new(request.layout, request.max_objects);
    let mut parse = loader.load_records(&parser);

    // Records move into the index; the report keeps only the counts and samples.
    let index = ObjectIndex::build(std::mem::take(&mut parse.records), request.max_objects)?;
    log::debug!("Indexed {} records over {} objects", index.total_records(), index.object_count());

    if request.filter.is_empty_range() {
        log::warn!(
            "Step window {}..={} is inverted, every series will be empty",
            request.filter.step_start,
            request.filter.step_end
        );
    }

    let extractions = extract_all(&index, &request.filter, &request.kinds)?;

    Ok(AnalysisReport {
        parse,
        index,
        extractions,
    })
}

/// Extract several metric kinds concurrently over the shared read-only index.
pub fn extract_all(index: &ObjectIndex, filter: &FilterPolicy, kinds: &[MetricKind]) -> anyhow::Result<Vec<Extraction>> {
    let extractor = MetricExtractor::new(index, filter);

    thread::scope(|scope| {
        let handles: Vec<_> = kinds
            .iter()
            .map(|&kind| scope.spawn(move || extractor.extract(kind)))
            .collect();

        handles
            .into_iter()
            .zip(kinds)
            .map(|(handle, kind)| handle.join().map_err(|_| anyhow!("{} extraction panicked", kind)))
            .collect()
    })
}
