//! Serialization of metric series for plotting and spreadsheet tools.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::analyzer::{Extraction, FilterPolicy, MetricKind, MetricSeries};

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Tsv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Tsv => "tsv",
        }
    }
}

/// Descriptive figures for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl SeriesSummary {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                min: None,
                max: None,
                mean: None,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self {
            count: values.len(),
            min: Some(min),
            max: Some(max),
            mean: Some(mean),
        }
    }
}

/// One metric kind of one log, ready to write.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesExport {
    /// RFC 3339 UTC time the export was built.
    pub generated_at: String,
    pub source: String,
    pub metric: MetricKind,
    pub filter: FilterPolicy,
    /// Log lines that did not parse.
    pub lines_skipped: usize,
    /// Filtered records without a defined value.
    pub records_skipped: usize,
    pub series: BTreeMap<usize, Vec<f64>>,
    pub summary: BTreeMap<usize, SeriesSummary>,
}

impl SeriesExport {
    pub fn new(source: &str, filter: &FilterPolicy, lines_skipped: usize, extraction: &Extraction) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            source: source.to_string(),
            metric: extraction.kind,
            filter: *filter,
            lines_skipped,
            records_skipped: extraction.skipped,
            series: series_map(&extraction.series),
            summary: extraction.series.iter().map(|(id, values)| (id, SeriesSummary::of(values))).collect(),
        }
    }
}

fn series_map(series: &MetricSeries) -> BTreeMap<usize, Vec<f64>> {
    series.iter().map(|(id, values)| (id, values.to_vec())).collect()
}

/// Write the export as pretty-printed JSON.
pub fn write_json<W: Write>(writer: &mut W, export: &SeriesExport) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, export)?;
    writeln!(writer)?;
    Ok(())
}

/// Write one column per object, headed by the object id; shorter columns are padded with empty cells.
pub fn write_tsv<W: Write>(writer: &mut W, export: &SeriesExport) -> anyhow::Result<()> {
    let header: Vec<String> = export.series.keys().map(|id| id.to_string()).collect();
    writeln!(writer, "{}", header.join("\t"))?;

    let rows = export.series.values().map(Vec::len).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = export
            .series
            .values()
            .map(|values| values.get(row).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writeln!(writer, "{}", cells.join("\t"))?;
    }
    Ok(())
}

/// Write in the requested format.
pub fn write_export<W: Write>(writer: &mut W, export: &SeriesExport, format: ExportFormat) -> anyhow::Result<()> {
    match format {
        ExportFormat::Json => write_json(writer, export),
        ExportFormat::Tsv => write_tsv(writer, export),
    }
}

/// Write several exports to one stream.
///
/// JSON becomes a single array so the stream stays one document. TSV tables
/// are written one after another, each introduced by a `# <metric>` line.
pub fn write_exports<W: Write>(writer: &mut W, exports: &[SeriesExport], format: ExportFormat) -> anyhow::Result<()> {
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, exports)?;
            writeln!(writer)?;
        }
        ExportFormat::Tsv => {
            for (i, export) in exports.iter().enumerate() {
                if i > 0 {
                    writeln!(writer)?;
                }
                writeln!(writer, "# {}", export.metric)?;
                write_tsv(writer, export)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{LogRecord, MetricExtractor, ObjectIndex};

    fn export() -> SeriesExport {
        let records = vec![
            LogRecord {
                object_id: 0,
                step_index: 1,
                accepted: Some(true),
                n_good: 1,
                n_bad: 1,
                step_size_bound: 2.0,
                dx: 3.0,
                dy: 4.0,
                rotation_angle: 0.0,
            },
            LogRecord {
                object_id: 0,
                step_index: 2,
                accepted: Some(true),
                n_good: 2,
                n_bad: 1,
                step_size_bound: 4.0,
                dx: 0.0,
                dy: 1.0,
                rotation_angle: 0.0,
            },
            LogRecord {
                object_id: 2,
                step_index: 3,
                accepted: Some(false),
                n_good: 0,
                n_bad: 1,
                step_size_bound: 1.0,
                dx: 0.0,
                dy: 0.0,
                rotation_angle: 0.0,
            },
        ];
        let index = ObjectIndex::build(records, 3).unwrap();
        let filter = FilterPolicy::default();
        let extraction = MetricExtractor::new(&index, &filter).step_size_bound();
        SeriesExport::new("test.log", &filter, 2, &extraction)
    }

    #[test]
    fn test_summary() {
        let summary = SeriesSummary::of(&[1.0, 3.0, 2.0]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(3.0));
        assert_eq!(summary.mean, Some(2.0));
        assert_eq!(SeriesSummary::of(&[]).mean, None);
    }

    #[test]
    fn test_json_export() {
        let mut out = Vec::new();
        write_json(&mut out, &export()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["metric"], "step-size-bound");
        assert_eq!(value["source"], "test.log");
        assert_eq!(value["lines_skipped"], 2);
        assert_eq!(value["series"]["0"], serde_json::json!([2.0, 4.0]));
        assert_eq!(value["series"]["1"], serde_json::json!([]));
        assert_eq!(value["summary"]["2"]["count"], 1);
        assert_eq!(value["filter"]["acceptance"], "any");
        assert!(chrono::DateTime::parse_from_rfc3339(value["generated_at"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_tsv_export_pads_short_columns() {
        let mut out = Vec::new();
        write_export(&mut out, &export(), ExportFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, vec!["0\t1\t2", "2\t\t1", "4\t\t"]);
    }

    #[test]
    fn test_several_json_exports_form_one_document() {
        let mut out = Vec::new();
        write_exports(&mut out, &[export(), export()], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let documents = value.as_array().unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["metric"], "step-size-bound");
    }

    #[test]
    fn test_several_tsv_exports_are_labelled() {
        let mut out = Vec::new();
        write_exports(&mut out, &[export(), export()], ExportFormat::Tsv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# step-size");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "# step-size");
        assert_eq!(lines.len(), 9);
    }
}
