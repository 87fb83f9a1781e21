//! Bulk reading of movement logs.
//!
//! The whole log is read and parsed before any metric is computed. Lines that
//! fail to parse are counted, sampled for the report and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::log_parser::{ParseError, RecordParser};
use super::types::LogRecord;

/// Buffer size for reading log files (8KB).
const BUFFER_SIZE: usize = 8 * 1024;

/// Skipped lines kept verbatim in a `ParseReport`.
const MAX_SKIPPED_SAMPLES: usize = 100;

/// Line reader over a log file or any buffered source.
pub struct LogLoader<R: BufRead> {
    reader: R,
    line_buffer: Vec<u8>,
    line_number: u64,
    eof_reached: bool,
}

impl LogLoader<BufReader<File>> {
    /// Open a log file.
    ///
    /// # Returns
    ///
    /// `Ok(LogLoader)` if file opens successfully, `Err` otherwise.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> LogLoader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buffer: Vec::with_capacity(512),
            line_number: 0,
            eof_reached: false,
        }
    }

    /// Read the next non-empty line.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a garbled
    /// line reaches the parser and is skipped there instead of ending the read.
    ///
    /// # Returns
    ///
    /// `Some((line_number, line))` with a 1-based line number, `None` at EOF or on an I/O error.
    pub fn next_line(&mut self) -> Option<(u64, String)> {
        if self.eof_reached {
            return None;
        }

        loop {
            self.line_buffer.clear();

            match self.reader.read_until(b'\n', &mut self.line_buffer) {
                Ok(0) => {
                    self.eof_reached = true;
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;
                    let text = String::from_utf8_lossy(&self.line_buffer);
                    let line = text.trim_end();
                    if !line.is_empty() {
                        return Some((self.line_number, line.to_string()));
                    }
                    // Skip empty lines; the simulator starts every record with '\n'.
                }
                Err(e) => {
                    log::warn!("Error reading log at line {}: {}", self.line_number + 1, e);
                    self.eof_reached = true;
                    return None;
                }
            }
        }
    }

    /// Check if EOF has been reached.
    pub fn is_eof(&self) -> bool {
        self.eof_reached
    }

    /// Parse every remaining line.
    pub fn load_records(&mut self, parser: &RecordParser) -> ParseReport {
        let mut report = ParseReport::default();

        while let Some((line_number, line)) = self.next_line() {
            report.lines_read += 1;
            match parser.parse_line(&line, line_number) {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    log::debug!("Skipping line {}: {} ({})", line_number, error, line);
                    report.record_skip(SkippedLine {
                        line_number,
                        content: line,
                        error,
                    });
                }
            }
        }

        log::info!(
            "Read {} lines: {} records parsed, {} skipped",
            report.lines_read,
            report.records.len(),
            report.skipped
        );
        report
    }
}

/// A line that did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line_number: u64,
    pub content: String,
    pub error: ParseError,
}

/// Outcome of parsing a whole log.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Parsed records in log order.
    pub records: Vec<LogRecord>,
    /// Non-empty lines read.
    pub lines_read: usize,
    /// Lines that failed to parse.
    pub skipped: usize,
    /// The first skipped lines, verbatim.
    pub samples: Vec<SkippedLine>,
}

impl ParseReport {
    /// Lines that produced a record.
    pub fn parsed(&self) -> usize {
        self.lines_read - self.skipped
    }

    fn record_skip(&mut self, line: SkippedLine) {
        self.skipped += 1;
        if self.samples.len() < MAX_SKIPPED_SAMPLES {
            self.samples.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::layout::LineLayout;
    use crate::analyzer::types::DEFAULT_MAX_OBJECTS;
    use std::io::Cursor;

    const LOG: &str = "\nobject number :  1 ,obj_n_bad : 0, obj_n_good : 1, obj_dl_max ;= 1.000000, dx: 0.100000, dy: 0.200000, angle: 0.000000 n_step = 0 accepted\n\
\nobject number :  2 ,obj_n_bad : 1, obj_n_good : 0, obj_dl_max ;= 1.000000, dx: 0.300000, dy: 0.400000, angle: 0.500000 n_step = 1 refused\n\
\nsomething unrelated\n\
\nobject number :  1 ,obj_n_bad : 0, obj_n_good : 2, obj_dl_max ;= 1.100000, dx: 0.000000, dy: 0.000000, angle: 1.000000 n_step = 2 accepted";

    #[test]
    fn test_next_line_skips_empty_lines() {
        let mut loader = LogLoader::new(Cursor::new("\nfirst\n\n  \nsecond\n"));
        assert_eq!(loader.next_line(), Some((2, "first".to_string())));
        assert_eq!(loader.next_line(), Some((5, "second".to_string())));
        assert_eq!(loader.next_line(), None);
        assert!(loader.is_eof());
    }

    #[test]
    fn test_load_records_counts_skips() {
        let parser = RecordParser::new(LineLayout::V2, DEFAULT_MAX_OBJECTS);
        let report = LogLoader::new(Cursor::new(LOG)).load_records(&parser);

        assert_eq!(report.lines_read, 4);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].content, "something unrelated");
        assert_eq!(report.samples[0].line_number, 6);

        let steps: Vec<u64> = report.records.iter().map(|r| r.step_index).collect();
        assert_eq!(steps, vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped_and_reading_continues() {
        let valid = "\nobject number :  3 ,obj_n_bad : 1, obj_n_good : 2, obj_dl_max ;= 1.000000, dx: 0.100000, dy: 0.100000, angle: 0.200000 n_step = 5 accepted";
        let mut bytes = valid.as_bytes().to_vec();
        bytes.extend_from_slice(b"\ngarbled \xff\xfe line");
        for _ in 0..50 {
            bytes.extend_from_slice(valid.as_bytes());
        }

        let parser = RecordParser::new(LineLayout::V2, DEFAULT_MAX_OBJECTS);
        let report = LogLoader::new(Cursor::new(bytes)).load_records(&parser);

        assert_eq!(report.lines_read, 52);
        assert_eq!(report.records.len(), 51);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.samples[0].line_number, 3);
        assert!(report.samples[0].content.starts_with("garbled"));
    }

    #[test]
    fn test_all_lines_malformed_is_not_fatal() {
        let parser = RecordParser::new(LineLayout::V2, DEFAULT_MAX_OBJECTS);
        let text = "bad\n".repeat(150);
        let report = LogLoader::new(Cursor::new(text)).load_records(&parser);

        assert!(report.records.is_empty());
        assert_eq!(report.skipped, 150);
        assert_eq!(report.parsed(), 0);
        assert_eq!(report.samples.len(), MAX_SKIPPED_SAMPLES);
    }
}
