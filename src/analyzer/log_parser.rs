//! Parse individual movement log lines into structured `LogRecord` data.
//!
//! Field positions come from a `LineLayout`; the move outcome comes from the
//! literal `accepted` / `refused` marker anywhere on the line, for layouts
//! that write one.

use super::layout::{FieldOffset, LineLayout};
use super::tokenizer::{strip_trailing_punctuation, tokenize_line};
use super::types::LogRecord;
use std::fmt;
use std::str::FromStr;

const ACCEPTED_MARKER: &str = "accepted";
const REFUSED_MARKER: &str = "refused";

/// Reasons a line cannot be turned into a `LogRecord`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The layout points past the end of the token list.
    MissingToken {
        field: &'static str,
        offset: FieldOffset,
        token_count: usize,
    },
    /// A numeric field did not parse (or was not finite).
    InvalidNumber { field: &'static str, token: String },
    /// The object id is outside `0..max_objects`.
    ObjectOutOfRange { object_id: u64, max_objects: usize },
    /// Neither `accepted` nor `refused` appears on the line.
    MissingStatus,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingToken {
                field,
                offset,
                token_count,
            } => write!(f, "Missing {} token at offset {} (line has {} tokens)", field, offset, token_count),
            ParseError::InvalidNumber { field, token } => write!(f, "Invalid {} value: {:?}", field, token),
            ParseError::ObjectOutOfRange { object_id, max_objects } => {
                write!(f, "Object id {} outside 0..{}", object_id, max_objects)
            }
            ParseError::MissingStatus => write!(f, "No accepted/refused marker"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Layout-driven parser for movement log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordParser {
    layout: LineLayout,
    max_objects: usize,
}

impl RecordParser {
    pub fn new(layout: LineLayout, max_objects: usize) -> Self {
        Self { layout, max_objects }
    }

    pub fn layout(&self) -> &LineLayout {
        &self.layout
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    /// Tokenize and parse a raw line.
    ///
    /// `line_number` stands in for the step index when the layout has none.
    pub fn parse_line(&self, line: &str, line_number: u64) -> Result<LogRecord, ParseError> {
        let tokens = tokenize_line(line);
        self.parse_tokens(line, &tokens, line_number)
    }

    /// Parse an already tokenized line.
    ///
    /// # Parameters
    ///
    /// * `raw_line` - The untokenized line, searched for the outcome marker
    /// * `tokens` - Output of `tokenize_line` for `raw_line`
    /// * `line_number` - Fallback step index for layouts without a step counter
    ///
    /// # Returns
    ///
    /// The record, or the first `ParseError` hit. No recovery is attempted.
    ///
    /// # Log Line Format (V2)
    ///
    /// ```text
    /// object number :  4 ,obj_n_bad : 7, obj_n_good : 10, obj_dl_max ;= 5.000000, dx: 3.000000, dy: 4.000000, angle: 1.000000 n_step = 100 accepted
    /// ```
    pub fn parse_tokens<S: AsRef<str>>(&self, raw_line: &str, tokens: &[S], line_number: u64) -> Result<LogRecord, ParseError> {
        let layout = &self.layout;

        let object_id: u64 = extract_field(tokens, "object_id", layout.object_id)?;
        let object_id = usize::try_from(object_id)
            .ok()
            .filter(|id| *id < self.max_objects)
            .ok_or(ParseError::ObjectOutOfRange {
                object_id,
                max_objects: self.max_objects,
            })?;

        let accepted = if layout.status_marker { Some(parse_status(raw_line)?) } else { None };

        let n_bad = extract_field(tokens, "n_bad", layout.n_bad)?;
        let n_good = extract_field(tokens, "n_good", layout.n_good)?;
        let step_size_bound = extract_float(tokens, "step_size_bound", layout.step_size_bound)?;
        let dx = extract_float(tokens, "dx", layout.dx)?;
        let dy = extract_float(tokens, "dy", layout.dy)?;
        let rotation_angle = extract_float(tokens, "rotation_angle", layout.rotation_angle)?;
        let step_index = match layout.step_index {
            Some(offset) => extract_field(tokens, "step_index", offset)?,
            None => line_number,
        };

        Ok(LogRecord {
            object_id,
            step_index,
            accepted,
            n_good,
            n_bad,
            step_size_bound,
            dx,
            dy,
            rotation_angle,
        })
    }
}

/// Determine the move outcome from the literal markers.
fn parse_status(raw_line: &str) -> Result<bool, ParseError> {
    if raw_line.contains(ACCEPTED_MARKER) {
        Ok(true)
    } else if raw_line.contains(REFUSED_MARKER) {
        Ok(false)
    } else {
        Err(ParseError::MissingStatus)
    }
}

/// Locate a token and parse it after stripping trailing separators.
fn extract_field<S: AsRef<str>, T: FromStr>(tokens: &[S], field: &'static str, offset: FieldOffset) -> Result<T, ParseError> {
    let index = offset.resolve(tokens.len()).ok_or(ParseError::MissingToken {
        field,
        offset,
        token_count: tokens.len(),
    })?;
    let token = tokens[index].as_ref();

    strip_trailing_punctuation(token).parse().map_err(|_| ParseError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}

/// Like `extract_field`, rejecting `nan` and `inf`.
fn extract_float<S: AsRef<str>>(tokens: &[S], field: &'static str, offset: FieldOffset) -> Result<f64, ParseError> {
    let value: f64 = extract_field(tokens, field, offset)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidNumber {
            field,
            token: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::DEFAULT_MAX_OBJECTS;

    const V2_LINE: &str = "object number :  4 ,obj_n_bad : 7, obj_n_good : 10, obj_dl_max ;= 5.000000, dx: 3.000000, dy: 4.000000, angle: 1.000000 n_step = 100 accepted";

    fn v2_parser() -> RecordParser {
        RecordParser::new(LineLayout::V2, DEFAULT_MAX_OBJECTS)
    }

    #[test]
    fn test_parse_v2_line() {
        let record = v2_parser().parse_line(V2_LINE, 1).unwrap();
        assert_eq!(
            record,
            LogRecord {
                object_id: 4,
                step_index: 100,
                accepted: Some(true),
                n_good: 10,
                n_bad: 7,
                step_size_bound: 5.0,
                dx: 3.0,
                dy: 4.0,
                rotation_angle: 1.0,
            }
        );
    }

    #[test]
    fn test_parse_refused_and_negative_values() {
        let line = "object number :  13 ,obj_n_bad : 0, obj_n_good : 2, obj_dl_max ;= 0.250000, dx: -0.125000, dy: 0.000000, angle: -7.500000 n_step = 31 refused";
        let record = v2_parser().parse_line(line, 1).unwrap();
        assert_eq!(record.object_id, 13);
        assert_eq!(record.accepted, Some(false));
        assert_eq!(record.dx, -0.125);
        assert_eq!(record.rotation_angle, -7.5);
        assert_eq!(record.step_index, 31);
    }

    #[test]
    fn test_parse_v1_line_uses_line_number() {
        let line = "object number :  2 ,obj_n_bad : 3, obj_n_good : 4, obj_dl_max ;= 1.500000, dx: 0.500000, dy: 0.250000, angle: 3.000000";
        let parser = RecordParser::new(LineLayout::V1, DEFAULT_MAX_OBJECTS);
        let record = parser.parse_line(line, 42).unwrap();
        assert_eq!(record.object_id, 2);
        assert_eq!(record.step_index, 42);
        assert_eq!(record.accepted, None);
        assert_eq!(record.n_bad, 3);
        assert_eq!(record.n_good, 4);
        assert_eq!(record.step_size_bound, 1.5);
        assert_eq!(record.dx, 0.5);
        assert_eq!(record.dy, 0.25);
        assert_eq!(record.rotation_angle, 3.0);
    }

    #[test]
    fn test_object_out_of_range() {
        let line = V2_LINE.replace(":  4 ,", ":  14 ,");
        let result = v2_parser().parse_line(&line, 1);
        assert_eq!(
            result,
            Err(ParseError::ObjectOutOfRange {
                object_id: 14,
                max_objects: DEFAULT_MAX_OBJECTS
            })
        );
    }

    #[test]
    fn test_invalid_number() {
        let line = V2_LINE.replace("obj_n_good : 10,", "obj_n_good : ten,");
        if let Err(ParseError::InvalidNumber { field, token }) = v2_parser().parse_line(&line, 1) {
            assert_eq!(field, "n_good");
            assert_eq!(token, "ten,");
        } else {
            panic!("Expected InvalidNumber error");
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let line = V2_LINE.replace("angle: 1.000000", "angle: nan");
        assert!(matches!(
            v2_parser().parse_line(&line, 1),
            Err(ParseError::InvalidNumber { field: "rotation_angle", .. })
        ));
    }

    #[test]
    fn test_missing_token() {
        let result = v2_parser().parse_line("object number :  4 accepted", 1);
        assert!(matches!(result, Err(ParseError::MissingToken { .. })));
    }

    #[test]
    fn test_missing_status() {
        let line = V2_LINE.replace(" accepted", " pending");
        assert_eq!(v2_parser().parse_line(&line, 1), Err(ParseError::MissingStatus));
    }

    #[test]
    fn test_parse_unparseable_line() {
        assert!(v2_parser().parse_line("This is not a valid log line", 1).is_err());
        assert!(v2_parser().parse_line("", 1).is_err());
    }
}
