//! Readers for the simulator's trajectory snapshot logs.
//!
//! A trajectory log is a sequence of fixed-size frames, each a short header
//! followed by one position line per object (`<kind> <x> <y> ...`).

pub mod distance;
pub mod frames;

use anyhow::Context;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use distance::PairDistanceReader;
pub use frames::{Frame, frame_len, split_frames, write_frames};

/// Error type for malformed snapshot logs.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// The frame geometry is impossible for the requested objects.
    InvalidLayout(String),
    /// A position line has fewer than three tokens.
    MissingCoordinate { line_number: usize },
    /// A coordinate token is not a number.
    InvalidCoordinate { line_number: usize, token: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::InvalidLayout(msg) => write!(f, "Invalid frame layout: {}", msg),
            SnapshotError::MissingCoordinate { line_number } => {
                write!(f, "Line {}: expected `<kind> <x> <y>`", line_number)
            }
            SnapshotError::InvalidCoordinate { line_number, token } => {
                write!(f, "Line {}: invalid coordinate {:?}", line_number, token)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Read every line of a snapshot log, empty lines included; frames are positional.
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open snapshot log: {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read snapshot log: {}", path.display()))
}
