//! Surface-to-surface distance between the first two objects of every frame.

use super::SnapshotError;
use crate::analyzer::tokenizer::tokenize_line;

/// Frame geometry and disc radius for a two-object trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistanceReader {
    /// Lines per frame, header included.
    pub lines_per_frame: usize,
    /// Header lines at the start of each frame.
    pub header_lines: usize,
    /// Disc radius subtracted from both centers.
    pub radius: f64,
}

impl Default for PairDistanceReader {
    fn default() -> Self {
        Self {
            lines_per_frame: 5,
            header_lines: 3,
            radius: 1.0,
        }
    }
}

impl PairDistanceReader {
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let needed = self.header_lines.checked_add(2);
        if needed.is_none_or(|needed| needed > self.lines_per_frame) {
            return Err(SnapshotError::InvalidLayout(format!(
                "{} lines per frame cannot hold {} header lines and two objects",
                self.lines_per_frame, self.header_lines
            )));
        }
        Ok(())
    }

    /// One distance per complete frame, in frame order; a trailing partial frame is ignored.
    pub fn read_pair_distances<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<f64>, SnapshotError> {
        self.validate()?;

        let mut distances = Vec::with_capacity(lines.len() / self.lines_per_frame);
        for (frame_index, frame) in lines.chunks_exact(self.lines_per_frame).enumerate() {
            let first_line = frame_index * self.lines_per_frame + self.header_lines;
            let (x1, y1) = position(frame[self.header_lines].as_ref(), first_line + 1)?;
            let (x2, y2) = position(frame[self.header_lines + 1].as_ref(), first_line + 2)?;

            let center_distance = (x2 - x1).hypot(y2 - y1);
            distances.push(center_distance - 2.0 * self.radius);
        }

        log::debug!("Read {} pair distances", distances.len());
        Ok(distances)
    }
}

/// Parse the `x y` columns of a position line.
fn position(line: &str, line_number: usize) -> Result<(f64, f64), SnapshotError> {
    let tokens = tokenize_line(line);
    if tokens.len() < 3 {
        return Err(SnapshotError::MissingCoordinate { line_number });
    }
    let coordinate = |token: &String| {
        token.parse::<f64>().map_err(|_| SnapshotError::InvalidCoordinate {
            line_number,
            token: token.clone(),
        })
    };
    Ok((coordinate(&tokens[1])?, coordinate(&tokens[2])?))
}
