//! Split a trajectory log into one configuration file per frame.
//!
//! Each frame is `n_objects + 3` lines: a frame marker, the box dimensions,
//! the object count and one line per object. The marker is dropped; the rest
//! is a configuration file the simulator can start from.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use super::SnapshotError;

/// Header lines around the object lines of a frame: marker, box, object count.
const FRAME_HEADER_LINES: usize = 3;

/// Lines of one frame, marker removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<String>,
}

/// Lines per frame for `n_objects` objects.
pub fn frame_len(n_objects: usize) -> Result<usize, SnapshotError> {
    n_objects
        .checked_add(FRAME_HEADER_LINES)
        .ok_or_else(|| SnapshotError::InvalidLayout(format!("{} objects do not fit in a frame", n_objects)))
}

/// Cut `lines` into complete frames; a trailing partial frame is dropped.
pub fn split_frames<S: AsRef<str>>(lines: &[S], n_objects: usize) -> Result<Vec<Frame>, SnapshotError> {
    let frame_len = frame_len(n_objects)?;
    Ok(lines
        .chunks_exact(frame_len)
        .map(|chunk| Frame {
            lines: chunk[1..].iter().map(|line| line.as_ref().to_string()).collect(),
        })
        .collect())
}

/// File name of the frame at `index`: `conf000.conf`, `conf001.conf`, ...
pub fn frame_file_name(index: usize) -> String {
    format!("conf{:03}.conf", index)
}

/// Write every frame into `dir`, creating it if needed.
///
/// # Returns
///
/// The written paths, in frame order.
pub fn write_frames(dir: &Path, frames: &[Frame]) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_file_name(index));
        let mut content = frame.lines.join("\n");
        content.push('\n');
        fs::write(&path, content).with_context(|| format!("Failed to write frame: {}", path.display()))?;
        written.push(path);
    }

    log::info!("Wrote {} frames to {}", written.len(), dir.display());
    Ok(written)
}
