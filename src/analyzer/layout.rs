//! Token positions of the movement log fields, per simulator log version.
//!
//! The number of descriptive words at the start of a line changed between
//! simulator versions, so fields near the tail are addressed from the end of
//! the token list.

use serde::Deserialize;
use std::fmt;

/// Position of a token, counted from the start (`0` = first) or from the end (`1` = last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum FieldOffset {
    FromStart(usize),
    FromEnd(usize),
}

impl FieldOffset {
    /// Resolve to an index into a token list of length `len`.
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            FieldOffset::FromStart(index) => (index < len).then_some(index),
            FieldOffset::FromEnd(back) => {
                if back == 0 {
                    None
                } else {
                    len.checked_sub(back)
                }
            }
        }
    }
}

/// Signed notation: non-negative counts from the start, negative from the end (`-1` = last).
impl TryFrom<i64> for FieldOffset {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let magnitude = usize::try_from(value.unsigned_abs()).map_err(|_| format!("Token offset {} is too large", value))?;
        if value < 0 {
            Ok(FieldOffset::FromEnd(magnitude))
        } else {
            Ok(FieldOffset::FromStart(magnitude))
        }
    }
}

impl fmt::Display for FieldOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOffset::FromStart(index) => write!(f, "{}", index),
            FieldOffset::FromEnd(back) => write!(f, "-{}", back),
        }
    }
}

/// Where each field of a movement line sits in its token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LineLayout {
    pub object_id: FieldOffset,
    pub n_bad: FieldOffset,
    pub n_good: FieldOffset,
    pub step_size_bound: FieldOffset,
    pub dx: FieldOffset,
    pub dy: FieldOffset,
    pub rotation_angle: FieldOffset,
    /// `None` for logs without a step counter; the line position is used instead.
    #[serde(default)]
    pub step_index: Option<FieldOffset>,
    /// Whether lines end in an `accepted` / `refused` marker.
    #[serde(default = "default_status_marker")]
    pub status_marker: bool,
}

fn default_status_marker() -> bool {
    true
}

impl LineLayout {
    /// Current movement log, one line per proposed move:
    ///
    /// ```text
    /// object number :  4 ,obj_n_bad : 7, obj_n_good : 10, obj_dl_max ;= 5.000000, dx: 3.000000, dy: 4.000000, angle: 1.000000 n_step = 100 accepted
    /// ```
    pub const V2: LineLayout = LineLayout {
        object_id: FieldOffset::FromStart(3),
        n_bad: FieldOffset::FromStart(6),
        n_good: FieldOffset::FromStart(9),
        step_size_bound: FieldOffset::FromStart(12),
        dx: FieldOffset::FromEnd(9),
        dy: FieldOffset::FromEnd(7),
        rotation_angle: FieldOffset::FromEnd(5),
        step_index: Some(FieldOffset::FromEnd(2)),
        status_marker: true,
    };

    /// Plain movement log written outside debug runs. It has neither the step
    /// counter nor the outcome marker, so records carry no outcome.
    ///
    /// ```text
    /// object number :  4 ,obj_n_bad : 7, obj_n_good : 10, obj_dl_max ;= 5.000000, dx: 3.000000, dy: 4.000000, angle: 1.000000
    /// ```
    pub const V1: LineLayout = LineLayout {
        object_id: FieldOffset::FromStart(3),
        n_bad: FieldOffset::FromStart(6),
        n_good: FieldOffset::FromStart(9),
        step_size_bound: FieldOffset::FromStart(12),
        dx: FieldOffset::FromStart(14),
        dy: FieldOffset::FromStart(16),
        rotation_angle: FieldOffset::FromStart(18),
        step_index: None,
        status_marker: false,
    };

    /// Look up a preset by its version name (`v1`, `v2`).
    pub fn by_name(name: &str) -> Option<LineLayout> {
        match name.trim().to_ascii_lowercase().as_str() {
            "v1" => Some(LineLayout::V1),
            "v2" => Some(LineLayout::V2),
            _ => None,
        }
    }
}

impl Default for LineLayout {
    fn default() -> Self {
        LineLayout::V2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_offsets() {
        assert_eq!(FieldOffset::FromStart(0).resolve(3), Some(0));
        assert_eq!(FieldOffset::FromStart(3).resolve(3), None);
        assert_eq!(FieldOffset::FromEnd(1).resolve(3), Some(2));
        assert_eq!(FieldOffset::FromEnd(3).resolve(3), Some(0));
        assert_eq!(FieldOffset::FromEnd(4).resolve(3), None);
        assert_eq!(FieldOffset::FromEnd(0).resolve(3), None);
    }

    #[test]
    fn test_signed_notation() {
        assert_eq!(FieldOffset::try_from(4_i64), Ok(FieldOffset::FromStart(4)));
        assert_eq!(FieldOffset::try_from(-2_i64), Ok(FieldOffset::FromEnd(2)));
        assert_eq!(FieldOffset::FromEnd(9).to_string(), "-9");
    }

    #[test]
    fn test_by_name() {
        assert_eq!(LineLayout::by_name("V2"), Some(LineLayout::V2));
        assert_eq!(LineLayout::by_name("v1"), Some(LineLayout::V1));
        assert_eq!(LineLayout::by_name("v3"), None);
    }
}
