//! Type definitions specific to the analyzer module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object-count bound of the standard hard-disc scenes (ids 0-13).
pub const DEFAULT_MAX_OBJECTS: usize = 14;

/// One parsed movement log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub object_id: usize,
    /// Global move counter of the simulation when the line was written.
    pub step_index: u64,
    /// Move outcome; `None` when the log layout carries no outcome marker.
    pub accepted: Option<bool>,
    /// Accepted moves of this object so far.
    pub n_good: u64,
    /// Refused moves of this object so far.
    pub n_bad: u64,
    /// Adaptive maximum displacement (`dl_max`).
    pub step_size_bound: f64,
    pub dx: f64,
    pub dy: f64,
    /// Proposed rotation in radians, not reduced to a single turn.
    pub rotation_angle: f64,
}

impl LogRecord {
    /// Total moves attempted by the object when the line was written.
    pub fn move_count(&self) -> u64 {
        self.n_good.saturating_add(self.n_bad)
    }
}

/// Which moves a filter lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptanceFilter {
    #[default]
    Any,
    Accepted,
    Refused,
}

impl AcceptanceFilter {
    /// Whether a move with the given outcome passes. An unknown outcome only passes `Any`.
    pub fn admits(self, accepted: Option<bool>) -> bool {
        match self {
            AcceptanceFilter::Any => true,
            AcceptanceFilter::Accepted => accepted == Some(true),
            AcceptanceFilter::Refused => accepted == Some(false),
        }
    }
}

impl fmt::Display for AcceptanceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptanceFilter::Any => write!(f, "any"),
            AcceptanceFilter::Accepted => write!(f, "accepted"),
            AcceptanceFilter::Refused => write!(f, "refused"),
        }
    }
}

/// Derived per-object quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// `dl_max` as logged.
    StepSizeBound,
    /// Rotation reduced to one turn, in degrees.
    RotationDegrees,
    /// Length of the proposed translation.
    TranslationMagnitude,
    /// `n_good / (n_good + n_bad)`.
    AcceptanceRatio,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::StepSizeBound,
        MetricKind::RotationDegrees,
        MetricKind::TranslationMagnitude,
        MetricKind::AcceptanceRatio,
    ];

    /// Short name used in file names and command-line values.
    pub fn short_name(self) -> &'static str {
        match self {
            MetricKind::StepSizeBound => "step-size",
            MetricKind::RotationDegrees => "rotation",
            MetricKind::TranslationMagnitude => "translation",
            MetricKind::AcceptanceRatio => "acceptance",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Per-object metric values in log order.
///
/// Every object id below the bound it was created with has an entry, possibly empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSeries {
    values: Vec<Vec<f64>>,
}

impl MetricSeries {
    pub(crate) fn with_objects(object_count: usize) -> Self {
        Self {
            values: vec![Vec::new(); object_count],
        }
    }

    pub(crate) fn push(&mut self, object_id: usize, value: f64) {
        if let Some(series) = self.values.get_mut(object_id) {
            series.push(value);
        }
    }

    /// Number of object ids covered, including those with no values.
    pub fn object_count(&self) -> usize {
        self.values.len()
    }

    /// Values for one object, `None` if the id is outside the bound.
    pub fn get(&self, object_id: usize) -> Option<&[f64]> {
        self.values.get(object_id).map(Vec::as_slice)
    }

    /// Iterate `(object_id, values)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> {
        self.values.iter().enumerate().map(|(id, v)| (id, v.as_slice()))
    }

    /// Total number of values across all objects.
    pub fn total_len(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }

    /// True when no object has any value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_filter_admits() {
        assert!(AcceptanceFilter::Any.admits(Some(true)));
        assert!(AcceptanceFilter::Any.admits(Some(false)));
        assert!(AcceptanceFilter::Accepted.admits(Some(true)));
        assert!(!AcceptanceFilter::Accepted.admits(Some(false)));
        assert!(AcceptanceFilter::Refused.admits(Some(false)));
        assert!(!AcceptanceFilter::Refused.admits(Some(true)));
    }

    #[test]
    fn test_unknown_outcome_passes_only_any() {
        assert!(AcceptanceFilter::Any.admits(None));
        assert!(!AcceptanceFilter::Accepted.admits(None));
        assert!(!AcceptanceFilter::Refused.admits(None));
    }

    #[test]
    fn test_series_keeps_every_object() {
        let mut series = MetricSeries::with_objects(3);
        series.push(1, 2.5);
        series.push(7, 1.0);

        assert_eq!(series.object_count(), 3);
        assert_eq!(series.get(0), Some(&[][..]));
        assert_eq!(series.get(1), Some(&[2.5][..]));
        assert_eq!(series.get(7), None);
        assert_eq!(series.total_len(), 1);
        assert!(!series.is_empty());
    }
}
