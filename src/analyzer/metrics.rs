//! Per-object metric series derived from an `ObjectIndex`.
//!
//! Each metric is a transform of a single record, applied to the records that
//! pass the filter, in log order. Records the transform cannot evaluate are
//! counted and left out of the series.

use std::f64::consts::{PI, TAU};
use std::fmt;

use super::filter::FilterPolicy;
use super::object_index::ObjectIndex;
use super::types::{LogRecord, MetricKind, MetricSeries};

/// Reasons a record yields no metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricError {
    /// Acceptance ratio of an object that has not moved yet.
    DivisionUndefined { object_id: usize, step_index: u64 },
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricError::DivisionUndefined { object_id, step_index } => write!(
                f,
                "Acceptance ratio undefined for object {} at step {}: no moves yet",
                object_id, step_index
            ),
        }
    }
}

impl std::error::Error for MetricError {}

/// Reduce an angle in radians to `[0, 2π)` and express it in degrees, `[0, 360)`.
///
/// Logged angles accumulate over the run, so inputs may span many turns in either direction.
pub fn normalize_angle_degrees(angle: f64) -> f64 {
    let mut reduced = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if reduced >= TAU {
        reduced = 0.0;
    }
    let degrees = reduced * 180.0 / PI;
    if degrees >= 360.0 { 0.0 } else { degrees }
}

/// Length of the proposed translation.
pub fn translation_magnitude(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

/// `n_good / (n_good + n_bad)` for one record.
pub fn acceptance_ratio(record: &LogRecord) -> Result<f64, MetricError> {
    let total = record.move_count();
    if total == 0 {
        return Err(MetricError::DivisionUndefined {
            object_id: record.object_id,
            step_index: record.step_index,
        });
    }
    Ok(record.n_good as f64 / total as f64)
}

/// A metric series plus the records that had to be left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub kind: MetricKind,
    pub series: MetricSeries,
    /// Records that passed the filter but had no defined value.
    pub skipped: usize,
}

/// Computes metric series over a read-only index.
#[derive(Debug, Clone, Copy)]
pub struct MetricExtractor<'a> {
    index: &'a ObjectIndex,
    policy: Option<&'a FilterPolicy>,
}

impl<'a> MetricExtractor<'a> {
    pub fn new(index: &'a ObjectIndex, policy: &'a FilterPolicy) -> Self {
        Self {
            index,
            policy: Some(policy),
        }
    }

    /// Extractor that evaluates every record.
    pub fn unfiltered(index: &'a ObjectIndex) -> Self {
        Self { index, policy: None }
    }

    /// `dl_max` as logged.
    pub fn step_size_bound(&self) -> Extraction {
        self.collect(MetricKind::StepSizeBound, |record| Ok(record.step_size_bound))
    }

    /// Rotation angle in degrees, reduced to `[0, 360)`.
    pub fn rotation_degrees(&self) -> Extraction {
        self.collect(MetricKind::RotationDegrees, |record| Ok(normalize_angle_degrees(record.rotation_angle)))
    }

    /// Translation magnitude `sqrt(dx² + dy²)`.
    pub fn translation_magnitude(&self) -> Extraction {
        self.collect(MetricKind::TranslationMagnitude, |record| Ok(translation_magnitude(record.dx, record.dy)))
    }

    /// Acceptance ratio; records with no moves yet are skipped.
    pub fn acceptance_ratio(&self) -> Extraction {
        self.collect(MetricKind::AcceptanceRatio, acceptance_ratio)
    }

    /// Dispatch to the entry point for `kind`.
    pub fn extract(&self, kind: MetricKind) -> Extraction {
        match kind {
            MetricKind::StepSizeBound => self.step_size_bound(),
            MetricKind::RotationDegrees => self.rotation_degrees(),
            MetricKind::TranslationMagnitude => self.translation_magnitude(),
            MetricKind::AcceptanceRatio => self.acceptance_ratio(),
        }
    }

    fn collect<F>(&self, kind: MetricKind, transform: F) -> Extraction
    where
        F: Fn(&LogRecord) -> Result<f64, MetricError>,
    {
        let mut series = MetricSeries::with_objects(self.index.object_count());
        let mut skipped = 0;

        for (object_id, records) in self.index.iter() {
            for record in records {
                if let Some(policy) = self.policy {
                    if !policy.matches(record) {
                        continue;
                    }
                }
                match transform(record) {
                    Ok(value) => series.push(object_id, value),
                    Err(e) => {
                        log::debug!("{}", e);
                        skipped += 1;
                    }
                }
            }
        }

        if skipped > 0 {
            log::info!("{} extraction skipped {} records", kind, skipped);
        }

        Extraction { kind, series, skipped }
    }
}
