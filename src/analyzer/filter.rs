//! Record selection by step window, move outcome and move count.

use serde::{Deserialize, Serialize};

use super::types::{AcceptanceFilter, LogRecord};

/// Compound record filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct FilterPolicy {
    /// First step kept (inclusive).
    pub step_start: u64,
    /// Last step kept (inclusive).
    pub step_end: u64,
    #[serde(rename = "acceptance")]
    pub acceptance_filter: AcceptanceFilter,
    /// Records need strictly more than this many moves (`n_good + n_bad`).
    pub min_move_count: u64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            step_start: 0,
            step_end: u64::MAX,
            acceptance_filter: AcceptanceFilter::Any,
            min_move_count: 0,
        }
    }
}

impl FilterPolicy {
    pub fn new(step_start: u64, step_end: u64, acceptance_filter: AcceptanceFilter, min_move_count: u64) -> Self {
        Self {
            step_start,
            step_end,
            acceptance_filter,
            min_move_count,
        }
    }

    pub fn in_step_range(&self, record: &LogRecord) -> bool {
        self.step_start <= record.step_index && record.step_index <= self.step_end
    }

    pub fn admits_status(&self, record: &LogRecord) -> bool {
        self.acceptance_filter.admits(record.accepted)
    }

    pub fn exceeds_move_count(&self, record: &LogRecord) -> bool {
        record.move_count() > self.min_move_count
    }

    /// True iff the record passes all three conditions.
    pub fn matches(&self, record: &LogRecord) -> bool {
        let in_range = self.in_step_range(record);
        let status = self.admits_status(record);
        let moves = self.exceeds_move_count(record);
        in_range && status && moves
    }

    /// An inverted step window matches nothing.
    pub fn is_empty_range(&self) -> bool {
        self.step_start > self.step_end
    }
}
