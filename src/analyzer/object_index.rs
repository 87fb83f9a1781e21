//! Per-object grouping of parsed records.

use super::log_parser::ParseError;
use super::types::LogRecord;

/// Records grouped by object id, each bucket in log order.
///
/// Every id in `0..object_count` has a bucket, empty when the object never moved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectIndex {
    buckets: Vec<Vec<LogRecord>>,
}

impl ObjectIndex {
    /// Partition `records` by object id.
    ///
    /// # Returns
    ///
    /// The index, or `ParseError::ObjectOutOfRange` for the first record whose id is not below `max_objects`.
    pub fn build<I>(records: I, max_objects: usize) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = LogRecord>,
    {
        let mut buckets: Vec<Vec<LogRecord>> = vec![Vec::new(); max_objects];

        for record in records {
            let object_id = record.object_id;
            match buckets.get_mut(object_id) {
                Some(bucket) => bucket.push(record),
                None => {
                    return Err(ParseError::ObjectOutOfRange {
                        object_id: object_id as u64,
                        max_objects,
                    });
                }
            }
        }

        Ok(Self { buckets })
    }

    pub fn object_count(&self) -> usize {
        self.buckets.len()
    }

    /// Records of one object; empty for ids outside the bound.
    pub fn records(&self, object_id: usize) -> &[LogRecord] {
        self.buckets.get(object_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(object_id, records)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[LogRecord])> {
        self.buckets.iter().enumerate().map(|(id, bucket)| (id, bucket.as_slice()))
    }

    pub fn total_records(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(object_id: usize, step_index: u64) -> LogRecord {
        LogRecord {
            object_id,
            step_index,
            accepted: Some(true),
            n_good: 1,
            n_bad: 0,
            step_size_bound: 1.0,
            dx: 0.0,
            dy: 0.0,
            rotation_angle: 0.0,
        }
    }

    #[test]
    fn test_build_partitions_in_order() {
        let records = vec![record(2, 0), record(0, 1), record(2, 2), record(2, 3)];
        let index = ObjectIndex::build(records, 4).unwrap();

        assert_eq!(index.object_count(), 4);
        assert_eq!(index.total_records(), 4);
        let steps: Vec<u64> = index.records(2).iter().map(|r| r.step_index).collect();
        assert_eq!(steps, vec![0, 2, 3]);
        assert_eq!(index.records(0).len(), 1);
        assert!(index.records(1).is_empty());
        assert!(index.records(3).is_empty());
        assert!(index.records(99).is_empty());
    }

    #[test]
    fn test_every_bucket_present() {
        let index = ObjectIndex::build(Vec::new(), 14).unwrap();
        assert_eq!(index.iter().count(), 14);
        assert!(index.iter().all(|(_, records)| records.is_empty()));
    }

    #[test]
    fn test_rejects_out_of_range_id() {
        let result = ObjectIndex::build(vec![record(0, 0), record(5, 1)], 5);
        assert_eq!(
            result,
            Err(ParseError::ObjectOutOfRange {
                object_id: 5,
                max_objects: 5
            })
        );
    }
}
