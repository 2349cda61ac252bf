//! Row partitioning shared by every scheduler.
//!
//! Given `W` workers and an image spanning rows `[min_y, max_y)`, each worker
//! gets a contiguous block of `height / W` rows and the last worker also takes
//! the remainder:
//!
//! ```text
//! height = 100, W = 3, chunk = 33
//!
//!   worker 0  [ 0, 33)
//!   worker 1  [33, 66)
//!   worker 2  [66,100)   <- absorbs the extra row
//! ```
//!
//! The rule is identical for all execution models, which is what makes their
//! output byte-identical. When `height < W` every worker but the last gets an
//! empty range.

use std::fmt;
use std::ops::Range;

/// A half-open range of image rows, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// Creates a new row range.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "row range start {} > end {}", start, end);
        Self { start, end }
    }

    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the range covers no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `row` falls inside the range.
    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.end
    }

    /// Iterates over the rows in the range.
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}

impl From<Range<usize>> for RowRange {
    fn from(r: Range<usize>) -> Self {
        RowRange::new(r.start, r.end)
    }
}

/// Returns the row range assigned to `worker` out of `workers`.
///
/// # Panics
///
/// Panics if `workers == 0` or `worker >= workers`. Configuration validation
/// rejects a zero worker count before any scheduler runs.
pub fn row_range_for(worker: usize, bounds: (usize, usize), workers: usize) -> RowRange {
    assert!(workers > 0, "worker count must be at least 1");
    assert!(
        worker < workers,
        "worker index {} out of range for {} workers",
        worker,
        workers
    );

    let (min_y, max_y) = bounds;
    let chunk = (max_y - min_y) / workers;
    let start = min_y + worker * chunk;
    let end = if worker + 1 == workers {
        max_y
    } else {
        start + chunk
    };
    RowRange::new(start, end)
}

/// Splits `[min_y, max_y)` into `workers` ascending, contiguous ranges.
pub fn partition_rows(bounds: (usize, usize), workers: usize) -> Vec<RowRange> {
    (0..workers)
        .map(|worker| row_range_for(worker, bounds, workers))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_height_100_three_workers() {
        let ranges = partition_rows((0, 100), 3);
        assert_eq!(
            ranges,
            vec![
                RowRange::new(0, 33),
                RowRange::new(33, 66),
                RowRange::new(66, 100)
            ]
        );
    }

    #[test]
    fn test_single_worker_gets_full_range() {
        assert_eq!(partition_rows((0, 57), 1), vec![RowRange::new(0, 57)]);
    }

    #[test]
    fn test_nonzero_min_y_is_respected() {
        let ranges = partition_rows((10, 20), 4);
        assert_eq!(
            ranges,
            vec![
                RowRange::new(10, 12),
                RowRange::new(12, 14),
                RowRange::new(14, 16),
                RowRange::new(16, 20)
            ]
        );
    }

    #[test]
    fn test_fewer_rows_than_workers() {
        let ranges = partition_rows((0, 2), 4);
        assert!(ranges[..3].iter().all(RowRange::is_empty));
        assert_eq!(ranges[3], RowRange::new(0, 2));
    }

    #[test]
    fn test_empty_image() {
        let ranges = partition_rows((0, 0), 3);
        assert!(ranges.iter().all(RowRange::is_empty));
    }

    #[test]
    #[should_panic(expected = "worker count must be at least 1")]
    fn test_zero_workers_panics() {
        row_range_for(0, (0, 10), 0);
    }

    #[test]
    fn test_row_range_helpers() {
        let r = RowRange::new(3, 7);
        assert_eq!(r.len(), 4);
        assert!(r.contains(3));
        assert!(!r.contains(7));
        assert_eq!(r.rows().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(r.to_string(), "[3,7)");
        assert_eq!(RowRange::from(1..2), RowRange::new(1, 2));
    }

    proptest! {
        #[test]
        fn prop_partition_covers_exactly_once(
            min_y in 0usize..1_000,
            height in 0usize..5_000,
            workers in 1usize..64,
        ) {
            let max_y = min_y + height;
            let ranges = partition_rows((min_y, max_y), workers);

            prop_assert_eq!(ranges.len(), workers);
            prop_assert_eq!(ranges.first().unwrap().start, min_y);
            prop_assert_eq!(ranges.last().unwrap().end, max_y);
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            let total: usize = ranges.iter().map(RowRange::len).sum();
            prop_assert_eq!(total, height);
        }

        #[test]
        fn prop_no_empty_ranges_when_height_at_least_workers(
            workers in 1usize..32,
            extra in 0usize..500,
        ) {
            let height = workers + extra;
            let ranges = partition_rows((0, height), workers);
            prop_assert!(ranges.iter().all(|r| !r.is_empty()));
        }

        #[test]
        fn prop_row_range_for_matches_partition(
            height in 0usize..2_000,
            workers in 1usize..16,
        ) {
            let ranges = partition_rows((0, height), workers);
            for (worker, range) in ranges.iter().enumerate() {
                prop_assert_eq!(*range, row_range_for(worker, (0, height), workers));
            }
        }
    }
}
