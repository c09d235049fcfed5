//! Analysis window and interval bucketing
//!
//! The window is fixed by the boundary scan before the main pass runs and is
//! read-only afterwards. Bucket math is pure: no I/O, no side effects.

/// The global analysis window derived from the first and last
/// canonical-format timestamps in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_epoch: i64,
    pub end_epoch: i64,
    /// Clamped to at least 1 so single-instant logs stay divisible
    pub duration_seconds: i64,
    pub num_intervals: usize,
    /// Floor of `duration / num_intervals`, clamped to at least 1
    pub interval_length_seconds: i64,
}

impl TimeWindow {
    /// `num_intervals` must be positive; the pipeline validates it before
    /// the boundary scan runs
    pub fn new(start_epoch: i64, end_epoch: i64, num_intervals: usize) -> Self {
        let duration_seconds = (end_epoch - start_epoch).max(1);
        let interval_length_seconds = (duration_seconds / num_intervals as i64).max(1);
        Self {
            start_epoch,
            end_epoch,
            duration_seconds,
            num_intervals,
            interval_length_seconds,
        }
    }

    /// Map an event timestamp to its interval index.
    ///
    /// Events at or past the theoretical window end land in the final
    /// bucket; events before the window start (possible because the
    /// boundary scan only consults the canonical format) land in the first.
    pub fn bucket_index(&self, epoch: i64) -> usize {
        let elapsed = (epoch - self.start_epoch).max(0);
        ((elapsed / self.interval_length_seconds) as usize).min(self.num_intervals - 1)
    }

    /// Wall-clock bounds of one interval. All but the last interval end at
    /// the theoretical boundary; the last ends at the true last-observed
    /// timestamp so the report never claims time past the log's actual end.
    pub fn interval_bounds(&self, index: usize) -> (i64, i64) {
        let start = self.start_epoch + index as i64 * self.interval_length_seconds;
        let end = if index + 1 == self.num_intervals {
            self.end_epoch
        } else {
            start + self.interval_length_seconds
        };
        (start, end)
    }
}
