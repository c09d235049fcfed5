//! Per-interval event accumulation
//!
//! One integer counter per (interval, event type). Counters are mutated in
//! strict file order during the single main pass; grand totals are summed
//! from the buckets when the report is built.

use crate::classify::{Event, JobWeight, RetrievalOutcome};
use serde::Serialize;

/// Counters for one interval. `accepted_jobs` accumulates the summed count
/// field of accepted submissions, not a unit per line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounters {
    pub staged_heavy: u64,
    pub staged_light: u64,
    pub lot_entries: u64,
    pub accepted_jobs: u64,
    pub submitted_light: u64,
    pub retrieved_ok: u64,
    pub retrieved_empty: u64,
    pub timeouts: u64,
}

impl BucketCounters {
    pub fn record(&mut self, event: Event) {
        match event {
            Event::Staged(JobWeight::Heavy) => self.staged_heavy += 1,
            Event::Staged(JobWeight::Light) => self.staged_light += 1,
            Event::LotEntry => self.lot_entries += 1,
            Event::AcceptedSubmission(count) => self.accepted_jobs += count,
            Event::LightweightSubmitted => self.submitted_light += 1,
            Event::Retrieved(RetrievalOutcome::Job) => self.retrieved_ok += 1,
            Event::Retrieved(RetrievalOutcome::Empty) => self.retrieved_empty += 1,
            Event::Timeout => self.timeouts += 1,
            Event::Unrecognized => {}
        }
    }

    pub fn add(&mut self, other: &BucketCounters) {
        self.staged_heavy += other.staged_heavy;
        self.staged_light += other.staged_light;
        self.lot_entries += other.lot_entries;
        self.accepted_jobs += other.accepted_jobs;
        self.submitted_light += other.submitted_light;
        self.retrieved_ok += other.retrieved_ok;
        self.retrieved_empty += other.retrieved_empty;
        self.timeouts += other.timeouts;
    }
}

/// Accumulates classified events into their interval buckets
#[derive(Debug)]
pub struct Aggregator {
    buckets: Vec<BucketCounters>,
}

impl Aggregator {
    pub fn new(num_intervals: usize) -> Self {
        Self {
            buckets: vec![BucketCounters::default(); num_intervals],
        }
    }

    pub fn record(&mut self, bucket: usize, event: Event) {
        self.buckets[bucket].record(event);
    }

    pub fn buckets(&self) -> &[BucketCounters] {
        &self.buckets
    }

    pub fn totals(&self) -> BucketCounters {
        let mut totals = BucketCounters::default();
        for bucket in &self.buckets {
            totals.add(bucket);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_events_increment_their_counter() {
        let mut counters = BucketCounters::default();
        counters.record(Event::LotEntry);
        counters.record(Event::LotEntry);
        counters.record(Event::Retrieved(RetrievalOutcome::Job));
        counters.record(Event::Retrieved(RetrievalOutcome::Empty));

        assert_eq!(counters.lot_entries, 2);
        assert_eq!(counters.retrieved_ok, 1);
        assert_eq!(counters.retrieved_empty, 1);
    }

    #[test]
    fn test_accepted_submission_sums_its_count_field() {
        let mut counters = BucketCounters::default();
        counters.record(Event::AcceptedSubmission(5));
        counters.record(Event::AcceptedSubmission(3));
        counters.record(Event::AcceptedSubmission(0));

        assert_eq!(counters.accepted_jobs, 8);
    }

    #[test]
    fn test_unrecognized_counts_nothing() {
        let mut counters = BucketCounters::default();
        counters.record(Event::Unrecognized);
        assert_eq!(counters, BucketCounters::default());
    }

    #[test]
    fn test_totals_conserve_bucket_sums() {
        let mut agg = Aggregator::new(3);
        agg.record(0, Event::LotEntry);
        agg.record(2, Event::LotEntry);
        agg.record(1, Event::Staged(JobWeight::Heavy));
        agg.record(2, Event::AcceptedSubmission(4));

        let totals = agg.totals();
        assert_eq!(totals.lot_entries, 2);
        assert_eq!(totals.staged_heavy, 1);
        assert_eq!(totals.accepted_jobs, 4);

        let recomputed: u64 = agg.buckets().iter().map(|b| b.lot_entries).sum();
        assert_eq!(recomputed, totals.lot_entries);
    }
}
