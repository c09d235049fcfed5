//! Report construction and rendering
//!
//! Consumes the final counters once the pass is done: one block per interval
//! in increasing order, then the overall block with grand totals, overall
//! throughput and the headline discrepancy. The text layout is fixed so
//! re-running on an unchanged file is byte-identical.

use crate::aggregate::{Aggregator, BucketCounters};
use crate::timestamp::format_epoch;
use crate::window::TimeWindow;
use serde::Serialize;
use std::fmt;

/// One interval block
#[derive(Debug, Clone, Serialize)]
pub struct IntervalReport {
    /// 1-based interval number
    pub index: usize,
    pub start: String,
    pub end: String,
    pub counters: BucketCounters,
    /// Accepted submissions minus lightweight submissions; the accepted
    /// total includes both categories, so the difference is the heavyweight
    /// share
    pub submitted_heavy: i64,
    /// Successful retrievals per minute over this interval
    pub throughput_per_min: f64,
}

/// Wall-clock shape of the analysis window
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub start: String,
    pub end: String,
    pub duration_seconds: i64,
    pub num_intervals: usize,
    pub interval_length_seconds: i64,
}

/// The complete analysis result
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub source: String,
    pub window: WindowSummary,
    pub intervals: Vec<IntervalReport>,
    pub totals: BucketCounters,
    pub submitted_heavy_total: i64,
    pub overall_throughput_per_min: f64,
    /// Lot entries minus successful retrievals (minus timeouts when they are
    /// counted). Near zero means the queue drains as fast as it fills.
    pub discrepancy: i64,
    #[serde(skip)]
    show_timeouts: bool,
}

fn submitted_heavy(counters: &BucketCounters) -> i64 {
    counters.accepted_jobs as i64 - counters.submitted_light as i64
}

impl AnalysisSummary {
    pub fn build(
        source: String,
        window: &TimeWindow,
        aggregator: &Aggregator,
        count_timeouts: bool,
    ) -> Self {
        let totals = aggregator.totals();

        let intervals = aggregator
            .buckets()
            .iter()
            .enumerate()
            .map(|(i, counters)| {
                let (start, end) = window.interval_bounds(i);
                IntervalReport {
                    index: i + 1,
                    start: format_epoch(start),
                    end: format_epoch(end),
                    counters: *counters,
                    submitted_heavy: submitted_heavy(counters),
                    throughput_per_min: counters.retrieved_ok as f64
                        / window.interval_length_seconds as f64
                        * 60.0,
                }
            })
            .collect();

        let mut discrepancy = totals.lot_entries as i64 - totals.retrieved_ok as i64;
        if count_timeouts {
            discrepancy -= totals.timeouts as i64;
        }

        Self {
            source,
            window: WindowSummary {
                start: format_epoch(window.start_epoch),
                end: format_epoch(window.end_epoch),
                duration_seconds: window.duration_seconds,
                num_intervals: window.num_intervals,
                interval_length_seconds: window.interval_length_seconds,
            },
            intervals,
            submitted_heavy_total: submitted_heavy(&totals),
            overall_throughput_per_min: totals.retrieved_ok as f64
                / window.duration_seconds as f64
                * 60.0,
            discrepancy,
            totals,
            show_timeouts: count_timeouts,
        }
    }

    fn write_counters(
        &self,
        f: &mut fmt::Formatter<'_>,
        counters: &BucketCounters,
        submitted_heavy: i64,
    ) -> fmt::Result {
        writeln!(f, "  {:<25}{}", "staged (heavyweight):", counters.staged_heavy)?;
        writeln!(f, "  {:<25}{}", "staged (lightweight):", counters.staged_light)?;
        writeln!(f, "  {:<25}{}", "parking lot entries:", counters.lot_entries)?;
        writeln!(f, "  {:<25}{}", "accepted submissions:", counters.accepted_jobs)?;
        writeln!(f, "  {:<25}{}", "submitted (lightweight):", counters.submitted_light)?;
        writeln!(f, "  {:<25}{}", "submitted (heavyweight):", submitted_heavy)?;
        writeln!(f, "  {:<25}{}", "retrieved jobs:", counters.retrieved_ok)?;
        writeln!(f, "  {:<25}{}", "empty polls:", counters.retrieved_empty)?;
        if self.show_timeouts {
            writeln!(f, "  {:<25}{}", "parking lot timeouts:", counters.timeouts)?;
        }
        Ok(())
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job lifecycle report for {}", self.source)?;
        writeln!(
            f,
            "Window: {} -> {} ({}s, {} intervals of {}s)",
            self.window.start,
            self.window.end,
            self.window.duration_seconds,
            self.window.num_intervals,
            self.window.interval_length_seconds
        )?;

        for interval in &self.intervals {
            writeln!(f)?;
            writeln!(
                f,
                "Interval {}: {} -> {}",
                interval.index, interval.start, interval.end
            )?;
            self.write_counters(f, &interval.counters, interval.submitted_heavy)?;
            writeln!(
                f,
                "  {:<25}{:.2} jobs/min",
                "throughput:", interval.throughput_per_min
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Overall")?;
        self.write_counters(f, &self.totals, self.submitted_heavy_total)?;
        writeln!(
            f,
            "  {:<25}{:.2} jobs/min",
            "throughput:", self.overall_throughput_per_min
        )?;
        writeln!(f, "  {:<25}{}", "discrepancy:", self.discrepancy)?;

        Ok(())
    }
}
