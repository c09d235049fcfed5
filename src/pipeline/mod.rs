//! Analysis orchestration
//!
//! Two sequential streaming passes over the file: the boundary scan fixes
//! the analysis window from the first and last canonical-format timestamps,
//! then the main pass classifies, buckets and aggregates every line in file
//! order. The window is fully resolved before any bucket index is computed.
//! Memory stays bounded by `num_intervals x event_types` regardless of file
//! size.

use crate::aggregate::Aggregator;
use crate::classify::{Classifier, EndpointsConfig, Event, RetrievalConfig};
use crate::error::{LotmeterError, Result};
use crate::fields::FieldLayout;
use crate::report::AnalysisSummary;
use crate::timestamp::TimestampParser;
use crate::window::TimeWindow;
use ahash::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Everything one analysis run needs, resolved from config and CLI flags
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub path: PathBuf,
    pub intervals: usize,
    pub layout: FieldLayout,
    pub endpoints: EndpointsConfig,
    pub retrieval: RetrievalConfig,
}

/// Aggregate tally of per-line outcomes, the only place skipped lines are
/// visible. Logged at debug level, never part of the primary report.
#[derive(Debug, Default)]
pub struct PassStats {
    pub lines_read: u64,
    pub no_timestamp: u64,
    pub events: HashMap<&'static str, u64>,
}

/// Stream a file line by line. Lines are converted lossily so a stray
/// non-UTF-8 line is just another line that fails both timestamp formats.
fn for_each_line<F>(path: &Path, mut handle: F) -> Result<()>
where
    F: FnMut(&str),
{
    let file = File::open(path).map_err(|e| LotmeterError::Io {
        source: e,
        context: format!("Failed to open log file: {}", path.display()),
    })?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| LotmeterError::Io {
            source: e,
            context: format!("Failed to read log file: {}", path.display()),
        })?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        handle(line.trim_end_matches(&['\r', '\n'][..]));
    }

    Ok(())
}

/// Boundary scan: epoch seconds of the first and last canonical-format
/// lines, in file order. Only the canonical format is consulted here, even
/// though the main pass also classifies bracketed-format lines.
pub fn establish_window(
    path: &Path,
    intervals: usize,
    parser: &TimestampParser,
) -> Result<TimeWindow> {
    if intervals == 0 {
        return Err(LotmeterError::InvalidIntervalCount { value: intervals });
    }

    let mut first = None;
    let mut last = None;
    for_each_line(path, |line| {
        if let Some(epoch) = parser.canonical_epoch(line) {
            if first.is_none() {
                first = Some(epoch);
            }
            last = Some(epoch);
        }
    })?;

    match (first, last) {
        (Some(start), Some(end)) => Ok(TimeWindow::new(start, end, intervals)),
        _ => Err(LotmeterError::NoCanonicalTimestamp {
            path: path.to_path_buf(),
        }),
    }
}

/// Run the full analysis: boundary scan, main pass, summary construction
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisSummary> {
    let parser = TimestampParser::new()?;
    let window = establish_window(&request.path, request.intervals, &parser)?;
    tracing::debug!(
        start = window.start_epoch,
        end = window.end_epoch,
        interval_length = window.interval_length_seconds,
        "analysis window established"
    );

    let classifier = Classifier::new(
        request.layout,
        request.endpoints.clone(),
        &request.retrieval,
    )?;
    let mut aggregator = Aggregator::new(window.num_intervals);
    let mut stats = PassStats::default();

    for_each_line(&request.path, |line| {
        stats.lines_read += 1;
        let line_no = stats.lines_read;

        match classifier.classify(line) {
            None => {
                stats.no_timestamp += 1;
                tracing::trace!(line = line_no, "skipped: no parseable timestamp");
            }
            Some(classified) => {
                *stats.events.entry(classified.event.label()).or_insert(0) += 1;
                match classified.event {
                    Event::Unrecognized => {
                        tracing::trace!(line = line_no, "skipped: no matching rule");
                    }
                    event => {
                        let bucket = window.bucket_index(classified.epoch);
                        tracing::trace!(
                            line = line_no,
                            bucket,
                            event = event.label(),
                            "classified"
                        );
                        aggregator.record(bucket, event);
                    }
                }
            }
        }
    })?;

    log_stats(&stats);

    Ok(AnalysisSummary::build(
        request.path.display().to_string(),
        &window,
        &aggregator,
        request.retrieval.count_timeouts,
    ))
}

fn log_stats(stats: &PassStats) {
    tracing::debug!(
        lines = stats.lines_read,
        no_timestamp = stats.no_timestamp,
        "main pass complete"
    );
    let mut tally: Vec<_> = stats.events.iter().map(|(l, c)| (*l, *c)).collect();
    tally.sort_by_key(|(label, _)| *label);
    for (label, count) in tally {
        tracing::debug!(event = label, count, "event tally");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_log(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_window_from_first_and_last_canonical_lines() {
        let file = write_log(&[
            "noise without a timestamp",
            "2024-01-15 10:30:00,000{w} INFO first",
            "10.0.0.9 - - [15/Jan/2024:10:40:00 +0000] \"GET /x HTTP/1.1\" 200 1",
            "2024-01-15 10:35:00,000{w} INFO last",
        ]);

        let parser = TimestampParser::new().unwrap();
        let window = establish_window(file.path(), 5, &parser).unwrap();
        assert_eq!(window.duration_seconds, 300);
        assert_eq!(window.interval_length_seconds, 60);
    }

    #[test]
    fn test_no_canonical_timestamp_is_fatal() {
        let file = write_log(&[
            "10.0.0.9 - - [15/Jan/2024:10:40:00 +0000] \"GET /x HTTP/1.1\" 200 1",
            "plain noise",
        ]);

        let parser = TimestampParser::new().unwrap();
        let result = establish_window(file.path(), 5, &parser);
        assert!(matches!(
            result,
            Err(LotmeterError::NoCanonicalTimestamp { .. })
        ));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let file = write_log(&["2024-01-15 10:30:00,000{w} INFO first"]);
        let parser = TimestampParser::new().unwrap();
        let result = establish_window(file.path(), 0, &parser);
        assert!(matches!(
            result,
            Err(LotmeterError::InvalidIntervalCount { value: 0 })
        ));
    }

    #[test]
    fn test_missing_file_reports_io_context() {
        let parser = TimestampParser::new().unwrap();
        let result = establish_window(Path::new("/nonexistent/job.log"), 5, &parser);
        match result {
            Err(LotmeterError::Io { context, .. }) => {
                assert!(context.contains("/nonexistent/job.log"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_events_attributed_in_file_order_across_formats() {
        let file = write_log(&[
            "2024-01-15 10:30:00,000{w} INFO Putting job j-1 into the parking lot",
            "10.0.0.9 - - [15/Jan/2024:10:30:30 +0000] \"GET /api/v1/runtime/api HTTP/1.1\" 200 10",
            // out of time order on purpose: the model assumes nothing about sortedness
            "10.0.0.9 - - [15/Jan/2024:10:30:05 +0000] \"GET /api/v1/runtime/api HTTP/1.1\" 204 0",
            "2024-01-15 10:31:00,000{w} INFO Putting job j-2 into the parking lot",
        ]);

        let request = AnalysisRequest {
            path: file.path().to_path_buf(),
            intervals: 2,
            layout: FieldLayout::default(),
            endpoints: EndpointsConfig::default(),
            retrieval: RetrievalConfig::default(),
        };
        let summary = analyze(&request).unwrap();

        // 60s window, two 30s intervals; the 10:30:30 poll lands in the
        // second interval, the 10:30:05 poll in the first
        assert_eq!(summary.intervals[0].counters.retrieved_empty, 1);
        assert_eq!(summary.intervals[1].counters.retrieved_ok, 1);
        assert_eq!(summary.totals.lot_entries, 2);
        assert_eq!(summary.discrepancy, 1);
    }
}
