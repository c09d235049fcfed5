//! Timestamp parsing for the two supported log line formats
//!
//! The service log stamps lines with a canonical
//! `YYYY-MM-DD HH:MM:SS,mmm{` prefix (millisecond precision, thread name in
//! braces). Access-log lines carry a bracketed `[DD/Mon/YYYY:HH:MM:SS ...]`
//! timestamp at a fixed token position instead. Both are read as naive
//! wall-clock times from the same host clock; the bracketed offset token is
//! not applied.

use crate::error::{LotmeterError, Result};
use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

/// chrono format string for the canonical prefix (milliseconds excluded,
/// they never shift a line across a one-second bucket boundary)
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// chrono format string for the bracketed access-log token
pub const BRACKETED_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// Parses line timestamps in both supported formats
#[derive(Debug, Clone)]
pub struct TimestampParser {
    canonical: Regex,
}

impl TimestampParser {
    pub fn new() -> Result<Self> {
        let canonical = Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}),\d{3}\{")
            .map_err(|e| LotmeterError::Config(format!("Invalid canonical timestamp regex: {e}")))?;
        Ok(Self { canonical })
    }

    /// Epoch seconds of a canonical-format line, or None if the line does
    /// not start with the canonical prefix
    pub fn canonical_epoch(&self, line: &str) -> Option<i64> {
        let caps = self.canonical.captures(line)?;
        NaiveDateTime::parse_from_str(&caps[1], CANONICAL_FORMAT)
            .ok()
            .map(|dt| dt.and_utc().timestamp())
    }

    /// Epoch seconds of a bracketed access-log token such as
    /// `[15/Jan/2024:10:30:05`. The closing bracket and the timezone offset
    /// live in neighbouring tokens and are not consulted.
    pub fn bracketed_epoch(token: &str) -> Option<i64> {
        let raw = token.strip_prefix('[')?.trim_end_matches(']');
        NaiveDateTime::parse_from_str(raw, BRACKETED_FORMAT)
            .ok()
            .map(|dt| dt.and_utc().timestamp())
    }
}

/// Render epoch seconds back to the wall clock for the report
pub fn format_epoch(epoch: i64) -> String {
    match DateTime::from_timestamp(epoch, 0) {
        Some(dt) => dt.naive_utc().format(CANONICAL_FORMAT).to_string(),
        None => format!("@{epoch}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_epoch() {
        let parser = TimestampParser::new().unwrap();
        let epoch = parser
            .canonical_epoch("2024-01-15 10:30:05,123{worker-1} INFO staged for execution")
            .unwrap();
        assert_eq!(format_epoch(epoch), "2024-01-15 10:30:05");
    }

    #[test]
    fn test_canonical_requires_brace_after_millis() {
        let parser = TimestampParser::new().unwrap();
        assert!(parser
            .canonical_epoch("2024-01-15 10:30:05,123 INFO no brace")
            .is_none());
        assert!(parser
            .canonical_epoch("2024-01-15 10:30:05{worker} missing millis")
            .is_none());
    }

    #[test]
    fn test_canonical_must_anchor_at_line_start() {
        let parser = TimestampParser::new().unwrap();
        assert!(parser
            .canonical_epoch("prefix 2024-01-15 10:30:05,123{worker}")
            .is_none());
    }

    #[test]
    fn test_bracketed_epoch() {
        let epoch = TimestampParser::bracketed_epoch("[15/Jan/2024:10:30:05").unwrap();
        assert_eq!(format_epoch(epoch), "2024-01-15 10:30:05");
    }

    #[test]
    fn test_bracketed_rejects_plain_token() {
        assert!(TimestampParser::bracketed_epoch("15/Jan/2024:10:30:05").is_none());
        assert!(TimestampParser::bracketed_epoch("[not-a-date").is_none());
    }

    #[test]
    fn test_both_formats_agree_on_the_same_instant() {
        let parser = TimestampParser::new().unwrap();
        let canonical = parser
            .canonical_epoch("2024-01-15 10:30:05,000{main} INFO")
            .unwrap();
        let bracketed = TimestampParser::bracketed_epoch("[15/Jan/2024:10:30:05").unwrap();
        assert_eq!(canonical, bracketed);
    }
}
