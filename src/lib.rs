//! lotmeter - Job-Lifecycle Log Analyzer
//!
//! A single-pass, time-bucketed log-mining tool that reconstructs a
//! job-processing funnel (staged, queued in the parking lot, retrieved or
//! submitted) from heterogeneous log lines and reports per-interval and
//! overall throughput plus a queue discrepancy figure.

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod report;
pub mod timestamp;
pub mod window;

pub use error::{LotmeterError, Result};
