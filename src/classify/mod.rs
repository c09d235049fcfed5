//! Line classification for the job-processing funnel
//!
//! Each line gets at most one event: classification is priority-ordered and
//! the first matching rule wins. Lines that fail both timestamp formats are
//! dropped before the rules run. Retrieval polls are resolved by a
//! selectable policy because historical log variants disagree on whether the
//! status code or the trailing response-size field distinguishes a delivered
//! job from an empty poll.

use crate::error::{LotmeterError, Result};
use crate::fields::{FieldLayout, Tokens};
use crate::timestamp::TimestampParser;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Runtime footprint of a staged job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobWeight {
    /// Needs a dedicated script/browser runtime, routed through the parking lot
    Heavy,
    /// Simple job submitted straight to a processor
    Light,
}

/// Outcome of one runtime poll against the parking lot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// The poll came back with a job
    Job,
    /// The poll came back empty
    Empty,
}

/// The closed event vocabulary of the funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Staged(JobWeight),
    LotEntry,
    LightweightSubmitted,
    /// Carries the trailing count field: one submission request can accept
    /// several jobs at once
    AcceptedSubmission(u64),
    Retrieved(RetrievalOutcome),
    Timeout,
    Unrecognized,
}

impl Event {
    /// Stable label for tracing and the aggregate outcome tally
    pub fn label(&self) -> &'static str {
        match self {
            Event::Staged(JobWeight::Heavy) => "staged-heavyweight",
            Event::Staged(JobWeight::Light) => "staged-lightweight",
            Event::LotEntry => "lot-entry",
            Event::LightweightSubmitted => "submitted-lightweight",
            Event::AcceptedSubmission(_) => "accepted-submission",
            Event::Retrieved(RetrievalOutcome::Job) => "retrieved-job",
            Event::Retrieved(RetrievalOutcome::Empty) => "retrieved-empty",
            Event::Timeout => "timeout",
            Event::Unrecognized => "unrecognized",
        }
    }
}

/// A classified line: where it sits in time and what it means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub epoch: i64,
    pub event: Event,
}

/// How retrieval polls are told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalPolicy {
    /// 200 delivered a job, 204 was an empty poll, anything else is ignored
    StatusCode,
    /// Historical variant: a trailing response size above zero delivered a
    /// job, `0` or `-` was an empty poll
    ResponseSize,
}

impl RetrievalPolicy {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "status-code" => Ok(Self::StatusCode),
            "response-size" => Ok(Self::ResponseSize),
            other => Err(LotmeterError::UnknownPolicy {
                name: other.to_string(),
            }),
        }
    }
}

/// Retrieval configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// "status-code" or "response-size"
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Count parking-lot timeouts and subtract them from the discrepancy
    #[serde(default)]
    pub count_timeouts: bool,
    /// Pattern marking a job that timed out waiting in the lot
    #[serde(default = "default_timeout_pattern")]
    pub timeout_pattern: String,
}

fn default_policy() -> String {
    "status-code".to_string()
}

fn default_timeout_pattern() -> String {
    "timed out in the parking lot".to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            count_timeouts: false,
            timeout_pattern: default_timeout_pattern(),
        }
    }
}

/// Endpoint configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Path token of the job submission request
    #[serde(default = "default_submission")]
    pub submission: String,
    /// Path suffixes of the runtime retrieval polls
    #[serde(default = "default_runtime_suffixes")]
    pub runtime_suffixes: Vec<String>,
}

fn default_submission() -> String {
    "/api/v1/jobs".to_string()
}

fn default_runtime_suffixes() -> Vec<String> {
    vec!["/runtime/browser".to_string(), "/runtime/api".to_string()]
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            submission: default_submission(),
            runtime_suffixes: default_runtime_suffixes(),
        }
    }
}

/// Type tokens of jobs that need a dedicated runtime
const HEAVY_TYPE_TOKENS: [&str; 3] = ["SCRIPT_BROWSER", "SCRIPT_API", "BROWSER"];

/// Type token of jobs that bypass the parking lot
const LIGHT_TYPE_TOKEN: &str = "SIMPLE";

const STAGED_MARKER: &str = "staged for execution";
const LIGHT_SUBMIT_MARKER: &str = "(SIMPLE) to Processor";

const ACCEPTED_STATUS: u16 = 202;
const RETRIEVED_STATUS: u16 = 200;
const EMPTY_POLL_STATUS: u16 = 204;

/// Priority-ordered line classifier with pre-compiled patterns
#[derive(Debug)]
pub struct Classifier {
    parser: TimestampParser,
    layout: FieldLayout,
    endpoints: EndpointsConfig,
    policy: RetrievalPolicy,
    count_timeouts: bool,
    lot_entry: Regex,
    timeout: Regex,
}

impl Classifier {
    pub fn new(
        layout: FieldLayout,
        endpoints: EndpointsConfig,
        retrieval: &RetrievalConfig,
    ) -> Result<Self> {
        let policy = RetrievalPolicy::parse(&retrieval.policy)?;
        let lot_entry = Regex::new(r"Putting job \S+ into the parking lot")
            .map_err(|e| LotmeterError::Config(format!("Invalid lot-entry pattern: {e}")))?;
        let timeout = Regex::new(&retrieval.timeout_pattern).map_err(|e| {
            LotmeterError::Config(format!(
                "Invalid timeout pattern '{}': {e}",
                retrieval.timeout_pattern
            ))
        })?;

        Ok(Self {
            parser: TimestampParser::new()?,
            layout,
            endpoints,
            policy,
            count_timeouts: retrieval.count_timeouts,
            lot_entry,
            timeout,
        })
    }

    /// Classify one line.
    ///
    /// Returns None when the line matches neither timestamp format;
    /// otherwise the event is at worst [`Event::Unrecognized`].
    pub fn classify(&self, line: &str) -> Option<Classified> {
        let tokens = Tokens::split(line);
        let epoch = self.parser.canonical_epoch(line).or_else(|| {
            tokens
                .timestamp_token(&self.layout)
                .and_then(TimestampParser::bracketed_epoch)
        })?;

        Some(Classified {
            epoch,
            event: self.match_rules(line, &tokens),
        })
    }

    fn match_rules(&self, line: &str, tokens: &Tokens<'_>) -> Event {
        // Rules 1-2: staging, heavyweight types outrank SIMPLE
        if line.contains(STAGED_MARKER) {
            if HEAVY_TYPE_TOKENS.iter().any(|t| line.contains(t)) {
                return Event::Staged(JobWeight::Heavy);
            }
            if line.contains(LIGHT_TYPE_TOKEN) {
                return Event::Staged(JobWeight::Light);
            }
        }

        // Rule 3: a heavyweight job entered the parking lot
        if self.lot_entry.is_match(line) {
            return Event::LotEntry;
        }

        // Rule 4: a simple job went straight to a processor
        if line.contains(LIGHT_SUBMIT_MARKER) {
            return Event::LightweightSubmitted;
        }

        if let Some(path) = tokens.path(&self.layout) {
            // Rule 5: accepted submission request; the trailing field is a
            // job count, malformed counts contribute zero
            if path == self.endpoints.submission
                && tokens.status(&self.layout) == Some(ACCEPTED_STATUS)
            {
                let count = tokens.last().and_then(|t| t.parse().ok()).unwrap_or(0);
                return Event::AcceptedSubmission(count);
            }

            // Rule 6: runtime retrieval poll, resolved by policy
            if self
                .endpoints
                .runtime_suffixes
                .iter()
                .any(|s| path.ends_with(s.as_str()))
            {
                if let Some(outcome) = self.poll_outcome(tokens) {
                    return Event::Retrieved(outcome);
                }
            }
        }

        // Rule 7: parking-lot timeout, only when the policy counts them
        if self.count_timeouts && self.timeout.is_match(line) {
            return Event::Timeout;
        }

        Event::Unrecognized
    }

    fn poll_outcome(&self, tokens: &Tokens<'_>) -> Option<RetrievalOutcome> {
        match self.policy {
            RetrievalPolicy::StatusCode => match tokens.status(&self.layout) {
                Some(RETRIEVED_STATUS) => Some(RetrievalOutcome::Job),
                Some(EMPTY_POLL_STATUS) => Some(RetrievalOutcome::Empty),
                _ => None,
            },
            RetrievalPolicy::ResponseSize => match tokens.last() {
                Some("-") => Some(RetrievalOutcome::Empty),
                Some(raw) => match raw.parse::<u64>() {
                    Ok(0) => Some(RetrievalOutcome::Empty),
                    Ok(_) => Some(RetrievalOutcome::Job),
                    Err(_) => None,
                },
                None => None,
            },
        }
    }
}
