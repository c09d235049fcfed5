//! Positional field access for whitespace-delimited request lines
//!
//! Access-log lines are mined by token position, not by grammar. Every
//! positional assumption lives in [`FieldLayout`] so a log-format variant is
//! a configuration edit rather than a code change.

use serde::{Deserialize, Serialize};

/// Token positions of the interesting fields on a request line.
///
/// The defaults match the combined log format:
/// `host - - [timestamp offset] "METHOD /path HTTP/1.1" status size`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Token holding the bracketed timestamp
    #[serde(default = "default_timestamp_token")]
    pub timestamp_token: usize,
    /// Token holding the request path
    #[serde(default = "default_path_token")]
    pub path_token: usize,
    /// Token holding the response status code
    #[serde(default = "default_status_token")]
    pub status_token: usize,
}

fn default_timestamp_token() -> usize {
    3
}

fn default_path_token() -> usize {
    6
}

fn default_status_token() -> usize {
    8
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            timestamp_token: default_timestamp_token(),
            path_token: default_path_token(),
            status_token: default_status_token(),
        }
    }
}

/// One line split on whitespace, with accessors for the layout positions
#[derive(Debug)]
pub struct Tokens<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    pub fn split(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace().collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// The trailing token, used for both the accepted-submission count and
    /// the response-size field
    pub fn last(&self) -> Option<&'a str> {
        self.tokens.last().copied()
    }

    pub fn path(&self, layout: &FieldLayout) -> Option<&'a str> {
        self.get(layout.path_token)
    }

    pub fn status(&self, layout: &FieldLayout) -> Option<u16> {
        self.get(layout.status_token)?.parse().ok()
    }

    pub fn timestamp_token(&self, layout: &FieldLayout) -> Option<&'a str> {
        self.get(layout.timestamp_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_LINE: &str =
        "10.0.0.9 - - [15/Jan/2024:10:30:08 +0000] \"POST /api/v1/jobs HTTP/1.1\" 202 5";

    #[test]
    fn test_default_layout_matches_combined_log_format() {
        let layout = FieldLayout::default();
        let tokens = Tokens::split(REQUEST_LINE);

        assert_eq!(tokens.timestamp_token(&layout), Some("[15/Jan/2024:10:30:08"));
        assert_eq!(tokens.path(&layout), Some("/api/v1/jobs"));
        assert_eq!(tokens.status(&layout), Some(202));
        assert_eq!(tokens.last(), Some("5"));
    }

    #[test]
    fn test_short_line_yields_none() {
        let layout = FieldLayout::default();
        let tokens = Tokens::split("only three tokens");

        assert_eq!(tokens.path(&layout), None);
        assert_eq!(tokens.status(&layout), None);
    }

    #[test]
    fn test_non_numeric_status_yields_none() {
        let layout = FieldLayout::default();
        let tokens =
            Tokens::split("10.0.0.9 - - [ts +0000] \"GET /api/v1/jobs HTTP/1.1\" abc -");
        assert_eq!(tokens.status(&layout), None);
    }

    #[test]
    fn test_empty_line() {
        let tokens = Tokens::split("");
        assert_eq!(tokens.last(), None);
        assert_eq!(tokens.get(0), None);
    }
}
