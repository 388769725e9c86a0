//! Core data models for reading log resources

use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The end of the resource lines are taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadDirection {
    /// First matching lines, like `head -n`
    Head,
    /// Last matching lines, like `tail -n`
    #[default]
    Tail,
}

impl ReadDirection {
    /// Lowercase name, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadDirection::Head => "head",
            ReadDirection::Tail => "tail",
        }
    }
}

impl fmt::Display for ReadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadDirection {
    type Err = VisionError;

    /// Parse a `readFrom` value (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("head") {
            Ok(ReadDirection::Head)
        } else if s.eq_ignore_ascii_case("tail") {
            Ok(ReadDirection::Tail)
        } else {
            Err(VisionError::InvalidDirection(s.to_string()))
        }
    }
}

/// A single read against an already resolved path
///
/// `limit` is kept signed so that a negative value coming from the boundary
/// is rejected by the reader with `InvalidLimit` rather than wrapping.
/// Empty `include`/`exclude` strings mean "no filter", same as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub path: PathBuf,
    pub direction: ReadDirection,
    pub limit: i64,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

impl ReadRequest {
    /// Create an unfiltered request
    pub fn new(path: impl Into<PathBuf>, direction: ReadDirection, limit: i64) -> Self {
        ReadRequest {
            path: path.into(),
            direction,
            limit,
            include: None,
            exclude: None,
        }
    }

    /// Only keep lines matching `pattern`
    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    /// Drop lines matching `pattern`
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }
}

/// Lines selected by a read, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadResult {
    pub lines: Vec<String>,
    /// Bytes pulled from the file to produce `lines`
    pub bytes_scanned: u64,
}

impl ReadResult {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Response body: lines joined by a single newline, no trailing newline
    pub fn to_body(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("head".parse::<ReadDirection>().unwrap(), ReadDirection::Head);
        assert_eq!("TAIL".parse::<ReadDirection>().unwrap(), ReadDirection::Tail);
        assert_eq!("Head".parse::<ReadDirection>().unwrap(), ReadDirection::Head);
    }

    #[test]
    fn test_direction_parse_invalid() {
        let err = "middle".parse::<ReadDirection>().unwrap_err();
        assert_eq!(err, VisionError::InvalidDirection("middle".to_string()));

        assert!("".parse::<ReadDirection>().is_err());
    }

    #[test]
    fn test_direction_default_is_tail() {
        assert_eq!(ReadDirection::default(), ReadDirection::Tail);
    }

    #[test]
    fn test_request_builder() {
        let request = ReadRequest::new("/var/log/syslog", ReadDirection::Head, 5)
            .with_include("^a")
            .with_exclude("3");
        assert_eq!(request.limit, 5);
        assert_eq!(request.include.as_deref(), Some("^a"));
        assert_eq!(request.exclude.as_deref(), Some("3"));
    }

    #[test]
    fn test_result_body() {
        let result = ReadResult {
            lines: vec!["a".to_string(), "".to_string(), "c".to_string()],
            bytes_scanned: 5,
        };
        assert_eq!(result.to_body(), "a\n\nc");
        assert_eq!(result.len(), 3);

        assert_eq!(ReadResult::default().to_body(), "");
        assert!(ReadResult::default().is_empty());
    }
}
