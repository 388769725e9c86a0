//! Error types for the log-vision service

use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for log-vision operations
pub type Result<T> = std::result::Result<T, VisionError>;

/// Which of the two line filters a pattern belongs to.
///
/// Displayed with the query parameter name so error messages point the caller
/// at the parameter they need to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Lines must match (`filterBy`)
    Include,
    /// Lines must not match (`ignore`)
    Exclude,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Include => f.write_str("filterBy"),
            FilterKind::Exclude => f.write_str("ignore"),
        }
    }
}

/// Error types that can occur while serving a read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid {kind} pattern '{pattern}': {message}")]
    InvalidFilter {
        kind: FilterKind,
        pattern: String,
        message: String,
    },

    #[error("Invalid readFrom value '{0}', must be 'head' or 'tail'")]
    InvalidDirection(String),

    #[error("Either 'alias' or 'path' must be supplied")]
    MissingResource,

    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Read cancelled: {0}")]
    Cancelled(String),

    #[error("Read timed out after {0:?}")]
    ReadTimeout(Duration),
}

impl From<io::Error> for VisionError {
    fn from(err: io::Error) -> Self {
        VisionError::classify_io(err.kind(), err.to_string())
    }
}

impl VisionError {
    /// Classify an I/O error that happened while working on `path`
    ///
    /// Same mapping as the `From<io::Error>` impl, but the message names the
    /// file so the caller can tell which resource failed.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        VisionError::classify_io(err.kind(), format!("{}: {}", path.display(), err))
    }

    fn classify_io(kind: io::ErrorKind, message: String) -> Self {
        match kind {
            io::ErrorKind::NotFound => VisionError::ResourceNotFound(message),
            io::ErrorKind::PermissionDenied => VisionError::PermissionDenied(message),
            _ => VisionError::IoError(message),
        }
    }

    /// Create an InvalidFilter error from a failed regex compilation
    pub fn invalid_filter(kind: FilterKind, pattern: &str, err: &regex::Error) -> Self {
        VisionError::InvalidFilter {
            kind,
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    }

    /// Convert error to HTTP status code
    ///
    /// - Malformed query parameters: 400
    /// - Unknown alias or missing file: 404
    /// - Unreadable file: 403
    /// - Read exceeded the configured timeout: 504
    /// - Everything else: 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            VisionError::InvalidLimit(_) => 400,
            VisionError::InvalidFilter { .. } => 400,
            VisionError::InvalidDirection(_) => 400,
            VisionError::MissingResource => 400,

            VisionError::AliasNotFound(_) => 404,
            VisionError::ResourceNotFound(_) => 404,

            VisionError::PermissionDenied(_) => 403,

            VisionError::ReadTimeout(_) => 504,

            VisionError::IoError(_) => 500,
            VisionError::ConfigError(_) => 500,
            VisionError::Cancelled(_) => 500,
        }
    }

    /// Whether the caller is at fault (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.to_http_status())
    }
}
