use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sales dashboard.
#[derive(Error, Debug)]
pub enum SalesError {
    /// The source location does not resolve to a readable file.
    #[error("Sales source not found: {0}")]
    SourceNotFound(PathBuf),

    /// Required columns are missing, or a row could not be parsed under the
    /// abort policy.
    #[error("Malformed sales source {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// A single data row failed to parse.
    ///
    /// `row` is 1-based and counts the header line, so it matches what a
    /// spreadsheet program shows.
    #[error("Row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// A filter produced zero records.
    #[error("No sales data for the selected filters ({period})")]
    EmptyFilterResult { period: String },

    /// A percentage delta was requested against a zero baseline.
    #[error("Cannot compare {current} against a baseline of {baseline}")]
    NotComparable { current: f64, baseline: f64 },

    /// A date string did not match any recognised format.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SalesError {
    /// `true` for the conditions a presentation layer should render as an
    /// empty state rather than a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, SalesError::EmptyFilterResult { .. })
    }
}

/// Convenience alias used throughout the sales crates.
pub type Result<T> = std::result::Result<T, SalesError>;
