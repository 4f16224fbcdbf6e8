use std::path::PathBuf;
use thiserror::Error;

/// Failures that make a whole input file unusable. No rows are emitted for
/// the file.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid song record: {0}")]
    InvalidRecord(#[source] serde_json::Error),

    #[error("File contains no records")]
    Empty,

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// Failures confined to a single log event. The event is skipped; the rest
/// of the file proceeds.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}
