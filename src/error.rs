//! Error types for the usage accounting pipeline.
//!
//! Only [`UsageError`] ever reaches a caller. [`RecordError`] describes why a single
//! log line was skipped and is absorbed by the decoder.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a run before any report is produced.
#[derive(Error, Debug)]
pub enum UsageError {
    /// The log file could not be opened.
    #[error("{}", source_unavailable_message(.path, .source))]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The log file was opened but reading it failed part way through.
    #[error("File '{}' could not be read: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration rejected by validation.
    #[error("configuration error: {0}")]
    Config(String),
}

fn source_unavailable_message(path: &std::path::Path, source: &io::Error) -> String {
    if source.kind() == io::ErrorKind::NotFound {
        format!("File '{}' not found", path.display())
    } else {
        format!("File '{}' could not be opened: {}", path.display(), source)
    }
}

impl UsageError {
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            UsageError::SourceUnavailable { .. } | UsageError::SourceRead { .. }
        )
    }
}

/// Recoverable, per-line problems. These never abort a run.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The line carried the usage marker but was not valid JSON.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A decoded record had no value at the given path.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, UsageError>;
