use std::fmt;

use thiserror::Error;

/// Why an export cannot run right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportBlocker {
    EmptySequence,
    NotEdited,
    DragInProgress,
}

impl fmt::Display for ExportBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ExportBlocker::EmptySequence => "the sequence is empty",
            ExportBlocker::NotEdited => "no edit has been made yet",
            ExportBlocker::DragInProgress => "a drag is in progress",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("failed to read or write GPX: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
    #[error("export unavailable: {0}")]
    ExportUnavailable(ExportBlocker),
}

pub type Result<T> = std::result::Result<T, EditorError>;
