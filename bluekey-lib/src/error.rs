use std::io;
use thiserror::Error;

/// The primary error type for the `bluekey` library.
///
/// Only two conditions abort a run: a missing input file and an I/O failure
/// that is not plain end-of-file truncation. `Format` is recoverable; the
/// pipeline falls back to text parsing when the binary container is rejected.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("capture file not found: {path}")]
    FileNotFound { path: String },

    #[error("container format error: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to write report: {0}")]
    Report(String),
}

impl ExtractError {
    /// Whether the pipeline may retry the capture with the text parser.
    ///
    /// Anything short of "the file does not exist" is worth a second pass:
    /// a wrong magic or a garbled record header just means the capture is
    /// not btsnoop, not that it is unreadable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ExtractError::FileNotFound { .. })
    }
}
