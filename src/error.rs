//! Structural errors raised while framing a dump into pages

use thiserror::Error;

/// Result type for page streaming
pub type Result<T> = std::result::Result<T, PageError>;

/// Errors that make the page framing untrustworthy. None of these are
/// recoverable: the run aborts at the first one.
#[derive(Error, Debug)]
pub enum PageError {
    /// A start marker appeared before the previous page was closed
    #[error("nested <page> at input line {line}: previous page opened at line {opened_at} was never closed")]
    UnexpectedPageStart { line: u64, opened_at: u64 },

    /// An end marker appeared with no open page
    #[error("unbalanced </page> at input line {line}: no page is open")]
    UnexpectedPageEnd { line: u64 },

    /// Reading the decompressed stream failed
    #[error("failed to read dump stream: {0}")]
    Io(#[from] std::io::Error),
}
