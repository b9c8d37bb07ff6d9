//! Error types for scansweep.
//!
//! The tool is a batch pipeline: every error is fatal. The binary logs the
//! message and exits with a non-zero status; nothing is caught or retried.

use thiserror::Error;

/// Errors that can occur while partitioning a scan sequence.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed scan data: {0}")]
    ScanData(String),

    #[error("no scans found in {0}")]
    NoScans(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("not implemented: {0}")]
    Unimplemented(String),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
