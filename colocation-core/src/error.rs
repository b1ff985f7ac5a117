//! The crate's error taxonomy.
//!
//! Every fallible entry point in this crate returns `Result<T>`. There is
//! no silent suppression and no partial result on failure.

use thiserror::Error;

/// Errors produced by the co-location mining pipeline.
#[derive(Debug, Error)]
pub enum CoLocationError {
    /// A malformed CSV row, a non-numeric coordinate, or a missing
    /// required column. Carries the 1-based row number (the header row
    /// is row 0).
    #[error("input error at row {row}: {message}")]
    InputError {
        /// The offending row, 1-based; the header row is row 0.
        row: usize,
        /// Human-readable description of what was wrong with the row.
        message: String,
    },

    /// A configuration value outside its valid domain, e.g.
    /// `min_dist <= 0`, `min_prev` outside `[0, 1]`, or an unknown
    /// clique-enumeration scheme name. Always reported before any work
    /// begins.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An internal assertion failed, e.g. feature-distinctness was
    /// violated in an emitted clique, or the dataset contained a
    /// duplicate `(feature, idx)` pair. Indicates a bug in this crate
    /// rather than bad input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Propagated I/O failure from reading or writing a CSV file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Propagated failure from the `csv` crate itself (malformed header,
    /// parse error not already caught by this crate's own validation).
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// This crate's `Result` alias, used by every fallible public entry point.
pub type Result<T> = std::result::Result<T, CoLocationError>;
