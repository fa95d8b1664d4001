//! Error types for `tablekey`.
//!
//! The validation engine itself never fails: unparsable values, unresolvable
//! columns and stale cache entries all degrade to "no fingerprint". The errors
//! below are raised by the surrounding API (row container, configuration,
//! structure loading) when a caller asks for something that does not exist.

use thiserror::Error;

use crate::table::RowId;

/// Result type alias for `tablekey` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `tablekey` operations.
///
/// Error codes follow the pattern `TABLEKEY-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Row handle does not belong to the table (TABLEKEY-001).
    #[error("[TABLEKEY-001] Row {0} not found")]
    RowNotFound(RowId),

    /// Column index outside the table (TABLEKEY-002).
    #[error("[TABLEKEY-002] Column index {index} out of range, table has {column_count} columns")]
    ColumnOutOfRange {
        /// Requested column index.
        index: usize,
        /// Number of columns of the table.
        column_count: usize,
    },

    /// Row width does not match the table (TABLEKEY-003).
    #[error("[TABLEKEY-003] Row has {actual} values, table has {expected} columns")]
    ColumnCountMismatch {
        /// Number of columns of the table.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Row position outside the table (TABLEKEY-004).
    #[error("[TABLEKEY-004] Row position {index} out of range, table has {row_count} rows")]
    RowIndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of rows of the table.
        row_count: usize,
    },

    /// Configuration error (TABLEKEY-005).
    #[error("[TABLEKEY-005] Configuration error: {0}")]
    Config(String),

    /// Structure definition error (TABLEKEY-006).
    #[error("[TABLEKEY-006] Structure error: {0}")]
    Structure(String),

    /// IO error (TABLEKEY-007).
    #[error("[TABLEKEY-007] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code (e.g., "TABLEKEY-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RowNotFound(_) => "TABLEKEY-001",
            Self::ColumnOutOfRange { .. } => "TABLEKEY-002",
            Self::ColumnCountMismatch { .. } => "TABLEKEY-003",
            Self::RowIndexOutOfRange { .. } => "TABLEKEY-004",
            Self::Config(_) => "TABLEKEY-005",
            Self::Structure(_) => "TABLEKEY-006",
            Self::Io(_) => "TABLEKEY-007",
        }
    }

    /// Returns true if the caller can fix the input and retry.
    ///
    /// IO failures are the only non-recoverable errors.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
