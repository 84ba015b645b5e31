//! Error types for the Promoclean pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ReadError`] - NDJSON reading errors
//! - [`CleanError`] - Fatal violations found while cleaning a table
//! - [`WriteError`] - CSV writing errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Reading Errors
// =============================================================================

/// Errors while reading an NDJSON record file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid record.
    #[error("Line {line}: {message}")]
    Json { line: usize, message: String },

    /// File holds no records at all.
    #[error("File contains no records")]
    Empty,
}

// =============================================================================
// Cleaning Errors
// =============================================================================

/// Fatal violations found while cleaning a table.
///
/// Benign gaps (missing ages, unmapped ids, absent payload keys) are never
/// errors; they become `None`.
#[derive(Debug, Error)]
pub enum CleanError {
    /// `became_member_on` is not an eight digit YYYYMMDD date.
    #[error("Row {row}: invalid membership date '{value}' (expected YYYYMMDD)")]
    InvalidMemberSince { row: usize, value: String },

    /// Both legacy offer id spellings are populated on one event.
    #[error("Row {row}: payload has both 'offer id' ({spaced}) and 'offer_id' ({underscored})")]
    ConflictingOfferId {
        row: usize,
        spaced: String,
        underscored: String,
    },
}

// =============================================================================
// Writing Errors
// =============================================================================

/// Errors while writing a CSV table.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO error.
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoder error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading one of the input tables failed.
    #[error("Reading {table}: {source}")]
    Read {
        table: &'static str,
        #[source]
        source: ReadError,
    },

    /// Cleaning error.
    #[error("Clean error: {0}")]
    Clean(#[from] CleanError),

    /// Writing error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Attach the table name to a read failure.
    pub fn read(table: &'static str) -> impl FnOnce(ReadError) -> Self {
        move |source| PipelineError::Read { table, source }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for reading operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for cleaning operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// Result type for writing operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CleanError -> PipelineError
        let clean_err = CleanError::InvalidMemberSince {
            row: 3,
            value: "2017-01-01".into(),
        };
        let pipeline_err: PipelineError = clean_err.into();
        assert!(pipeline_err.to_string().contains("2017-01-01"));

        // ReadError -> PipelineError with table context
        let read_err = ReadError::Json {
            line: 7,
            message: "expected value".into(),
        };
        let pipeline_err = PipelineError::read("transcript")(read_err);
        let msg = pipeline_err.to_string();
        assert!(msg.contains("transcript"));
        assert!(msg.contains("Line 7"));
    }

    #[test]
    fn test_conflicting_offer_id_format() {
        let err = CleanError::ConflictingOfferId {
            row: 12,
            spaced: "x1".into(),
            underscored: "x2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 12"));
        assert!(msg.contains("'offer id' (x1)"));
        assert!(msg.contains("'offer_id' (x2)"));
    }
}
