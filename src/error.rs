//! Error types for the tabload ingest pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV decoding errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`SchemaError`] - Table materialization errors
//! - [`LoadError`] - Bulk load errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Decoding Errors
// =============================================================================

/// Errors during CSV decoding.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not decodable CSV.
    #[error("Invalid CSV format: {0}")]
    Malformed(#[from] csv::Error),

    /// The file has no header row.
    #[error("No header row found in CSV")]
    NoHeader,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("Missing {0} environment variable")]
    MissingVar(&'static str),

    /// A variable is set but unusable.
    #[error("Invalid value for {var}: '{value}'")]
    InvalidVar { var: &'static str, value: String },
}

// =============================================================================
// Schema Materialization Errors
// =============================================================================

/// Errors while materializing the destination table from a CSV header.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Header decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Destination table name failed validation.
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    /// A header cell normalized to the empty string.
    #[error("Header column {0} is empty after normalization")]
    EmptyColumn(usize),

    /// Two header cells normalized to the same name.
    #[error("Column '{0}' appears more than once after normalization")]
    DuplicateColumn(String),

    /// A header cell collided with the generated identity column.
    #[error("Header '{0}' collides with the generated id column")]
    ReservedColumn(String),

    /// A normalized name exceeds the identifier length limit.
    #[error("Column '{0}' exceeds 63 bytes")]
    ColumnTooLong(String),

    /// DDL execution failed.
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// Bulk Load Errors
// =============================================================================

/// Errors while bulk-loading rows into the destination table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Row decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// The file has a header but no data rows.
    #[error("No data found in CSV")]
    NoData,

    /// A row's field count does not match the column list.
    #[error("Row {row} has {found} fields, expected {expected}")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Insert or transaction control failed.
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::ingest::pipeline::run`].
/// Variants are transparent so callers see the originating message
/// unchanged (the HTTP layer forwards it verbatim).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Materialization failed; the loader never ran.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Loading failed; the table exists but holds no rows from this upload.
    #[error(transparent)]
    Load(#[from] LoadError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV decoding.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for schema materialization.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for bulk loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
