//! Error types for the flight-delay ETL pipeline.
//!
//! One error enum per stage:
//!
//! - [`CsvError`] - Reading and decoding the input file
//! - [`NormalizeError`] - Coercing raw text columns into typed values
//! - [`LoadError`] - Applying the schema and loading DuckDB
//! - [`ConfigError`] - Invalid configuration values
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading the raw input file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV row.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// A column the transformation needs is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while coercing raw columns.
///
/// `line` is the 1-based line in the source file (the header is line 1).
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Unparsable flight date.
    #[error("Line {line}, column '{column}': invalid date '{value}'")]
    InvalidDate {
        line: usize,
        column: &'static str,
        value: String,
    },

    /// Unparsable delay minutes.
    #[error("Line {line}, column '{column}': invalid number '{value}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },

    /// Unrecognized boolean flag.
    #[error("Line {line}, column '{column}': invalid flag '{value}'")]
    InvalidFlag {
        line: usize,
        column: &'static str,
        value: String,
    },
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors from the DuckDB loader.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Any error raised by DuckDB (constraint violation, type mismatch, IO).
    #[error("DuckDB error: {0}")]
    Database(#[from] duckdb::Error),

    /// Schema override file could not be read.
    #[error("Cannot read schema file '{path}': {source}")]
    SchemaFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Delimiter must be exactly one ASCII character.
    #[error("Invalid delimiter '{0}': expected a single ASCII character")]
    InvalidDelimiter(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_etl`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Normalization error.
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Load error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The input file had a header but no data rows.
    #[error("No records to transform")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
