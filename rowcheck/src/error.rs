//! Error types for the rowcheck validation pipeline.
//!
//! Errors are split by how far they travel:
//!
//! - [`SourceError`] - the CSV source could not be opened or decoded
//! - [`HeaderError`] - required columns are absent from the dataset
//! - [`TransformError`] - a caller-supplied transform rejected a parsed value
//! - [`CoerceError`] - a value could not be coerced under the `Reject` policy
//! - [`PipelineError`] - structural failures that abort a whole run
//! - [`SinkError`] - writing cleaned rows or reports failed
//! - [`ConfigError`] - a configuration file could not be loaded
//!
//! Row-level rejections are *not* errors: they are recorded as
//! [`crate::models::RowError`] data and the run continues.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors raised while opening or decoding a tabular source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("Input file does not exist: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source contains no bytes at all.
    #[error("CSV source is empty")]
    EmptyFile,

    /// The first line holds no usable column names.
    #[error("CSV source has no header row")]
    NoHeaders,

    /// The content could not be parsed as delimited text.
    #[error("CSV parsing error at line {line}: {message}")]
    Parse { line: u64, message: String },
}

// =============================================================================
// Header Errors
// =============================================================================

/// Required headers missing from a dataset.
///
/// `missing` is sorted and deduplicated so the message is reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required headers: {}", .missing.join(", "))]
pub struct HeaderError {
    pub missing: Vec<String>,
}

// =============================================================================
// Coercion Errors
// =============================================================================

/// A caller-supplied transform refused a successfully parsed integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Transform rejected value {value}: {message}")]
pub struct TransformError {
    /// The parsed integer the transform was applied to.
    pub value: i64,
    pub message: String,
}

/// Coercion failures under the `Reject` policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// No value was present to coerce.
    #[error("value is missing")]
    Missing,

    /// The value is not a number.
    #[error("invalid integer value: '{raw}'")]
    Unparseable { raw: String },

    /// The transform refused the parsed value.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Structural failures that abort a validation run.
///
/// No partial result is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source could not be opened or decoded.
    #[error("Dataset access error: {0}")]
    Source(#[from] SourceError),

    /// The header check failed.
    #[error("{0}")]
    MissingHeaders(#[from] HeaderError),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while writing cleaned records or reports.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Filesystem error.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading a job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for pipeline runs.
pub type RunResult<T> = Result<T, PipelineError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SourceError -> PipelineError
        let source_err = SourceError::NoHeaders;
        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("no header row"));

        // HeaderError -> PipelineError keeps the header message intact
        let header_err = HeaderError {
            missing: vec!["age".into(), "name".into()],
        };
        let pipeline_err: PipelineError = header_err.into();
        assert_eq!(pipeline_err.to_string(), "Missing required headers: age, name");
    }

    #[test]
    fn test_transform_error_carries_value() {
        let err = TransformError {
            value: -4,
            message: "must be positive".into(),
        };
        let coerce_err: CoerceError = err.clone().into();
        assert_eq!(coerce_err, CoerceError::Transform(err));
        assert!(coerce_err.to_string().contains("-4"));
        assert!(coerce_err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_file_not_found_format() {
        let err = SourceError::FileNotFound {
            path: PathBuf::from("data/input/raw_sales.csv"),
        };
        assert_eq!(
            err.to_string(),
            "Input file does not exist: data/input/raw_sales.csv"
        );
    }
}
