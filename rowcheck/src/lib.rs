//! # rowcheck - header checks, row validation and safe integer coercion
//!
//! rowcheck sits between a CSV extract step and whatever loads the data
//! downstream. It refuses datasets that lack required columns, splits the
//! rest into accepted rows and per-row errors, and turns messy numeric cells
//! into integers without ever panicking on bad input.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validation │────▶│   Writer    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (hdr + row) │     │ (csv/json)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                          accepted rows +
//!                                          Row N: reason
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rowcheck::{parse_csv_str, run_dataset, ValidationConfig};
//!
//! let dataset = parse_csv_str("id,price\n1,9.9\n,5\n3,oops\n", ',').unwrap();
//! let config = ValidationConfig::new()
//!     .require_headers(["id", "price"])
//!     .require_non_empty(["id"])
//!     .coerce(["price"]);
//!
//! let result = run_dataset(&dataset, &config).unwrap();
//! assert_eq!(result.summary(), "Validated: 3 records, 1 accepted, 2 rejected");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`models`] - Records, rejections and row errors
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Header and row checks
//! - [`transform`] - Coercion, cleanup and the dataset pipeline
//! - [`writer`] - CSV output and error reports
//! - [`config`] - JSON job configuration
//! - [`logs`] - Validation events and observers

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Output
pub mod writer;

// Configuration
pub mod config;

// Observability
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CoerceError, ConfigError, HeaderError, PipelineError, SinkError, SourceError,
    TransformError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{record_from_pairs, Record, Rejection, RowError, RowOutcome};

// =============================================================================
// Re-exports - Parser
// =============================================================================

pub use parser::{
    detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_str, read_csv_bytes,
    read_csv_file, Dataset,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_headers, validate_headers_with, validate_row, RowValidator};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    coerce, derive_columns, run, run_dataset, run_observed, run_with_headers, strip_whitespace,
    validate_csv, DerivedColumn, FieldCoercer, OnFailure, PipelineResult,
};

// =============================================================================
// Re-exports - Output, config, observers
// =============================================================================

pub use config::{JobConfig, ValidationConfig};
pub use logs::{CollectingObserver, NoopObserver, TracingObserver, ValidationEvent, ValidationObserver};
pub use writer::{render_error_lines, write_csv, write_error_report, write_report, ValidationReport};
