//! Dataset validation pipeline.
//!
//! Runs the header check once, then validates every record independently,
//! partitioning the dataset into accepted records and per-row errors.
//!
//! # Example
//!
//! ```rust
//! use rowcheck::{record_from_pairs, run, ValidationConfig};
//!
//! let records = vec![
//!     record_from_pairs([("id", "1"), ("price", "9.9")]),
//!     record_from_pairs([("id", ""), ("price", "5")]),
//!     record_from_pairs([("id", "3"), ("price", "oops")]),
//! ];
//! let config = ValidationConfig::new()
//!     .require_non_empty(["id"])
//!     .coerce(["price"]);
//!
//! let result = run(&records, &config).unwrap();
//! assert_eq!(result.accepted.len(), 1);
//! assert_eq!(result.accepted[0]["price"], 9);
//! assert_eq!(result.errors[0].to_string(), "Row 2: id empty");
//! assert_eq!(result.errors[1].to_string(), "Row 3: price invalid: oops");
//! ```

use serde::Serialize;
use std::path::Path;

use crate::config::ValidationConfig;
use crate::error::RunResult;
use crate::logs::{TracingObserver, ValidationEvent, ValidationObserver};
use crate::models::{Record, RowError, RowOutcome};
use crate::parser::{read_csv_file, Dataset};
use crate::validation::validate_headers_with;

/// Result of a validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    /// Accepted records, cleaned, in original order
    pub accepted: Vec<Record>,

    /// One entry per rejected record, in original order
    pub errors: Vec<RowError>,

    /// Number of input records
    pub total: usize,
}

impl PipelineResult {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.errors.len()
    }

    /// True when no row was rejected
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "Validated: {} records, {} accepted, {} rejected",
            self.total,
            self.accepted_count(),
            self.rejected_count()
        )
    }
}

/// Validate records, taking the header set from the first record.
///
/// With no records the header set is empty, so any required header fails
/// with [`PipelineError::MissingHeaders`](crate::error::PipelineError). Use
/// [`run_with_headers`] or [`run_dataset`] when the input may have no rows.
pub fn run(records: &[Record], config: &ValidationConfig) -> RunResult<PipelineResult> {
    run_observed(None, records, config, &TracingObserver)
}

/// Validate records against an explicit header list.
pub fn run_with_headers<H: AsRef<str>>(
    headers: &[H],
    records: &[Record],
    config: &ValidationConfig,
) -> RunResult<PipelineResult> {
    let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
    run_observed(Some(&headers), records, config, &TracingObserver)
}

/// Validate a parsed dataset using its own header row.
pub fn run_dataset(dataset: &Dataset, config: &ValidationConfig) -> RunResult<PipelineResult> {
    run_observed(Some(&dataset.headers), &dataset.records, config, &TracingObserver)
}

/// Read a CSV file and validate it.
///
/// An unreadable source fails before any validation happens.
pub fn validate_csv(
    path: &Path,
    delimiter: Option<char>,
    config: &ValidationConfig,
) -> RunResult<(Dataset, PipelineResult)> {
    let dataset = read_csv_file(path, delimiter)?;
    let result = run_dataset(&dataset, config)?;
    Ok((dataset, result))
}

/// The pipeline itself; every other entry point funnels here.
///
/// A header failure aborts with no partial result. Row failures never do.
pub fn run_observed(
    headers: Option<&[String]>,
    records: &[Record],
    config: &ValidationConfig,
    observer: &dyn ValidationObserver,
) -> RunResult<PipelineResult> {
    let resolved: Vec<String> = match headers {
        Some(headers) => headers.to_vec(),
        None => records
            .first()
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default(),
    };

    validate_headers_with(&config.required_headers, &resolved, observer)?;

    let validator = config.row_validator();
    let mut accepted = Vec::with_capacity(records.len());
    let mut errors = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        match validator.validate_with(record, observer) {
            RowOutcome::Accepted(cleaned) => {
                observer.observe(&ValidationEvent::RowAccepted { row });
                accepted.push(cleaned);
            }
            RowOutcome::Rejected(rejection) => {
                let error = RowError::new(row, &rejection);
                observer.observe(&ValidationEvent::RowRejected {
                    row,
                    reason: error.reason.clone(),
                });
                errors.push(error);
            }
        }
    }

    observer.observe(&ValidationEvent::RunFinished {
        total: records.len(),
        accepted: accepted.len(),
        rejected: errors.len(),
    });

    Ok(PipelineResult {
        accepted,
        errors,
        total: records.len(),
    })
}
