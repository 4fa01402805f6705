//! Standalone column cleanup for already-accepted records.
//!
//! Unlike row validation, nothing here rejects rows: unparseable cells fall
//! back to a default. The typical use is deriving a non-negative integer
//! column from a price column that passed validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransformError;
use crate::logs::{TracingObserver, ValidationObserver};
use crate::models::Record;
use crate::transform::coerce::{at_most, clamp_min, coerce_observed};

/// An integer column computed from another column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedColumn {
    /// Column read from each record.
    pub source: String,
    /// Column written; may equal `source` to clean in place.
    pub target: String,
    /// Used when the source is missing or not numeric.
    #[serde(default)]
    pub default: Option<i64>,
    /// Values below are raised to `min`.
    #[serde(default)]
    pub min: Option<i64>,
    /// Values above are refused with a [`TransformError`].
    #[serde(default)]
    pub max: Option<i64>,
}

impl DerivedColumn {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            default: None,
            min: None,
            max: None,
        }
    }

    pub fn with_default(mut self, default: i64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    fn rule(&self, value: i64) -> Result<i64, String> {
        let value = match self.min {
            Some(min) => clamp_min(min)(value)?,
            None => value,
        };
        match self.max {
            Some(max) => at_most(max)(value),
            None => Ok(value),
        }
    }

    /// Compute the column for one record, returning a new record.
    pub fn apply(&self, record: &Record, observer: &dyn ValidationObserver) -> Result<Record, TransformError> {
        let rule = |value: i64| self.rule(value);
        let derived = coerce_observed(record.get(&self.source), self.default, Some(&rule), observer)?;

        let mut out = record.clone();
        out.insert(
            self.target.clone(),
            derived.map(Value::from).unwrap_or(Value::Null),
        );
        Ok(out)
    }
}

/// Apply every derived column to every record, in order.
///
/// Fails on the first record whose value a `max` rule refuses.
pub fn derive_columns(records: &[Record], columns: &[DerivedColumn]) -> Result<Vec<Record>, TransformError> {
    derive_columns_with(records, columns, &TracingObserver)
}

/// [`derive_columns`] reporting to an explicit observer.
pub fn derive_columns_with(
    records: &[Record],
    columns: &[DerivedColumn],
    observer: &dyn ValidationObserver,
) -> Result<Vec<Record>, TransformError> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .try_fold(record.clone(), |acc, column| column.apply(&acc, observer))
        })
        .collect()
}

/// Trim surrounding whitespace from every text cell.
pub fn strip_whitespace(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(key, value)| {
                    let cleaned = match value {
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other.clone(),
                    };
                    (key.clone(), cleaned)
                })
                .collect()
        })
        .collect()
}
