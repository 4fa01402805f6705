//! Single-record validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. every required column is present and non-blank (caller order)
//! 2. every coerce column present in the record parses to an integer
//!
//! The input record is never modified; accepted rows are a cleaned copy.

use serde_json::Value;

use crate::logs::{TracingObserver, ValidationObserver};
use crate::models::{is_blank, raw_text, Record, Rejection, RowOutcome};
use crate::transform::coerce::{FieldCoercer, OnFailure};

/// Validates records against required and coerced columns.
#[derive(Debug)]
pub struct RowValidator {
    required_non_empty: Vec<String>,
    coerce_fields: Vec<String>,
    coercer: FieldCoercer,
}

impl RowValidator {
    /// Coerce failures reject the row.
    pub fn new<R, C>(required_non_empty: &[R], coerce_fields: &[C]) -> Self
    where
        R: AsRef<str>,
        C: AsRef<str>,
    {
        Self {
            required_non_empty: required_non_empty.iter().map(|s| s.as_ref().to_string()).collect(),
            coerce_fields: coerce_fields.iter().map(|s| s.as_ref().to_string()).collect(),
            coercer: FieldCoercer::strict(),
        }
    }

    /// Switch the coercion policy. With [`OnFailure::UseDefault`] an
    /// unparseable cell becomes `default` (or null) instead of rejecting.
    pub fn with_policy(mut self, on_failure: OnFailure, default: Option<i64>) -> Self {
        let mut coercer = FieldCoercer::new().on_failure(on_failure);
        if let Some(default) = default {
            coercer = coercer.with_default(default);
        }
        self.coercer = coercer;
        self
    }

    pub fn validate(&self, record: &Record) -> RowOutcome {
        self.validate_with(record, &TracingObserver)
    }

    pub fn validate_with(&self, record: &Record, observer: &dyn ValidationObserver) -> RowOutcome {
        for field in &self.required_non_empty {
            match record.get(field) {
                None => {
                    return RowOutcome::Rejected(Rejection::MissingField {
                        field: field.clone(),
                    })
                }
                Some(value) if is_blank(value) => {
                    return RowOutcome::Rejected(Rejection::EmptyField {
                        field: field.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        let mut cleaned = record.clone();

        for field in &self.coerce_fields {
            let Some(raw) = record.get(field) else {
                continue;
            };

            match self.coercer.coerce_with(Some(raw), observer) {
                Ok(Some(parsed)) => {
                    cleaned.insert(field.clone(), Value::from(parsed));
                }
                Ok(None) => {
                    cleaned.insert(field.clone(), Value::Null);
                }
                Err(_) => {
                    return RowOutcome::Rejected(Rejection::InvalidInteger {
                        field: field.clone(),
                        raw: raw_text(raw),
                    })
                }
            }
        }

        RowOutcome::Accepted(cleaned)
    }
}

/// Validate one record with the strict coercion policy.
///
/// # Example
/// ```
/// use rowcheck::{record_from_pairs, validate_row, RowOutcome};
///
/// let row = record_from_pairs([("id", "3"), ("price", "oops")]);
/// match validate_row(&row, &["id"], &["price"]) {
///     RowOutcome::Rejected(reason) => assert_eq!(reason.to_string(), "price invalid: oops"),
///     RowOutcome::Accepted(_) => unreachable!(),
/// }
/// ```
pub fn validate_row<R, C>(record: &Record, required_non_empty: &[R], coerce_fields: &[C]) -> RowOutcome
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    RowValidator::new(required_non_empty, coerce_fields).validate(record)
}
