//! Domain models shared by the validation pipeline.
//!
//! - [`Record`] - one row as an ordered column -> value mapping
//! - [`Rejection`] - why a single row was refused
//! - [`RowOutcome`] - accepted or rejected, never both
//! - [`RowError`] - a rejection tagged with its original row position

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// =============================================================================
// Record
// =============================================================================

/// One row of tabular data.
///
/// Raw cells are `Value::String`, absent cells are `Value::Null` and coerced
/// cells are integer `Value::Number`s. Column order is the insertion order.
pub type Record = Map<String, Value>;

/// Build a record from `(column, raw text)` pairs.
pub fn record_from_pairs<K, V, I>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

/// Check if a cell is "empty" (null or whitespace-only text).
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a cell the way it appears in the source file.
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Row outcomes
// =============================================================================

/// Reason a single record was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// A required column is absent from the record.
    MissingField { field: String },
    /// A required column is present but blank.
    EmptyField { field: String },
    /// A column requested for integer coercion does not parse.
    InvalidInteger { field: String, raw: String },
}

impl Rejection {
    /// The column the rejection is about.
    pub fn field(&self) -> &str {
        match self {
            Rejection::MissingField { field }
            | Rejection::EmptyField { field }
            | Rejection::InvalidInteger { field, .. } => field,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingField { field } => write!(f, "{} missing", field),
            Rejection::EmptyField { field } => write!(f, "{} empty", field),
            Rejection::InvalidInteger { field, raw } => write!(f, "{} invalid: {}", field, raw),
        }
    }
}

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Cleaned copy of the input, coerced columns replaced by integers.
    Accepted(Record),
    Rejected(Rejection),
}

impl RowOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RowOutcome::Accepted(_))
    }
}

/// A rejected record, tagged with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Position in the original sequence (1-based, never renumbered).
    pub row: usize,
    /// Column that caused the rejection.
    pub field: String,
    /// Human-readable reason, e.g. `price invalid: oops`.
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, rejection: &Rejection) -> Self {
        Self {
            row,
            field: rejection.field().to_string(),
            reason: rejection.to_string(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}
