//! Header and row validation.
//!
//! - [`headers`] - required columns must all be present (structural check)
//! - [`row`] - per-record required/non-empty and integer coercion checks
//!
//! A header failure blocks the whole dataset; a row failure only excludes
//! that row.

pub mod headers;
pub mod row;

pub use headers::{validate_headers, validate_headers_with};
pub use row::{validate_row, RowValidator};
