//! Record transformation.
//!
//! - Coerce: safe integer parsing with defaults and post-parse transforms
//! - Cleanup: whitespace stripping and derived integer columns
//! - Pipeline: header check plus row partitioning over a dataset

pub mod cleanup;
pub mod coerce;
pub mod pipeline;

pub use cleanup::{derive_columns, derive_columns_with, strip_whitespace, DerivedColumn};
pub use coerce::{
    at_most, clamp_min, coerce, coerce_observed, parse_int, parse_int_str, FieldCoercer,
    OnFailure, Transform,
};
pub use pipeline::{
    run, run_dataset, run_observed, run_with_headers, validate_csv, PipelineResult,
};
