//! Validation and job configuration.
//!
//! Configs are plain JSON files. A job file carries the validation rules plus
//! optional cleanup steps:
//!
//! ```json
//! {
//!   "required_headers": ["id", "price"],
//!   "required_non_empty": ["id"],
//!   "coerce_fields": ["price"],
//!   "on_failure": "reject",
//!   "strip_whitespace": true,
//!   "derive": [
//!     { "source": "price", "target": "price_int", "default": 0, "min": 0 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::transform::cleanup::DerivedColumn;
use crate::transform::coerce::OnFailure;
use crate::validation::RowValidator;

fn default_on_failure() -> OnFailure {
    OnFailure::Reject
}

/// Rules for one validation run.
///
/// The lists behave as sets, but `required_non_empty` is checked in the
/// order given so the first failing column is predictable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Columns that must exist in the header row.
    #[serde(default)]
    pub required_headers: Vec<String>,

    /// Columns that must be non-blank in every row.
    #[serde(default)]
    pub required_non_empty: Vec<String>,

    /// Columns converted to integers.
    #[serde(default)]
    pub coerce_fields: Vec<String>,

    /// What a failed coercion does to the row (default: reject it).
    #[serde(default = "default_on_failure")]
    pub on_failure: OnFailure,

    /// Replacement value under [`OnFailure::UseDefault`].
    #[serde(default)]
    pub coerce_default: Option<i64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_headers: Vec::new(),
            required_non_empty: Vec::new(),
            coerce_fields: Vec::new(),
            on_failure: OnFailure::Reject,
            coerce_default: None,
        }
    }
}

fn push_unique<I, S>(target: &mut Vec<String>, names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for name in names {
        let name = name.into();
        if !target.contains(&name) {
            target.push(name);
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.required_headers, names);
        self
    }

    pub fn require_non_empty<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.required_non_empty, names);
        self
    }

    pub fn coerce<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        push_unique(&mut self.coerce_fields, names);
        self
    }

    pub fn with_policy(mut self, on_failure: OnFailure, coerce_default: Option<i64>) -> Self {
        self.on_failure = on_failure;
        self.coerce_default = coerce_default;
        self
    }

    /// Build the row validator these rules describe.
    pub fn row_validator(&self) -> RowValidator {
        RowValidator::new(&self.required_non_empty, &self.coerce_fields)
            .with_policy(self.on_failure, self.coerce_default)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        Self::from_json(&read_config(path)?)
    }
}

/// A validation run plus cleanup of the accepted rows.
///
/// Job files are flat: the validation keys sit next to `strip_whitespace`
/// and `derive`. Unknown keys are an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JobFile")]
pub struct JobConfig {
    #[serde(flatten)]
    pub validation: ValidationConfig,

    /// Trim whitespace from every cell before validating.
    pub strip_whitespace: bool,

    /// Integer columns computed on accepted rows.
    pub derive: Vec<DerivedColumn>,
}

/// On-disk shape of a job file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct JobFile {
    #[serde(default)]
    required_headers: Vec<String>,
    #[serde(default)]
    required_non_empty: Vec<String>,
    #[serde(default)]
    coerce_fields: Vec<String>,
    #[serde(default = "default_on_failure")]
    on_failure: OnFailure,
    #[serde(default)]
    coerce_default: Option<i64>,
    #[serde(default)]
    strip_whitespace: bool,
    #[serde(default)]
    derive: Vec<DerivedColumn>,
}

impl From<JobFile> for JobConfig {
    fn from(file: JobFile) -> Self {
        Self {
            validation: ValidationConfig {
                required_headers: file.required_headers,
                required_non_empty: file.required_non_empty,
                coerce_fields: file.coerce_fields,
                on_failure: file.on_failure,
                coerce_default: file.coerce_default,
            },
            strip_whitespace: file.strip_whitespace,
            derive: file.derive,
        }
    }
}

impl JobConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        Self::from_json(&read_config(path)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn read_config(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ValidationConfig::from_json("{}").unwrap();
        assert_eq!(config, ValidationConfig::default());
        assert_eq!(config.on_failure, OnFailure::Reject);
    }

    #[test]
    fn test_builder_dedupes_but_keeps_order() {
        let config = ValidationConfig::new()
            .require_non_empty(["name", "id"])
            .require_non_empty(["id", "email"]);
        assert_eq!(config.required_non_empty, vec!["name", "id", "email"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ValidationConfig::from_json(r#"{"required_header": ["id"]}"#).unwrap_err();
        assert!(err.to_string().contains("required_header"));
    }

    #[test]
    fn test_job_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "required_headers": ["id", "price"],
                "required_non_empty": ["id"],
                "coerce_fields": ["price"],
                "on_failure": "use_default",
                "coerce_default": 0,
                "strip_whitespace": true,
                "derive": [{{"source": "price", "target": "price_int", "default": 0, "min": 0}}]
            }}"#
        )
        .unwrap();

        let job = JobConfig::from_file(file.path()).unwrap();
        assert_eq!(job.validation.required_headers, vec!["id", "price"]);
        assert_eq!(job.validation.on_failure, OnFailure::UseDefault);
        assert_eq!(job.validation.coerce_default, Some(0));
        assert!(job.strip_whitespace);
        assert_eq!(job.derive.len(), 1);
        assert_eq!(job.derive[0].target, "price_int");
    }

    #[test]
    fn test_job_config_rejects_misspelled_keys() {
        let err = JobConfig::from_json(r#"{"required_header": ["id"]}"#).unwrap_err();
        assert!(err.to_string().contains("required_header"));

        let err = JobConfig::from_json(r#"{"coerce_field": ["price"], "strip_whitespace": true}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_job_config_defaults() {
        let job = JobConfig::from_json("{}").unwrap();
        assert_eq!(job, JobConfig::default());
        assert_eq!(job.validation.on_failure, OnFailure::Reject);
    }

    #[test]
    fn test_missing_file() {
        let err = JobConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_job_config_round_trips_through_json() {
        let job = JobConfig {
            validation: ValidationConfig::new().require_headers(["id"]),
            strip_whitespace: false,
            derive: vec![DerivedColumn::new("a", "b")],
        };
        let json = job.to_json().unwrap();
        assert_eq!(JobConfig::from_json(&json).unwrap(), job);
    }
}
