//! Safe integer coercion for single cell values.
//!
//! Parsing policy:
//! - surrounding whitespace is stripped
//! - plain integers parse directly
//! - anything with a fractional part or exponent parses as a float and is
//!   truncated toward zero (`"10.9"` -> 10, `"-1.5"` -> -1)
//! - non-finite or out-of-range floats do not parse
//!
//! A parse failure is never an error by itself; what happens next depends on
//! [`OnFailure`]. The only failure surfaced in every mode is a caller
//! transform refusing a parsed value ([`TransformError`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{CoerceError, TransformError};
use crate::logs::{TracingObserver, ValidationEvent, ValidationObserver};
use crate::models::raw_text;

/// A post-parse business rule. `Err` carries the reason the value is refused.
pub type Transform<'a> = dyn Fn(i64) -> Result<i64, String> + Send + Sync + 'a;

/// What to do when a value is missing or does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Return the configured default (possibly no value).
    #[default]
    UseDefault,
    /// Fail with a [`CoerceError`].
    Reject,
}

impl std::str::FromStr for OnFailure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "use_default" | "default" => Ok(Self::UseDefault),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

/// Parse a cell to an integer, or `None` if it is not numeric.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_int_str(s),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Parse text to an integer, truncating float-like input toward zero.
pub fn parse_int_str(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate))
}

fn truncate(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

enum Attempt {
    Parsed(i64),
    Missing,
    Unparseable(String),
}

fn attempt(
    raw: Option<&Value>,
    default: Option<i64>,
    observer: &dyn ValidationObserver,
) -> Attempt {
    let raw = match raw {
        None | Some(Value::Null) => {
            observer.observe(&ValidationEvent::CoerceMissing { default });
            return Attempt::Missing;
        }
        Some(v) => v,
    };

    match parse_int(raw) {
        Some(parsed) => {
            observer.observe(&ValidationEvent::CoerceParsed {
                raw: raw_text(raw),
                parsed,
            });
            Attempt::Parsed(parsed)
        }
        None => {
            let text = raw_text(raw);
            observer.observe(&ValidationEvent::CoerceFailed { raw: text.clone() });
            Attempt::Unparseable(text)
        }
    }
}

fn apply_transform(
    parsed: i64,
    transform: Option<&Transform<'_>>,
    observer: &dyn ValidationObserver,
) -> Result<i64, TransformError> {
    let Some(transform) = transform else {
        return Ok(parsed);
    };

    match transform(parsed) {
        Ok(transformed) => {
            observer.observe(&ValidationEvent::CoerceTransformed { parsed, transformed });
            Ok(transformed)
        }
        Err(message) => {
            observer.observe(&ValidationEvent::CoerceTransformFailed {
                parsed,
                message: message.clone(),
            });
            Err(TransformError {
                value: parsed,
                message,
            })
        }
    }
}

/// Coerce a value to an integer, falling back to `default`.
///
/// Missing or unparseable input yields `default`. A transform error is the
/// only failure.
///
/// # Example
/// ```
/// use rowcheck::coerce;
/// use serde_json::json;
///
/// assert_eq!(coerce(None, Some(0), None).unwrap(), Some(0));
/// assert_eq!(coerce(Some(&json!("10.9")), None, None).unwrap(), Some(10));
///
/// let square = |v: i64| Ok::<i64, String>(v * v);
/// assert_eq!(coerce(Some(&json!("4")), None, Some(&square)).unwrap(), Some(16));
/// ```
pub fn coerce(
    raw: Option<&Value>,
    default: Option<i64>,
    transform: Option<&Transform<'_>>,
) -> Result<Option<i64>, TransformError> {
    coerce_observed(raw, default, transform, &TracingObserver)
}

/// [`coerce`] reporting to an explicit observer.
pub fn coerce_observed(
    raw: Option<&Value>,
    default: Option<i64>,
    transform: Option<&Transform<'_>>,
    observer: &dyn ValidationObserver,
) -> Result<Option<i64>, TransformError> {
    match attempt(raw, default, observer) {
        Attempt::Parsed(parsed) => apply_transform(parsed, transform, observer).map(Some),
        Attempt::Missing | Attempt::Unparseable(_) => Ok(default),
    }
}

// =============================================================================
// Reusable transforms
// =============================================================================

/// Raise values below `min` to `min` (`clamp_min(0)` is "clamp to non-negative").
pub fn clamp_min(min: i64) -> impl Fn(i64) -> Result<i64, String> + Send + Sync {
    move |value| Ok(value.max(min))
}

/// Refuse values above `max`.
pub fn at_most(max: i64) -> impl Fn(i64) -> Result<i64, String> + Send + Sync {
    move |value| {
        if value > max {
            Err(format!("{} exceeds maximum {}", value, max))
        } else {
            Ok(value)
        }
    }
}

// =============================================================================
// FieldCoercer
// =============================================================================

/// A configured coercion: default, failure policy and optional transform.
pub struct FieldCoercer {
    default: Option<i64>,
    on_failure: OnFailure,
    transform: Option<Box<Transform<'static>>>,
}

impl FieldCoercer {
    /// Silent fallback to no value, no transform.
    pub fn new() -> Self {
        Self {
            default: None,
            on_failure: OnFailure::UseDefault,
            transform: None,
        }
    }

    /// Hard failure on missing or unparseable input.
    pub fn strict() -> Self {
        Self::new().on_failure(OnFailure::Reject)
    }

    pub fn with_default(mut self, default: i64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn on_failure(mut self, on_failure: OnFailure) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(i64) -> Result<i64, String> + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn default_value(&self) -> Option<i64> {
        self.default
    }

    pub fn policy(&self) -> OnFailure {
        self.on_failure
    }

    /// Coerce, logging through `tracing`.
    pub fn coerce(&self, raw: Option<&Value>) -> Result<Option<i64>, CoerceError> {
        self.coerce_with(raw, &TracingObserver)
    }

    /// Coerce, reporting every branch to `observer`.
    pub fn coerce_with(
        &self,
        raw: Option<&Value>,
        observer: &dyn ValidationObserver,
    ) -> Result<Option<i64>, CoerceError> {
        match attempt(raw, self.default, observer) {
            Attempt::Parsed(parsed) => {
                Ok(Some(apply_transform(parsed, self.transform.as_deref(), observer)?))
            }
            Attempt::Missing => match self.on_failure {
                OnFailure::UseDefault => Ok(self.default),
                OnFailure::Reject => Err(CoerceError::Missing),
            },
            Attempt::Unparseable(raw) => match self.on_failure {
                OnFailure::UseDefault => Ok(self.default),
                OnFailure::Reject => Err(CoerceError::Unparseable { raw }),
            },
        }
    }
}

impl Default for FieldCoercer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldCoercer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCoercer")
            .field("default", &self.default)
            .field("on_failure", &self.on_failure)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::CollectingObserver;
    use serde_json::json;

    #[test]
    fn test_field_coercer_transform_failure() {
        let coercer = FieldCoercer::new().with_transform(at_most(10));
        let observer = CollectingObserver::new();

        assert_eq!(coercer.coerce_with(Some(&json!("7")), &observer).unwrap(), Some(7));

        match coercer.coerce_with(Some(&json!("12.5")), &observer) {
            Err(CoerceError::Transform(err)) => {
                assert_eq!(err.value, 12);
                assert_eq!(err.message, "12 exceeds maximum 10");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(
            observer.events().last(),
            Some(&ValidationEvent::CoerceTransformFailed {
                parsed: 12,
                message: "12 exceeds maximum 10".into()
            })
        );
    }

    #[test]
    fn test_parse_plain_integers() {
        assert_eq!(parse_int(&json!("42")), Some(42));
        assert_eq!(parse_int(&json!("  -7 ")), Some(-7));
        assert_eq!(parse_int(&json!("+5")), Some(5));
        assert_eq!(parse_int(&json!(12)), Some(12));
    }

    #[test]
    fn test_float_like_truncates_toward_zero() {
        assert_eq!(parse_int(&json!("10.9")), Some(10));
        assert_eq!(parse_int(&json!("-1.5")), Some(-1));
        assert_eq!(parse_int(&json!("3.14")), Some(3));
        assert_eq!(parse_int(&json!(3.99)), Some(3));
        assert_eq!(parse_int(&json!("1e3")), Some(1000));
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_int(&json!("abc")), None);
        assert_eq!(parse_int(&json!("")), None);
        assert_eq!(parse_int(&json!("   ")), None);
        assert_eq!(parse_int(&json!("NaN")), None);
        assert_eq!(parse_int(&json!("inf")), None);
        assert_eq!(parse_int(&json!("1e30")), None);
        assert_eq!(parse_int(&json!([1])), None);
    }

    #[test]
    fn test_coerce_missing_returns_default() {
        assert_eq!(coerce(None, Some(0), None).unwrap(), Some(0));
        assert_eq!(coerce(Some(&Value::Null), None, None).unwrap(), None);
    }

    #[test]
    fn test_coerce_failure_returns_default() {
        assert_eq!(coerce(Some(&json!("abc")), Some(0), None).unwrap(), Some(0));
        assert_eq!(coerce(Some(&json!("")), Some(-1), None).unwrap(), Some(-1));
        assert_eq!(coerce(Some(&json!("abc")), None, None).unwrap(), None);
    }

    #[test]
    fn test_coerce_applies_transform() {
        let square = |v: i64| Ok::<i64, String>(v * v);
        assert_eq!(coerce(Some(&json!("4")), None, Some(&square)).unwrap(), Some(16));

        let clamp = clamp_min(0);
        assert_eq!(coerce(Some(&json!("-3")), Some(0), Some(&clamp)).unwrap(), Some(0));
        assert_eq!(coerce(Some(&json!("10")), Some(0), Some(&clamp)).unwrap(), Some(10));
    }

    #[test]
    fn test_transform_not_applied_to_default() {
        let square = |v: i64| Ok::<i64, String>(v * v);
        assert_eq!(coerce(Some(&json!("x")), Some(3), Some(&square)).unwrap(), Some(3));
    }

    #[test]
    fn test_transform_error_surfaces() {
        let limit = at_most(100);
        let err = coerce(Some(&json!("250")), Some(0), Some(&limit)).unwrap_err();
        assert_eq!(err.value, 250);
        assert!(err.message.contains("exceeds maximum 100"));
    }

    #[test]
    fn test_strict_coercer_rejects() {
        let coercer = FieldCoercer::strict();
        assert_eq!(
            coercer.coerce(Some(&json!("oops"))).unwrap_err(),
            CoerceError::Unparseable { raw: "oops".into() }
        );
        assert_eq!(coercer.coerce(None).unwrap_err(), CoerceError::Missing);
        assert_eq!(coercer.coerce(Some(&json!("9.9"))).unwrap(), Some(9));
    }

    #[test]
    fn test_lenient_coercer_with_transform() {
        let coercer = FieldCoercer::new()
            .with_default(0)
            .with_transform(clamp_min(0));
        assert_eq!(coercer.coerce(Some(&json!("-12"))).unwrap(), Some(0));
        assert_eq!(coercer.coerce(Some(&json!("n/a"))).unwrap(), Some(0));
        assert_eq!(coercer.default_value(), Some(0));
        assert_eq!(coercer.policy(), OnFailure::UseDefault);
    }

    #[test]
    fn test_every_branch_is_observed() {
        let observer = CollectingObserver::new();
        let double = |v: i64| Ok::<i64, String>(v * 2);

        coerce_observed(None, Some(1), None, &observer).unwrap();
        coerce_observed(Some(&json!("zz")), None, None, &observer).unwrap();
        coerce_observed(Some(&json!("5")), None, Some(&double), &observer).unwrap();

        assert_eq!(
            observer.events(),
            vec![
                ValidationEvent::CoerceMissing { default: Some(1) },
                ValidationEvent::CoerceFailed { raw: "zz".into() },
                ValidationEvent::CoerceParsed {
                    raw: "5".into(),
                    parsed: 5
                },
                ValidationEvent::CoerceTransformed {
                    parsed: 5,
                    transformed: 10
                },
            ]
        );
    }

    #[test]
    fn test_on_failure_from_str() {
        assert_eq!("reject".parse::<OnFailure>().unwrap(), OnFailure::Reject);
        assert_eq!("use-default".parse::<OnFailure>().unwrap(), OnFailure::UseDefault);
        assert!("sometimes".parse::<OnFailure>().is_err());
    }
}
