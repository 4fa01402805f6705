//! Required-header check.

use std::collections::BTreeSet;

use crate::error::HeaderError;
use crate::logs::{ValidationEvent, ValidationObserver};

/// Fail if any `required` header is absent from `actual`.
///
/// Order-insensitive; unexpected extra headers are never an error. Missing
/// names are reported sorted and deduplicated.
///
/// # Example
/// ```
/// use rowcheck::validate_headers;
///
/// assert!(validate_headers(&["id", "name"], &["name", "id", "extra"]).is_ok());
///
/// let err = validate_headers(&["id", "name", "age"], &["id"]).unwrap_err();
/// assert_eq!(err.to_string(), "Missing required headers: age, name");
/// ```
pub fn validate_headers<R, A>(required: &[R], actual: &[A]) -> Result<(), HeaderError>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    validate_headers_with(required, actual, &crate::logs::TracingObserver)
}

/// [`validate_headers`] reporting to an explicit observer.
pub fn validate_headers_with<R, A>(
    required: &[R],
    actual: &[A],
    observer: &dyn ValidationObserver,
) -> Result<(), HeaderError>
where
    R: AsRef<str>,
    A: AsRef<str>,
{
    let actual_set: BTreeSet<&str> = actual.iter().map(AsRef::as_ref).collect();

    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !actual_set.contains(name))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        observer.observe(&ValidationEvent::HeadersPresent {
            required: required.len(),
            actual: actual.len(),
        });
        return Ok(());
    }

    observer.observe(&ValidationEvent::HeadersMissing {
        missing: missing.clone(),
    });
    Err(HeaderError { missing })
}
