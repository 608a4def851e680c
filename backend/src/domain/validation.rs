//! Required-field gate applied to request bodies before any store access.
//!
//! A field is missing when it is absent, `null`, or a string that is empty
//! once trimmed. Failures are reported one per missing field, in the order the
//! requirements were declared.

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::Error;

/// Message carried by the envelope of every validation failure.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// A field that must be present, with the message reported when it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequirement {
    /// Request field name, as clients spell it.
    pub field: &'static str,
    /// Human-readable message reported when the field is missing.
    pub message: &'static str,
}

impl FieldRequirement {
    /// Declare a required field.
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// One failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Request field name.
    #[schema(example = "surname")]
    pub field: String,
    /// Human-readable reason.
    #[schema(example = "Surname is required")]
    pub message: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<FieldRequirement> for FieldError {
    fn from(value: FieldRequirement) -> Self {
        Self::new(value.field, value.message)
    }
}

/// Request bodies that expose their fields by name.
pub trait FieldSource {
    /// Raw value of `field`, or `None` when absent or `null`.
    fn field_value(&self, field: &str) -> Option<&str>;
}

/// Whether a raw value counts as missing.
pub fn is_missing(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}

/// Check every requirement against `source`.
///
/// # Examples
/// ```
/// use roster::domain::validation::{FieldRequirement, FieldSource, require_fields};
///
/// struct Body(Option<String>);
///
/// impl FieldSource for Body {
///     fn field_value(&self, field: &str) -> Option<&str> {
///         (field == "surname").then_some(self.0.as_deref()).flatten()
///     }
/// }
///
/// let rules = [FieldRequirement::new("surname", "Surname is required")];
/// assert!(require_fields(&Body(Some("Rossi".into())), &rules).is_ok());
/// let errors = require_fields(&Body(Some("  ".into())), &rules).unwrap_err();
/// assert_eq!(errors[0].field, "surname");
/// ```
pub fn require_fields<S>(source: &S, requirements: &[FieldRequirement]) -> Result<(), Vec<FieldError>>
where
    S: FieldSource + ?Sized,
{
    let errors: Vec<FieldError> = requirements
        .iter()
        .filter(|requirement| is_missing(source.field_value(requirement.field)))
        .map(|requirement| FieldError::from(*requirement))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Wrap field errors in the `invalid_request` envelope.
///
/// The ordered errors become the envelope's `details` array.
pub fn validation_error(errors: Vec<FieldError>) -> Error {
    Error::invalid_request(VALIDATION_FAILED_MESSAGE).with_details(json!(errors))
}
