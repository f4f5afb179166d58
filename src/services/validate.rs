//! Form field helpers shared by the services.

use crate::error::FieldError;

/// Trimmed value of a required text field.
///
/// # Errors
///
/// Returns a [`FieldError`] when the value is blank.
pub fn required(field: &'static str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "required"));
    }
    Ok(trimmed.to_owned())
}

/// Trimmed value of an optional text field; blank becomes `None`.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Phone numbers: digits plus common separators, 10 to 15 digits in total.
///
/// # Errors
///
/// Returns a [`FieldError`] when the value is blank, contains other
/// characters, or has the wrong number of digits.
pub fn phone(field: &'static str, value: &str) -> Result<String, FieldError> {
    let trimmed = required(field, value)?;
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
    {
        return Err(FieldError::new(field, "invalid characters"));
    }
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    if !(10..=15).contains(&digits) {
        return Err(FieldError::new(field, "must contain 10 to 15 digits"));
    }
    Ok(trimmed)
}
