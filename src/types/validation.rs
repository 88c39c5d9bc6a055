use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("invalid timestamp {0:?}: expected RFC 3339, YYYY-MM-DD[THH:MM[:SS]] or Unix seconds")]
    InvalidTimestamp(String),
}

/// Returns `value` unchanged unless it is the empty string.
pub fn require_non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(value)
}
