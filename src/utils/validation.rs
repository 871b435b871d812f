use crate::error::{Error, Result};

/// Returns the trimmed text, or a bad-request error naming the field.
pub fn require_non_blank<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(Error::BadRequest(format!("{} required", field))),
    }
}
