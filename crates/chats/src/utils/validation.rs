use crate::types::{ChatError, ChatResult};

pub const MAX_SERVER_NAME_LENGTH: usize = 100;
pub const MAX_SERVER_DESCRIPTION_LENGTH: usize = 500;

/// Trim and bound a required field.
pub fn required_text(value: &str, field: &str, max_chars: usize) -> ChatResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ChatError::validation(format!("{field} is required")));
    }
    bounded(value, field, max_chars)
}

/// Trim and bound an optional field, empty when absent.
pub fn optional_text(value: Option<&str>, field: &str, max_chars: usize) -> ChatResult<String> {
    bounded(value.unwrap_or_default().trim(), field, max_chars)
}

fn bounded(value: &str, field: &str, max_chars: usize) -> ChatResult<String> {
    if value.chars().count() > max_chars {
        return Err(ChatError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}
