//! Payload field extraction for field-bearing commands.

use relay_protocol::{MAX_MESSAGE_CHARS, Request};
use serde_json::Value;

use super::errors::FieldError;

pub(crate) const NICKNAME: &str = "nickname";
pub(crate) const CHANNEL_NAME: &str = "channel_name";
pub(crate) const MESSAGE: &str = "message";
pub(crate) const RECEIVER: &str = "receiver";

/// Returns a required, non-empty string field.
pub(crate) fn text<'r>(request: &'r Request, field: &'static str) -> Result<&'r str, FieldError> {
    match request.field(field) {
        None => Err(FieldError::Missing { field }),
        Some(Value::String(text)) if text.is_empty() => Err(FieldError::Empty { field }),
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(_) => Err(FieldError::NotText { field }),
    }
}

/// Returns the `message` field, enforcing the character limit.
pub(crate) fn message(request: &Request) -> Result<&str, FieldError> {
    let message = text(request, MESSAGE)?;
    let length = message.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Err(FieldError::TooLong {
            field: MESSAGE,
            length,
            max_length: MAX_MESSAGE_CHARS,
        });
    }
    Ok(message)
}
