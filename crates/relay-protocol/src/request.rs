//! Inbound datagram decoding.
//!
//! A datagram decodes into a [`Request`] when it fits the size cap, is valid
//! UTF-8, parses as a JSON object, and carries an integer `command` field.
//! Everything else about the payload is left for the dispatcher to validate
//! per command.

use std::str::Utf8Error;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::MAX_DATAGRAM_BYTES;
use crate::command::{Command, CommandKind};

/// Reasons an inbound datagram is discarded before dispatch.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Datagram exceeds [`MAX_DATAGRAM_BYTES`].
    #[error("datagram too large: {size} bytes exceeds {max_size} byte limit")]
    Oversized {
        /// Received size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max_size: usize,
    },

    /// Datagram is not valid UTF-8.
    #[error("datagram is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),

    /// Datagram is not valid JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Datagram is valid JSON but not an object.
    #[error("request must be a JSON object")]
    NotAnObject,

    /// The `command` field is absent or not an integer.
    #[error("request lacks an integer command field")]
    MissingCommand,
}

/// A decoded client request: the command plus its remaining fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    command: Command,
    fields: Map<String, Value>,
}

impl Request {
    /// Creates a request with no payload fields.
    #[must_use]
    pub fn new(command: impl Into<Command>) -> Self {
        Self {
            command: command.into(),
            fields: Map::new(),
        }
    }

    /// Adds a payload field, replacing any previous value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Decodes a datagram into a request.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] describing why the datagram cannot be
    /// dispatched.
    pub fn decode(datagram: &[u8]) -> Result<Self, DecodeError> {
        if datagram.len() > MAX_DATAGRAM_BYTES {
            return Err(DecodeError::Oversized {
                size: datagram.len(),
                max_size: MAX_DATAGRAM_BYTES,
            });
        }

        let text = std::str::from_utf8(datagram)?;
        let Value::Object(mut fields) = serde_json::from_str::<Value>(text)? else {
            return Err(DecodeError::NotAnObject);
        };

        let command = match fields.remove("command") {
            Some(Value::Number(number)) => Command::from_number(&number),
            _ => None,
        }
        .ok_or(DecodeError::MissingCommand)?;

        Ok(Self { command, fields })
    }

    /// Returns the decoded command.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Returns the command kind when it is recognised.
    #[must_use]
    pub const fn kind(&self) -> Option<CommandKind> {
        self.command.kind()
    }

    /// Returns a raw payload field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
