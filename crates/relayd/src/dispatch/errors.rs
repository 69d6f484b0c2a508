//! Error types for refused requests.
//!
//! None of these errors reach the wire in detail: the dispatcher answers every
//! one of them with `bad`. The structured variants exist for logging.

use thiserror::Error;

use crate::registry::{ChannelError, IdentityError};

/// Reasons a command's payload field is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// Field is absent from the request.
    #[error("missing field '{field}'")]
    Missing { field: &'static str },

    /// Field is present but not a string.
    #[error("field '{field}' must be a string")]
    NotText { field: &'static str },

    /// Field is an empty string.
    #[error("field '{field}' is empty")]
    Empty { field: &'static str },

    /// Field exceeds its length limit.
    #[error("field '{field}' has {length} characters, limit is {max_length}")]
    TooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },
}

/// Reasons a well-formed command is refused.
///
/// Every variant is answered with `bad`; the detail is only logged so policy
/// and precondition failures look identical on the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// A payload field failed validation.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The identity registry refused the change.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The channel registry refused the change.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The command needs a registered sender.
    #[error("{command} requires a registered nickname")]
    NotRegistered { command: String },

    /// Registered endpoints may not take a second name.
    #[error("already registered as '{name}'")]
    AlreadyRegistered { name: String },

    /// A private message named nobody currently registered.
    #[error("no client is registered as '{name}'")]
    UnknownReceiver { name: String },

    /// A policy refused the request.
    #[error("denied by policy")]
    PolicyDenied,
}
