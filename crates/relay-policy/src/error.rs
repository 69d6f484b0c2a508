//! Errors raised while assembling a policy chain.

use thiserror::Error;

/// Errors arising from policy construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// No built-in policy carries the requested name.
    #[error("unknown policy '{name}'")]
    UnknownPolicy {
        /// Name that was looked up.
        name: String,
    },

    /// The policy governs no command kinds and would never run.
    #[error("policy '{policy}' governs no command kinds")]
    NoCommands {
        /// Policy name.
        policy: String,
    },

    /// The policy requires an argument that was not supplied.
    #[error("policy '{policy}' requires an argument")]
    MissingArgument {
        /// Policy name.
        policy: String,
    },

    /// The policy takes no argument but one was supplied.
    #[error("policy '{policy}' takes no argument, got '{argument}'")]
    UnexpectedArgument {
        /// Policy name.
        policy: String,
        /// Argument that was supplied.
        argument: String,
    },

    /// The supplied argument could not be interpreted.
    #[error("invalid argument '{argument}' for policy '{policy}': {message}")]
    InvalidArgument {
        /// Policy name.
        policy: String,
        /// Argument that was supplied.
        argument: String,
        /// Human-readable description of the failure.
        message: String,
    },
}
