//! Declarative policy entries supplied through configuration.
//!
//! A declaration names a policy, the command kinds it governs, and an
//! optional argument:
//!
//! ```text
//! deny-host:blank:127.0.0.1
//! deny-all:send_broadcast+send_private_message
//! deny-host:3+6:::1
//! ```
//!
//! Command kinds are separated by `+` and may be given as wire integers or
//! snake_case names. Everything after the second `:` is the argument, so IPv6
//! addresses need no escaping.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use relay_protocol::CommandKind;
use thiserror::Error;

/// A parsed policy declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySpec {
    name: String,
    commands: BTreeSet<CommandKind>,
    argument: Option<String>,
}

impl PolicySpec {
    /// Builds a declaration programmatically.
    pub fn new(
        name: impl Into<String>,
        commands: impl IntoIterator<Item = CommandKind>,
        argument: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            commands: commands.into_iter().collect(),
            argument,
        }
    }

    /// Policy name selecting the implementation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command kinds the entry governs.
    pub fn commands(&self) -> &BTreeSet<CommandKind> {
        &self.commands
    }

    /// Policy-specific argument, if supplied.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

impl FromStr for PolicySpec {
    type Err = PolicySpecError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.trim().splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(PolicySpecError::MissingName(input.to_owned()));
        }

        let command_list = parts
            .next()
            .map(str::trim)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| PolicySpecError::MissingCommands(input.to_owned()))?;

        let commands = command_list
            .split('+')
            .map(|token| {
                CommandKind::from_token(token).ok_or_else(|| PolicySpecError::UnknownCommand {
                    token: token.trim().to_owned(),
                    spec: input.to_owned(),
                })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        let argument = parts
            .next()
            .map(str::trim)
            .filter(|argument| !argument.is_empty())
            .map(str::to_owned);

        Ok(Self {
            name: name.to_owned(),
            commands,
            argument,
        })
    }
}

impl fmt::Display for PolicySpec {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let commands = self
            .commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+");
        write!(formatter, "{}:{commands}", self.name)?;
        if let Some(argument) = &self.argument {
            write!(formatter, ":{argument}")?;
        }
        Ok(())
    }
}

/// Errors encountered while parsing a [`PolicySpec`] from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicySpecError {
    /// Declaration has no policy name.
    #[error("policy declaration '{0}' has no policy name")]
    MissingName(String),
    /// Declaration governs no command kinds.
    #[error("policy declaration '{0}' lists no command kinds")]
    MissingCommands(String),
    /// A command token is neither a known integer nor a known name.
    #[error("unknown command kind '{token}' in policy declaration '{spec}'")]
    UnknownCommand { token: String, spec: String },
}
