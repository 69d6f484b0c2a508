//! Built-in policies selectable from configuration.

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use relay_config::PolicySpec;
use relay_protocol::{CommandKind, Request};

use crate::error::PolicyError;
use crate::policy::{Decision, Policy};

/// Name of the [`DenyHost`] policy in declarations.
pub const DENY_HOST: &str = "deny-host";

/// Name of the [`DenyAll`] policy in declarations.
pub const DENY_ALL: &str = "deny-all";

/// Refuses governed commands from one host.
#[derive(Debug, Clone)]
pub struct DenyHost {
    commands: BTreeSet<CommandKind>,
    host: IpAddr,
}

impl DenyHost {
    /// Creates a policy refusing `commands` when sent from `host`.
    ///
    /// IPv4-mapped IPv6 addresses match their IPv4 form, so a dual-stack
    /// socket cannot slip past an IPv4 declaration.
    pub fn new(commands: impl IntoIterator<Item = CommandKind>, host: IpAddr) -> Self {
        Self {
            commands: commands.into_iter().collect(),
            host: host.to_canonical(),
        }
    }
}

impl Policy for DenyHost {
    fn name(&self) -> &str {
        DENY_HOST
    }

    fn commands(&self) -> &BTreeSet<CommandKind> {
        &self.commands
    }

    fn decide(&self, sender: SocketAddr, _request: &Request) -> Decision {
        Decision::from_allowed(sender.ip().to_canonical() != self.host)
    }
}

/// Refuses every governed command, disabling it relay-wide.
#[derive(Debug, Clone)]
pub struct DenyAll {
    commands: BTreeSet<CommandKind>,
}

impl DenyAll {
    /// Creates a policy refusing `commands` from every sender.
    pub fn new(commands: impl IntoIterator<Item = CommandKind>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

impl Policy for DenyAll {
    fn name(&self) -> &str {
        DENY_ALL
    }

    fn commands(&self) -> &BTreeSet<CommandKind> {
        &self.commands
    }

    fn decide(&self, _sender: SocketAddr, _request: &Request) -> Decision {
        Decision::Deny
    }
}

/// Instantiates the built-in policy a declaration names.
///
/// # Errors
///
/// Returns [`PolicyError`] when the name is unknown, the declaration governs
/// nothing, or the argument does not suit the policy.
pub fn from_spec(spec: &PolicySpec) -> Result<Arc<dyn Policy>, PolicyError> {
    if spec.commands().is_empty() {
        return Err(PolicyError::NoCommands {
            policy: spec.name().to_owned(),
        });
    }
    let commands = spec.commands().iter().copied();

    match spec.name() {
        DENY_HOST => {
            let argument = spec.argument().ok_or_else(|| PolicyError::MissingArgument {
                policy: DENY_HOST.to_owned(),
            })?;
            let host = argument
                .parse::<IpAddr>()
                .map_err(|error| PolicyError::InvalidArgument {
                    policy: DENY_HOST.to_owned(),
                    argument: argument.to_owned(),
                    message: error.to_string(),
                })?;
            Ok(Arc::new(DenyHost::new(commands, host)))
        }
        DENY_ALL => {
            if let Some(argument) = spec.argument() {
                return Err(PolicyError::UnexpectedArgument {
                    policy: DENY_ALL.to_owned(),
                    argument: argument.to_owned(),
                });
            }
            Ok(Arc::new(DenyAll::new(commands)))
        }
        other => Err(PolicyError::UnknownPolicy {
            name: other.to_owned(),
        }),
    }
}
