//! The policy extension point.

use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;

use relay_protocol::{CommandKind, Request};

/// Outcome of a policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    /// The request may proceed.
    Allow,
    /// The request is refused.
    Deny,
}

impl Decision {
    /// Maps a boolean verdict onto a decision.
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }

    /// Returns `true` when the request may proceed.
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// An authorisation rule bound to a set of command kinds.
///
/// Implementations are shared read-only across every request for the process
/// lifetime. `decide` must be a pure function of the sender and the request;
/// it is only invoked for requests whose kind is in [`Policy::commands`].
pub trait Policy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Command kinds this policy governs.
    fn commands(&self) -> &BTreeSet<CommandKind>;

    /// Decides whether `sender` may issue `request`.
    fn decide(&self, sender: SocketAddr, request: &Request) -> Decision;
}

/// Policy backed by a closure.
///
/// # Example
///
/// ```
/// use relay_policy::{Decision, FnPolicy, Policy};
/// use relay_protocol::{CommandKind, Request};
///
/// let quiet = FnPolicy::new("no-broadcast", [CommandKind::SendBroadcast], |_, _| {
///     Decision::Deny
/// });
/// let sender = "10.0.0.2:4000".parse().expect("address");
/// let request = Request::new(CommandKind::SendBroadcast);
/// assert_eq!(quiet.decide(sender, &request), Decision::Deny);
/// ```
pub struct FnPolicy<F> {
    name: String,
    commands: BTreeSet<CommandKind>,
    decide: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(SocketAddr, &Request) -> Decision + Send + Sync,
{
    /// Wraps `decide` as a policy governing `commands`.
    pub fn new(
        name: impl Into<String>,
        commands: impl IntoIterator<Item = CommandKind>,
        decide: F,
    ) -> Self {
        Self {
            name: name.into(),
            commands: commands.into_iter().collect(),
            decide,
        }
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(SocketAddr, &Request) -> Decision + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn commands(&self) -> &BTreeSet<CommandKind> {
        &self.commands
    }

    fn decide(&self, sender: SocketAddr, request: &Request) -> Decision {
        (self.decide)(sender, request)
    }
}

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FnPolicy")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
