//! Ordered authorisation over the configured policies.
//!
//! The [`PolicyChain`] visits entries in registration order. Only entries
//! governing the request's command kind are consulted, and the first
//! [`Decision::Deny`] ends the walk. A request nothing governs, or every
//! governing entry allows, is allowed.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use relay_config::PolicySpec;
use relay_protocol::{CommandKind, Request};
use tracing::debug;

use crate::builtin;
use crate::error::PolicyError;
use crate::policy::{Decision, FnPolicy, Policy};

/// Tracing target for policy decisions.
const POLICY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::chain");

/// Immutable, ordered list of policies.
#[derive(Clone, Default)]
pub struct PolicyChain {
    entries: Vec<Arc<dyn Policy>>,
}

impl PolicyChain {
    /// Starts a builder for an empty chain.
    pub fn builder() -> PolicyChainBuilder {
        PolicyChainBuilder::default()
    }

    /// Builds a chain from configuration declarations, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] raised by a declaration.
    pub fn from_specs<'a>(
        specs: impl IntoIterator<Item = &'a PolicySpec>,
    ) -> Result<Self, PolicyError> {
        specs
            .into_iter()
            .try_fold(Self::builder(), PolicyChainBuilder::with_spec)
            .map(PolicyChainBuilder::build)
    }

    /// Authorises `request` from `sender`.
    pub fn authorize(&self, sender: SocketAddr, request: &Request) -> Decision {
        let Some(kind) = request.kind() else {
            return Decision::Allow;
        };

        for entry in self.governing(kind) {
            if !entry.decide(sender, request).is_allowed() {
                debug!(
                    target: POLICY_TARGET,
                    policy = entry.name(),
                    command = %kind,
                    %sender,
                    "policy denied request"
                );
                return Decision::Deny;
            }
        }
        Decision::Allow
    }

    /// Names of the entries, in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the chain holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn governing(&self, kind: CommandKind) -> impl Iterator<Item = &Arc<dyn Policy>> {
        self.entries
            .iter()
            .filter(move |entry| entry.commands().contains(&kind))
    }
}

impl fmt::Debug for PolicyChain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.names()).finish()
    }
}

/// Appends entries to a [`PolicyChain`] before the dispatcher is built.
#[derive(Default)]
pub struct PolicyChainBuilder {
    entries: Vec<Arc<dyn Policy>>,
}

impl PolicyChainBuilder {
    /// Appends a policy.
    pub fn with_policy(mut self, policy: impl Policy + 'static) -> Self {
        self.entries.push(Arc::new(policy));
        self
    }

    /// Appends an already shared policy.
    pub fn with_shared(mut self, policy: Arc<dyn Policy>) -> Self {
        self.entries.push(policy);
        self
    }

    /// Appends a closure-backed policy.
    pub fn with_fn<F>(
        self,
        name: impl Into<String>,
        commands: impl IntoIterator<Item = CommandKind>,
        decide: F,
    ) -> Self
    where
        F: Fn(SocketAddr, &Request) -> Decision + Send + Sync + 'static,
    {
        self.with_policy(FnPolicy::new(name, commands, decide))
    }

    /// Appends the built-in policy a declaration names.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the declaration cannot be instantiated.
    pub fn with_spec(self, spec: &PolicySpec) -> Result<Self, PolicyError> {
        Ok(self.with_shared(builtin::from_spec(spec)?))
    }

    /// Freezes the chain.
    pub fn build(self) -> PolicyChain {
        PolicyChain {
            entries: self.entries,
        }
    }
}
