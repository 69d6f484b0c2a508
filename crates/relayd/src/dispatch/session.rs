//! Per-endpoint session state.

use std::net::SocketAddr;

use crate::registry::IdentityRegistry;

/// Registration state of an endpoint, derived from the identity registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// The endpoint holds no display name.
    Unregistered,
    /// The endpoint holds `name`.
    Registered { name: String },
}

impl Session {
    /// Derives the session state of `endpoint`.
    pub fn of(identities: &IdentityRegistry, endpoint: SocketAddr) -> Self {
        identities
            .lookup_name(endpoint)
            .map_or(Self::Unregistered, |name| Self::Registered {
                name: name.to_owned(),
            })
    }

    /// Returns `true` for [`Session::Registered`].
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}
