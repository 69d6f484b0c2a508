//! Bidirectional endpoint and display-name bindings.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;

use thiserror::Error;

/// Reasons a registration or release is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Names must contain at least one character.
    #[error("display name is empty")]
    EmptyName,
    /// Another endpoint already holds the name.
    #[error("display name '{name}' is already taken")]
    NameTaken { name: String },
    /// The endpoint already holds a name.
    #[error("{endpoint} is already registered as '{name}'")]
    AlreadyRegistered { endpoint: SocketAddr, name: String },
    /// The endpoint holds no name.
    #[error("{endpoint} is not registered")]
    NotRegistered { endpoint: SocketAddr },
}

/// Registry of display names keyed by endpoint, with a reverse index.
///
/// Both maps are updated together so the binding stays one-to-one: every
/// registered endpoint has exactly one name and no name is held twice.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    by_endpoint: HashMap<SocketAddr, String>,
    by_name: BTreeMap<String, SocketAddr>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the name is empty or taken, or the
    /// endpoint already holds a name. The registry is unchanged on error.
    pub fn register(&mut self, endpoint: SocketAddr, name: &str) -> Result<(), IdentityError> {
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        if let Some(existing) = self.by_endpoint.get(&endpoint) {
            return Err(IdentityError::AlreadyRegistered {
                endpoint,
                name: existing.clone(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(IdentityError::NameTaken {
                name: name.to_owned(),
            });
        }

        self.by_endpoint.insert(endpoint, name.to_owned());
        self.by_name.insert(name.to_owned(), endpoint);
        Ok(())
    }

    /// Releases the name held by `endpoint`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotRegistered`] when the endpoint holds no
    /// name.
    pub fn forget(&mut self, endpoint: SocketAddr) -> Result<String, IdentityError> {
        let name = self
            .by_endpoint
            .remove(&endpoint)
            .ok_or(IdentityError::NotRegistered { endpoint })?;
        self.by_name.remove(&name);
        Ok(name)
    }

    /// Returns the name held by `endpoint`.
    pub fn lookup_name(&self, endpoint: SocketAddr) -> Option<&str> {
        self.by_endpoint.get(&endpoint).map(String::as_str)
    }

    /// Returns the endpoint holding `name`.
    pub fn lookup_endpoint(&self, name: &str) -> Option<SocketAddr> {
        self.by_name.get(name).copied()
    }

    /// Returns every registered name in lexicographic order.
    pub fn all_names(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    /// Iterates every registered endpoint.
    pub fn endpoints(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.by_name.values().copied()
    }

    /// Returns `true` when `endpoint` holds a name.
    pub fn contains(&self, endpoint: SocketAddr) -> bool {
        self.by_endpoint.contains_key(&endpoint)
    }

    /// Returns the number of registered endpoints.
    pub fn len(&self) -> usize {
        self.by_endpoint.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_endpoint.is_empty()
    }
}
