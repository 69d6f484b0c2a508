//! Channel membership.

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;

use thiserror::Error;

/// Reasons a leave is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel does not exist or the endpoint is not in it.
    #[error("{endpoint} is not a member of channel '{channel}'")]
    NotMember {
        channel: String,
        endpoint: SocketAddr,
    },
}

/// Registry of channels and their members.
///
/// Channels are created by the first join and removed when their last member
/// leaves, so no channel is ever stored empty.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, BTreeSet<SocketAddr>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `endpoint` to `channel`, creating the channel when absent.
    ///
    /// Joining a channel twice is a no-op. Returns `true` when the endpoint
    /// was not already a member.
    pub fn join(&mut self, channel: &str, endpoint: SocketAddr) -> bool {
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .insert(endpoint)
    }

    /// Removes `endpoint` from `channel`, dropping the channel once empty.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotMember`] when the channel does not exist or
    /// the endpoint is not a member.
    pub fn leave(&mut self, channel: &str, endpoint: SocketAddr) -> Result<(), ChannelError> {
        let not_member = || ChannelError::NotMember {
            channel: channel.to_owned(),
            endpoint,
        };
        let members = self.channels.get_mut(channel).ok_or_else(not_member)?;
        if !members.remove(&endpoint) {
            return Err(not_member());
        }
        if members.is_empty() {
            self.channels.remove(channel);
        }
        Ok(())
    }

    /// Returns the members of `channel`; empty when the channel is absent.
    pub fn members(&self, channel: &str) -> BTreeSet<SocketAddr> {
        self.channels.get(channel).cloned().unwrap_or_default()
    }

    /// Returns `true` when `channel` exists.
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Returns the number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` when no channel exists.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
