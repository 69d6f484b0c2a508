//! Command kinds carried in the `command` field of inbound datagrams.

use std::str::FromStr;

use serde_json::Number;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Stable integer enumeration of the commands a client may issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandKind {
    /// No-op keepalive; always acknowledged.
    Blank = 0,
    /// Binds a display name to the sender.
    SetNickname = 1,
    /// Releases the sender's display name.
    ForgetNickname = 2,
    /// Adds the sender to a channel, creating it when absent.
    JoinChannel = 3,
    /// Removes the sender from a channel.
    LeaveChannel = 4,
    /// Delivers a message to one named client.
    SendPrivateMessage = 5,
    /// Delivers a message to every member of a channel.
    SendChannelMessage = 6,
    /// Delivers a message to every registered client.
    SendBroadcast = 7,
    /// Lists every registered name.
    GetUserList = 8,
    /// Lists the names of a channel's members.
    GetChannelUserList = 9,
}

impl CommandKind {
    /// Maps a wire integer onto a known command kind.
    #[must_use]
    pub const fn from_wire(value: i128) -> Option<Self> {
        Some(match value {
            0 => Self::Blank,
            1 => Self::SetNickname,
            2 => Self::ForgetNickname,
            3 => Self::JoinChannel,
            4 => Self::LeaveChannel,
            5 => Self::SendPrivateMessage,
            6 => Self::SendChannelMessage,
            7 => Self::SendBroadcast,
            8 => Self::GetUserList,
            9 => Self::GetChannelUserList,
            _ => return None,
        })
    }

    /// Returns the integer written to the wire.
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        self as u8
    }

    /// Parses a command kind from configuration text.
    ///
    /// Accepts either the wire integer (`"6"`) or the snake_case name
    /// (`"send_channel_message"`, case-insensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let trimmed = token.trim();
        match trimmed.parse::<i128>() {
            Ok(value) => Self::from_wire(value),
            Err(_) => Self::from_str(trimmed).ok(),
        }
    }

    /// Iterates every command kind in wire order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// The decoded `command` field of a request.
///
/// Integers outside the known enumeration still decode; the dispatcher
/// answers them with `unknown_command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// One of the stable command kinds.
    Known(CommandKind),
    /// An integer that does not name a command kind.
    Unrecognised(i128),
}

impl Command {
    /// Decodes a JSON number, rejecting non-integers.
    #[must_use]
    pub fn from_number(number: &Number) -> Option<Self> {
        let value = number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from))?;
        Some(CommandKind::from_wire(value).map_or(Self::Unrecognised(value), Self::Known))
    }

    /// Returns the command kind when it is recognised.
    #[must_use]
    pub const fn kind(self) -> Option<CommandKind> {
        match self {
            Self::Known(kind) => Some(kind),
            Self::Unrecognised(_) => None,
        }
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Self::Known(kind)
    }
}
