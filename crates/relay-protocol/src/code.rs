//! Response codes carried in the `code` field of outbound datagrams.

use strum::Display;

/// Stable integer codes identifying the kind of an outbound datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseCode {
    /// The request was accepted.
    Ok = 1,
    /// The request was refused: bad payload, wrong state, or policy denial.
    Bad = 2,
    /// A message posted to a channel the receiver belongs to.
    IncomingChannelMessage = 3,
    /// A message addressed to the receiver by name.
    IncomingPrivateMessage = 4,
    /// A message addressed to every registered client.
    IncomingBroadcast = 5,
    /// A message originating from the relay itself.
    IncomingSystemMessage = 6,
    /// The command kind is not recognised.
    UnknownCommand = 7,
}

impl ResponseCode {
    /// Returns the integer written to the wire.
    #[must_use]
    pub const fn as_wire(self) -> u8 {
        self as u8
    }
}
