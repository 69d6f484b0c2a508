//! Wire protocol shared by the relay daemon and its policy layer.
//!
//! Clients and the daemon exchange single UTF-8 JSON objects, one per
//! datagram, capped at [`MAX_DATAGRAM_BYTES`] in both directions. Inbound
//! objects carry an integer `command` field identifying a [`CommandKind`] plus
//! command-specific fields. Outbound objects carry an integer `code`
//! ([`ResponseCode`]) and payload fields, except user listings which carry
//! only `users`.
//!
//! ```json
//! {"command":6,"channel_name":"general","message":"hi"}
//! {"code":3,"channel_name":"general","sender_nickname":"alice","message":"hi"}
//! ```

mod code;
mod command;
mod request;
mod response;

pub use self::code::ResponseCode;
pub use self::command::{Command, CommandKind};
pub use self::request::{DecodeError, Request};
pub use self::response::{EncodeError, Response};

/// Largest encoded datagram accepted or emitted, in bytes.
pub const MAX_DATAGRAM_BYTES: usize = 1024;

/// Longest message body accepted, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 300;
