//! Outbound datagram encoding.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::MAX_DATAGRAM_BYTES;
use crate::code::ResponseCode;

/// Reasons an outbound datagram is not sent.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Response could not be serialised.
    #[error("failed to serialise response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Encoded response exceeds [`MAX_DATAGRAM_BYTES`]; it is dropped rather
    /// than truncated.
    #[error("response too large: {size} bytes exceeds {max_size} byte limit")]
    Oversized {
        /// Encoded size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max_size: usize,
    },
}

/// Messages the relay sends to clients.
///
/// Every variant except [`Response::Users`] is written with a `code` field.
/// User listings are bare `{"users":[...]}` objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Request accepted.
    Ok,
    /// Request refused.
    Bad,
    /// Command kind not recognised.
    UnknownCommand,
    /// Message posted to a channel.
    ChannelMessage {
        /// Channel the message was posted to.
        channel_name: String,
        /// Display name of the author.
        sender_nickname: String,
        /// Message body.
        message: String,
    },
    /// Message addressed to the receiver.
    PrivateMessage {
        /// Display name of the author.
        sender_nickname: String,
        /// Message body.
        message: String,
    },
    /// Message addressed to every registered client.
    Broadcast {
        /// Display name of the author.
        sender_nickname: String,
        /// Message body.
        message: String,
    },
    /// Notice from the relay itself.
    SystemMessage {
        /// Notice body.
        message: String,
    },
    /// Listing of display names.
    Users(Vec<String>),
}

impl Response {
    /// Returns the code written with this response, if any.
    #[must_use]
    pub const fn code(&self) -> Option<ResponseCode> {
        match self {
            Self::Ok => Some(ResponseCode::Ok),
            Self::Bad => Some(ResponseCode::Bad),
            Self::UnknownCommand => Some(ResponseCode::UnknownCommand),
            Self::ChannelMessage { .. } => Some(ResponseCode::IncomingChannelMessage),
            Self::PrivateMessage { .. } => Some(ResponseCode::IncomingPrivateMessage),
            Self::Broadcast { .. } => Some(ResponseCode::IncomingBroadcast),
            Self::SystemMessage { .. } => Some(ResponseCode::IncomingSystemMessage),
            Self::Users(_) => None,
        }
    }

    /// Encodes the response as a datagram payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Oversized`] when the encoded payload exceeds
    /// [`MAX_DATAGRAM_BYTES`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let bytes = serde_json::to_vec(self)?;
        if bytes.len() > MAX_DATAGRAM_BYTES {
            return Err(EncodeError::Oversized {
                size: bytes.len(),
                max_size: MAX_DATAGRAM_BYTES,
            });
        }
        Ok(bytes)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(code) = self.code() {
            map.serialize_entry("code", &code.as_wire())?;
        }
        match self {
            Self::Ok | Self::Bad | Self::UnknownCommand => {}
            Self::ChannelMessage {
                channel_name,
                sender_nickname,
                message,
            } => {
                map.serialize_entry("channel_name", channel_name)?;
                map.serialize_entry("sender_nickname", sender_nickname)?;
                map.serialize_entry("message", message)?;
            }
            Self::PrivateMessage {
                sender_nickname,
                message,
            }
            | Self::Broadcast {
                sender_nickname,
                message,
            } => {
                map.serialize_entry("sender_nickname", sender_nickname)?;
                map.serialize_entry("message", message)?;
            }
            Self::SystemMessage { message } => {
                map.serialize_entry("message", message)?;
            }
            Self::Users(users) => {
                map.serialize_entry("users", users)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(response: &Response) -> String {
        String::from_utf8(response.encode().expect("encode")).expect("utf8")
    }

    #[test]
    fn status_responses_carry_only_a_code() {
        insta::assert_snapshot!(encoded(&Response::Ok), @r#"{"code":1}"#);
        insta::assert_snapshot!(encoded(&Response::Bad), @r#"{"code":2}"#);
        insta::assert_snapshot!(encoded(&Response::UnknownCommand), @r#"{"code":7}"#);
    }

    #[test]
    fn channel_message_carries_channel_and_sender() {
        let response = Response::ChannelMessage {
            channel_name: "general".into(),
            sender_nickname: "alice".into(),
            message: "hi".into(),
        };
        insta::assert_snapshot!(
            encoded(&response),
            @r#"{"code":3,"channel_name":"general","sender_nickname":"alice","message":"hi"}"#
        );
    }

    #[test]
    fn private_and_broadcast_messages_carry_sender() {
        let private = Response::PrivateMessage {
            sender_nickname: "alice".into(),
            message: "psst".into(),
        };
        let broadcast = Response::Broadcast {
            sender_nickname: "bob".into(),
            message: "hello all".into(),
        };
        insta::assert_snapshot!(
            encoded(&private),
            @r#"{"code":4,"sender_nickname":"alice","message":"psst"}"#
        );
        insta::assert_snapshot!(
            encoded(&broadcast),
            @r#"{"code":5,"sender_nickname":"bob","message":"hello all"}"#
        );
    }

    #[test]
    fn user_listings_have_no_code() {
        let response = Response::Users(vec!["alice".into(), "bob".into()]);
        assert_eq!(response.code(), None);
        insta::assert_snapshot!(encoded(&response), @r#"{"users":["alice","bob"]}"#);
    }

    #[test]
    fn oversized_responses_are_rejected_not_truncated() {
        let names = (0..200).map(|index| format!("user-{index:04}")).collect();
        let result = Response::Users(names).encode();
        assert!(matches!(
            result,
            Err(EncodeError::Oversized { max_size: 1024, .. })
        ));
    }
}
