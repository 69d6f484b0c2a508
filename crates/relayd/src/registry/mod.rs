//! In-memory client state owned by the dispatcher.
//!
//! The [`IdentityRegistry`] binds endpoints to display names and the
//! [`ChannelRegistry`] tracks channel membership. Neither performs any I/O or
//! locking: the dispatcher owns both exclusively and handles one request at a
//! time.

mod channel;
mod identity;

pub use self::channel::{ChannelError, ChannelRegistry};
pub use self::identity::{IdentityError, IdentityRegistry};
