//! Command dispatch for decoded relay requests.
//!
//! The [`Dispatcher`] owns the identity and channel registries together with
//! the policy chain. Given a sender and a decoded request it validates the
//! payload, applies the registration rules, consults the policies and returns
//! the datagrams to send as [`Delivery`] values. Transport concerns such as
//! encoding and the size cap live in [`crate::transport`].

mod delivery;
mod dispatcher;
mod errors;
mod fields;
mod session;

pub use self::delivery::Delivery;
pub use self::dispatcher::Dispatcher;
pub use self::errors::{CommandError, FieldError};
pub use self::session::Session;
