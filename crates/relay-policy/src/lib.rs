//! Pluggable authorisation for the relay daemon.
//!
//! Every request from a registered client passes through a [`PolicyChain`]
//! before it is executed. A chain is an ordered list of [`Policy`] entries,
//! each bound to the command kinds it governs. Entries come from
//! configuration declarations (see [`relay_config::PolicySpec`] and the
//! [`builtin`] catalogue) or are appended in code through
//! [`PolicyChain::builder`].
//!
//! # Example
//!
//! ```
//! use relay_policy::{Decision, PolicyChain};
//! use relay_protocol::{CommandKind, Request};
//!
//! let chain = PolicyChain::builder()
//!     .with_fn("quiet-hours", [CommandKind::SendBroadcast], |_, _| Decision::Deny)
//!     .build();
//!
//! let sender = "10.0.0.7:4000".parse().expect("address");
//! let broadcast = Request::new(CommandKind::SendBroadcast);
//! let blank = Request::new(CommandKind::Blank);
//! assert_eq!(chain.authorize(sender, &broadcast), Decision::Deny);
//! assert_eq!(chain.authorize(sender, &blank), Decision::Allow);
//! ```

pub mod builtin;
mod chain;
pub mod error;
mod policy;

pub use self::chain::{PolicyChain, PolicyChainBuilder};
pub use self::error::PolicyError;
pub use self::policy::{Decision, FnPolicy, Policy};
