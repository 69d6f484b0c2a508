//! The per-request command state machine.
//!
//! Each endpoint is either [`Session::Unregistered`] or
//! [`Session::Registered`]. Unregistered endpoints may only register, send
//! the blank command, or (uselessly) ask to forget. Registered endpoints pass
//! through the [`PolicyChain`] before their command executes against the
//! registries. Every outcome is a list of [`Delivery`] values; the dispatcher
//! itself performs no I/O.

use std::net::SocketAddr;

use relay_policy::PolicyChain;
use relay_protocol::{Command, CommandKind, Request, Response};
use tracing::{debug, info};

use super::delivery::Delivery;
use super::errors::CommandError;
use super::fields::{self, CHANNEL_NAME, NICKNAME, RECEIVER};
use super::session::Session;
use crate::registry::{ChannelRegistry, IdentityRegistry};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Executes decoded requests against the relay's client state.
#[derive(Debug, Default)]
pub struct Dispatcher {
    identities: IdentityRegistry,
    channels: ChannelRegistry,
    policies: PolicyChain,
}

impl Dispatcher {
    /// Creates a dispatcher with empty registries guarded by `policies`.
    pub fn new(policies: PolicyChain) -> Self {
        Self {
            identities: IdentityRegistry::new(),
            channels: ChannelRegistry::new(),
            policies,
        }
    }

    /// Registered identities.
    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// Channel memberships.
    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// Session state of `endpoint`.
    pub fn session(&self, endpoint: SocketAddr) -> Session {
        Session::of(&self.identities, endpoint)
    }

    /// Handles one request from `sender` to completion.
    ///
    /// Returns the datagrams to send, in order: notifications first, then the
    /// reply to the sender. State is only modified when the request succeeds.
    pub fn handle(&mut self, sender: SocketAddr, request: &Request) -> Vec<Delivery> {
        debug!(
            target: DISPATCH_TARGET,
            %sender,
            command = %describe(request.command()),
            "dispatching request"
        );

        let outcome = match self.session(sender) {
            Session::Unregistered => self.handle_unregistered(sender, request),
            Session::Registered { name } => self.handle_registered(sender, &name, request),
        };

        outcome.unwrap_or_else(|error| {
            debug!(
                target: DISPATCH_TARGET,
                %sender,
                %error,
                "request refused"
            );
            reply(sender, Response::Bad)
        })
    }

    fn handle_unregistered(
        &mut self,
        sender: SocketAddr,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        match request.kind() {
            Some(CommandKind::Blank) => Ok(reply(sender, Response::Ok)),
            Some(CommandKind::SetNickname) => self.set_nickname(sender, request),
            _ => Err(CommandError::NotRegistered {
                command: describe(request.command()),
            }),
        }
    }

    fn handle_registered(
        &mut self,
        sender: SocketAddr,
        name: &str,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        if !self.policies.authorize(sender, request).is_allowed() {
            return Err(CommandError::PolicyDenied);
        }

        let Command::Known(kind) = request.command() else {
            return Ok(reply(sender, Response::UnknownCommand));
        };

        match kind {
            CommandKind::Blank => Ok(reply(sender, Response::Ok)),
            CommandKind::SetNickname => Err(CommandError::AlreadyRegistered {
                name: name.to_owned(),
            }),
            CommandKind::ForgetNickname => self.forget_nickname(sender),
            CommandKind::JoinChannel => self.join_channel(sender, request),
            CommandKind::LeaveChannel => self.leave_channel(sender, request),
            CommandKind::SendPrivateMessage => self.send_private_message(sender, name, request),
            CommandKind::SendChannelMessage => self.send_channel_message(sender, name, request),
            CommandKind::SendBroadcast => self.send_broadcast(sender, name, request),
            CommandKind::GetUserList => Ok(reply(
                sender,
                Response::Users(self.identities.all_names()),
            )),
            CommandKind::GetChannelUserList => self.get_channel_user_list(sender, request),
        }
    }

    fn set_nickname(
        &mut self,
        sender: SocketAddr,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let nickname = fields::text(request, NICKNAME)?;
        self.identities.register(sender, nickname)?;
        info!(
            target: DISPATCH_TARGET,
            %sender,
            nickname,
            "client registered"
        );
        Ok(reply(sender, Response::Ok))
    }

    fn forget_nickname(&mut self, sender: SocketAddr) -> Result<Vec<Delivery>, CommandError> {
        let nickname = self.identities.forget(sender)?;
        info!(
            target: DISPATCH_TARGET,
            %sender,
            nickname = %nickname,
            "client released nickname"
        );
        Ok(reply(sender, Response::Ok))
    }

    fn join_channel(
        &mut self,
        sender: SocketAddr,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let channel = fields::text(request, CHANNEL_NAME)?;
        if self.channels.join(channel, sender) {
            debug!(target: DISPATCH_TARGET, %sender, channel, "joined channel");
        }
        Ok(reply(sender, Response::Ok))
    }

    fn leave_channel(
        &mut self,
        sender: SocketAddr,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let channel = fields::text(request, CHANNEL_NAME)?;
        self.channels.leave(channel, sender)?;
        debug!(target: DISPATCH_TARGET, %sender, channel, "left channel");
        Ok(reply(sender, Response::Ok))
    }

    fn send_private_message(
        &self,
        sender: SocketAddr,
        name: &str,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let message = fields::message(request)?;
        let receiver = fields::text(request, RECEIVER)?;
        let target = self
            .identities
            .lookup_endpoint(receiver)
            .ok_or_else(|| CommandError::UnknownReceiver {
                name: receiver.to_owned(),
            })?;

        Ok(vec![
            Delivery::new(
                target,
                Response::PrivateMessage {
                    sender_nickname: name.to_owned(),
                    message: message.to_owned(),
                },
            ),
            Delivery::new(sender, Response::Ok),
        ])
    }

    fn send_channel_message(
        &self,
        sender: SocketAddr,
        name: &str,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let channel = fields::text(request, CHANNEL_NAME)?;
        let message = fields::message(request)?;
        let notification = Response::ChannelMessage {
            channel_name: channel.to_owned(),
            sender_nickname: name.to_owned(),
            message: message.to_owned(),
        };

        Ok(fan_out(
            self.channels.members(channel),
            &notification,
            sender,
        ))
    }

    fn send_broadcast(
        &self,
        sender: SocketAddr,
        name: &str,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let message = fields::message(request)?;
        let notification = Response::Broadcast {
            sender_nickname: name.to_owned(),
            message: message.to_owned(),
        };

        Ok(fan_out(self.identities.endpoints(), &notification, sender))
    }

    fn get_channel_user_list(
        &self,
        sender: SocketAddr,
        request: &Request,
    ) -> Result<Vec<Delivery>, CommandError> {
        let channel = fields::text(request, CHANNEL_NAME)?;
        let names = self
            .channels
            .members(channel)
            .into_iter()
            .filter_map(|member| self.identities.lookup_name(member))
            .map(str::to_owned)
            .collect();
        Ok(reply(sender, Response::Users(names)))
    }
}

fn reply(to: SocketAddr, response: Response) -> Vec<Delivery> {
    vec![Delivery::new(to, response)]
}

/// Addresses `notification` to every recipient, then acknowledges `sender`.
fn fan_out(
    recipients: impl IntoIterator<Item = SocketAddr>,
    notification: &Response,
    sender: SocketAddr,
) -> Vec<Delivery> {
    let mut deliveries: Vec<Delivery> = recipients
        .into_iter()
        .map(|recipient| Delivery::new(recipient, notification.clone()))
        .collect();
    deliveries.push(Delivery::new(sender, Response::Ok));
    deliveries
}

fn describe(command: Command) -> String {
    match command {
        Command::Known(kind) => kind.to_string(),
        Command::Unrecognised(value) => format!("command {value}"),
    }
}
