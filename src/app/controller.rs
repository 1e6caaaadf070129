//! Session controller: drives one connection through its lifecycle.
//!
//! ```text
//! Disconnected -> Connecting -> Registering -> Ready -> Terminated
//! ```
//!
//! `start()` connects, sends NICK/USER and identifies with the network's
//! authentication service. The service's reply is not parsed: the controller
//! waits `auth_delay` and assumes identification went through. The end of
//! the MOTD moves the session to `Ready`, which subscribes the built-in
//! handlers and joins the configured channel.
//!
//! `run()` is the read loop. Each inbound line is handled to completion,
//! including every action its handlers queue, before the next is read.

use crate::app::action::{Action, Context};
use crate::app::bus::EventBus;
use crate::app::event::Event;
use crate::app::handler;
use crate::app::registry::CommandRegistry;
use crate::app::state::{Session, SessionState};
use crate::config::BotConfig;
use crate::error::IrcError;
use crate::irc::connection::Connection;
use crate::irc::message::{self, Message};
use crate::irc::outbound::Command;
use std::collections::VecDeque;
use std::sync::Arc;

/// Consecutive send failures after which the connection is considered lost.
pub const MAX_SEND_FAILURES: u32 = 3;
/// How many times to append `_` to a nick the server says is taken.
pub const MAX_NICK_RETRIES: u32 = 5;

const RPL_WELCOME: &str = "001";
const RPL_ENDOFMOTD: &str = "376";
const ERR_NOMOTD: &str = "422";
const ERR_NICKNAMEINUSE: &str = "433";
const END_OF_MOTD_MARKER: &str = "End of /MOTD";

fn is_end_of_motd(message: &Message) -> bool {
    matches!(message.command.as_str(), RPL_ENDOFMOTD | ERR_NOMOTD)
        || message.raw.contains(END_OF_MOTD_MARKER)
}

pub struct SessionController {
    config: BotConfig,
    session: Session,
    bus: EventBus,
    registry: Arc<CommandRegistry>,
    connection: Option<Connection>,
    send_failures: u32,
    /// Why the connection dropped, if it did.
    lost: Option<String>,
}

impl SessionController {
    pub fn new(config: BotConfig, registry: CommandRegistry) -> Self {
        Self {
            session: Session::new(config.nickname.clone()),
            config,
            bus: EventBus::new(),
            registry: Arc::new(registry),
            connection: None,
            send_failures: 0,
            lost: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The bus, for subscribing additional handlers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Connect, register and identify. Only valid once, from `Disconnected`.
    pub async fn start(&mut self) -> Result<(), IrcError> {
        if self.session.state != SessionState::Disconnected {
            return Err(IrcError::InvalidState(self.session.state.name()));
        }

        self.session.transition(SessionState::Connecting);
        let connection = match Connection::connect(&self.config.server).await {
            Ok(connection) => connection,
            Err(e) => {
                self.session.transition(SessionState::Terminated);
                return Err(e);
            }
        };
        self.connection = Some(connection);
        self.session.connected = true;

        self.session.transition(SessionState::Registering);
        if let Err(e) = self.register().await {
            self.close(None).await;
            return Err(e);
        }
        Ok(())
    }

    async fn register(&mut self) -> Result<(), IrcError> {
        let nick = self.session.nickname.clone();
        self.send(Command::Nick(nick.clone())).await?;
        self.send(Command::User {
            username: nick,
            realname: self.config.realname.clone(),
        })
        .await?;

        if let Some(password) = self.config.password.clone() {
            tracing::info!(service = %self.config.auth_service, "identifying");
            let identify = Command::privmsg(
                self.config.auth_service.clone(),
                format!("identify {}", password),
            );
            self.send(identify).await?;
            tokio::time::sleep(self.config.auth_delay).await;
        }
        Ok(())
    }

    /// Read and handle lines until the session terminates.
    ///
    /// Returns `Ok(())` after a requested shutdown and
    /// [`IrcError::ConnectionLost`] when the peer closed the connection, a
    /// read failed, or sends kept failing.
    pub async fn run(&mut self) -> Result<(), IrcError> {
        loop {
            match self.session.state {
                SessionState::Terminated => {
                    return match &self.lost {
                        Some(reason) => Err(IrcError::ConnectionLost(reason.clone())),
                        None => Ok(()),
                    };
                }
                SessionState::Disconnected => {
                    return Err(IrcError::InvalidState(self.session.state.name()));
                }
                _ => {}
            }

            let connection = self.connection.as_mut().ok_or(IrcError::NotConnected)?;
            match connection.next_line().await {
                Ok(Some(line)) => self.handle_line(&line).await,
                Ok(None) => self.lose_connection("connection closed by peer".to_string()),
                Err(IrcError::ConnectionLost(reason)) => self.lose_connection(reason),
                Err(e) => self.lose_connection(e.to_string()),
            }
        }
    }

    /// Handle one inbound line: answer PING, update the session, publish
    /// the message and carry out whatever the handlers queued.
    pub async fn handle_line(&mut self, line: &str) {
        tracing::debug!("<< {}", line);
        let message = match message::parse(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "skipping line");
                return;
            }
        };

        if message.command.eq_ignore_ascii_case("PING") {
            let token = message.trailing.clone().unwrap_or_else(|| message.target.clone());
            self.send_or_log(Command::Pong(token)).await;
            return;
        }

        self.observe(&message).await;
        if self.session.state.is_terminal() {
            return;
        }

        let signal = message.command.to_ascii_uppercase();
        self.dispatch(Action::Publish {
            signal,
            event: Event::Message(message),
        })
        .await;
    }

    /// Session bookkeeping the controller does itself, before handlers see
    /// the message.
    async fn observe(&mut self, message: &Message) {
        match message.command.as_str() {
            RPL_WELCOME if !self.session.registered => {
                self.session.registered = true;
                // The server addresses us by the nick it actually accepted.
                self.session.nickname = message.target.clone();
                tracing::info!(nick = %self.session.nickname, "registered");
            }
            ERR_NICKNAMEINUSE if !self.session.registered => {
                if self.session.nick_retries >= MAX_NICK_RETRIES {
                    tracing::warn!(nick = %self.session.nickname, "nickname in use, giving up");
                } else {
                    self.session.nick_retries += 1;
                    self.session.nickname.push('_');
                    tracing::warn!(nick = %self.session.nickname, "nickname in use, retrying");
                    self.send_or_log(Command::Nick(self.session.nickname.clone())).await;
                }
            }
            "NICK" if message.nick().is_some_and(|nick| self.session.is_me(nick)) => {
                tracing::info!(from = %self.session.nickname, to = %message.target, "nick changed");
                self.session.nickname = message.target.clone();
            }
            _ => {}
        }

        if self.session.state == SessionState::Registering && is_end_of_motd(message) {
            self.enter_ready().await;
        }
    }

    async fn enter_ready(&mut self) {
        self.session.transition(SessionState::Ready);
        handler::install(&mut self.bus, Arc::clone(&self.registry));
        tracing::info!(channel = %self.config.channel, "end of MOTD, joining");
        self.send_or_log(Command::Join(self.config.channel.clone())).await;
    }

    async fn dispatch(&mut self, first: Action) {
        let mut queue = VecDeque::from([first]);
        while let Some(action) = queue.pop_front() {
            if self.session.state.is_terminal() {
                break;
            }
            match action {
                Action::Publish { signal, event } => {
                    let mut produced = Vec::new();
                    let mut ctx = Context::new(&self.session, &self.config, &mut produced);
                    let report = self.bus.publish(&signal, &mut ctx, &event);
                    tracing::trace!(
                        signal = %signal,
                        invoked = report.invoked,
                        failed = report.failed,
                        "published"
                    );
                    queue.extend(produced);
                }
                Action::Send(command) => self.send_or_log(command).await,
                Action::Shutdown { reason } => self.shutdown(reason.as_deref()).await,
            }
        }
    }

    /// Send one command. Failures are returned, not retried.
    pub async fn send(&mut self, command: Command) -> Result<(), IrcError> {
        let line = command.to_string();
        let connection = self.connection.as_mut().ok_or(IrcError::NotConnected)?;
        match connection.send_line(&line).await {
            Ok(()) => {
                self.send_failures = 0;
                if self.is_identify(&command) {
                    tracing::debug!(">> PRIVMSG {} :identify ********", self.config.auth_service);
                } else {
                    tracing::debug!(">> {}", line);
                }
                Ok(())
            }
            Err(e) => {
                if matches!(e, IrcError::Send(_)) {
                    self.send_failures += 1;
                }
                Err(e)
            }
        }
    }

    fn is_identify(&self, command: &Command) -> bool {
        matches!(command, Command::Privmsg { target, .. } if *target == self.config.auth_service)
    }

    /// Send on behalf of a handler: log failures and give up on the
    /// connection once they pile up.
    async fn send_or_log(&mut self, command: Command) {
        let verb = command.verb().to_string();
        if let Err(e) = self.send(command).await {
            tracing::warn!(command = %verb, error = %e, "send failed");
            if self.send_failures >= MAX_SEND_FAILURES {
                self.lose_connection(format!("{} consecutive send failures", self.send_failures));
            }
        }
    }

    /// Send QUIT, close the socket and terminate the session.
    pub async fn shutdown(&mut self, reason: Option<&str>) {
        tracing::info!("shutting down");
        self.close(reason).await;
    }

    async fn close(&mut self, reason: Option<&str>) {
        if let Some(mut connection) = self.connection.take() {
            connection.disconnect(reason).await;
        }
        self.session.connected = false;
        self.session.transition(SessionState::Terminated);
    }

    fn lose_connection(&mut self, reason: String) {
        tracing::warn!(%reason, "connection lost");
        self.connection = None;
        self.session.connected = false;
        self.lost = Some(reason);
        self.session.transition(SessionState::Terminated);
    }
}
