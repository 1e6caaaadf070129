//! Side effects requested by handlers.
//!
//! Handlers never touch the socket or the session directly. They queue
//! [`Action`]s on their [`Context`], and the session controller carries them
//! out once the handler returns, so session state keeps a single writer.

use crate::app::event::Event;
use crate::app::state::Session;
use crate::config::BotConfig;
use crate::irc::outbound::Command;

#[derive(Debug)]
pub enum Action {
    Send(Command),
    Publish { signal: String, event: Event },
    Shutdown { reason: Option<String> },
}

/// What a handler can see and do while it runs.
pub struct Context<'a> {
    session: &'a Session,
    config: &'a BotConfig,
    actions: &'a mut Vec<Action>,
}

impl<'a> Context<'a> {
    pub fn new(session: &'a Session, config: &'a BotConfig, actions: &'a mut Vec<Action>) -> Self {
        Self {
            session,
            config,
            actions,
        }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn config(&self) -> &BotConfig {
        self.config
    }

    pub fn send(&mut self, command: Command) {
        self.actions.push(Action::Send(command));
    }

    pub fn privmsg(&mut self, target: impl Into<String>, text: impl Into<String>) {
        self.send(Command::privmsg(target, text));
    }

    pub fn join(&mut self, channel: impl Into<String>) {
        self.send(Command::Join(channel.into()));
    }

    /// Publish `event` on `signal` after the current dispatch finishes.
    pub fn publish(&mut self, signal: impl Into<String>, event: Event) {
        self.actions.push(Action::Publish {
            signal: signal.into(),
            event,
        });
    }

    /// End the session: send QUIT and close the connection.
    pub fn shutdown(&mut self, reason: Option<String>) {
        self.actions.push(Action::Shutdown { reason });
    }
}
