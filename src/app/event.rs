use crate::irc::commands::CommandInvocation;
use crate::irc::message::Message;

/// Synthetic signal carrying bot command invocations.
pub const COMMAND_SIGNAL: &str = "COMMAND";

/// Payload delivered to event bus handlers.
#[derive(Debug, Clone)]
pub enum Event {
    /// An inbound protocol line, published under its command verb.
    Message(Message),
    /// A prefixed chat command, published under [`COMMAND_SIGNAL`].
    Command(CommandInvocation),
}

impl Event {
    pub fn message(&self) -> Option<&Message> {
        match self {
            Event::Message(m) => Some(m),
            Event::Command(_) => None,
        }
    }

    pub fn command(&self) -> Option<&CommandInvocation> {
        match self {
            Event::Command(c) => Some(c),
            Event::Message(_) => None,
        }
    }
}
