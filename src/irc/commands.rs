//! Bot command parser.
//!
//! Chat text that starts with the configured prefix (e.g. `!greet bob`) is a
//! command invocation. The remainder is split like a shell command line, so
//! quoted arguments keep their spaces: `!say "hello world"` has one argument.

use crate::irc::message::Message;

/// A command name and its arguments, as typed after the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Split prefixed chat text into a [`ParsedCommand`].
///
/// Returns `None` if the text does not start with `prefix`, has nothing after
/// it, or has unbalanced quotes.
pub fn parse_command(prefix: char, text: &str) -> Option<ParsedCommand> {
    let rest = text.strip_prefix(prefix)?;
    let mut tokens = shlex::split(rest)?.into_iter();
    let name = tokens.next()?;
    Some(ParsedCommand {
        name,
        args: tokens.collect(),
    })
}

/// A command invocation published on the `COMMAND` signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Nick of the user who typed the command.
    pub sender: String,
    /// Where it was typed: a channel, or the bot's own nick for private
    /// messages.
    pub target: String,
    pub name: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// Build an invocation from a `PRIVMSG`. `None` if the message is not a
    /// command or has no sender.
    pub fn from_privmsg(prefix: char, message: &Message) -> Option<Self> {
        let parsed = parse_command(prefix, message.trailing.as_deref()?)?;
        Some(Self {
            sender: message.nick()?.to_string(),
            target: message.target.clone(),
            name: parsed.name,
            args: parsed.args,
        })
    }

    /// Where a reply should go: the channel for channel commands, the
    /// sender for private ones.
    pub fn reply_to(&self) -> &str {
        if is_channel(&self.target) {
            &self.target
        } else {
            &self.sender
        }
    }
}

pub fn is_channel(target: &str) -> bool {
    target.starts_with('#') || target.starts_with('&')
}
