//! Outbound protocol commands.

use std::fmt;

/// A command the bot sends to the server. `Display` renders the wire form
/// without the line terminator; the codec appends that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nick(String),
    User { username: String, realname: String },
    Privmsg { target: String, text: String },
    Join(String),
    Pong(String),
    Quit(Option<String>),
    Raw(String),
}

impl Command {
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::Privmsg {
            target: target.into(),
            text: text.into(),
        }
    }

    /// The verb, for logging.
    pub fn verb(&self) -> &str {
        match self {
            Command::Nick(_) => "NICK",
            Command::User { .. } => "USER",
            Command::Privmsg { .. } => "PRIVMSG",
            Command::Join(_) => "JOIN",
            Command::Pong(_) => "PONG",
            Command::Quit(_) => "QUIT",
            Command::Raw(raw) => raw.split(' ').next().unwrap_or(""),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Nick(nick) => write!(f, "NICK {}", nick),
            // Mode 0, unused field '*'.
            Command::User { username, realname } => write!(f, "USER {} 0 * :{}", username, realname),
            Command::Privmsg { target, text } => write!(f, "PRIVMSG {} :{}", target, text),
            Command::Join(channel) => write!(f, "JOIN {}", channel),
            Command::Pong(token) => write!(f, "PONG :{}", token),
            Command::Quit(None) => f.write_str("QUIT"),
            Command::Quit(Some(reason)) => write!(f, "QUIT :{}", reason),
            Command::Raw(raw) => f.write_str(raw),
        }
    }
}
