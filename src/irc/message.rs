//! Inbound line parser.
//!
//! Turns one raw protocol line into a [`Message`]. The grammar is deliberately
//! small, covering only what a bot needs to react to chat traffic:
//!
//! ```text
//! [":" origin SPACE] command SPACE target [SPACE argument] [SPACE marker trailing]
//! ```
//!
//! `marker` is any run of `:`, `+` and `-`. Lines that do not fit yield a
//! [`ParseFailure`] rather than a half-filled message.

use crate::error::ParseFailure;
use regex::Regex;
use std::sync::LazyLock;

static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?::(?P<nick>[^!\s]+)(?:!(?P<user>\S+))?\s+)?",
        r"(?P<command>[^:\s]\S*)\s+:?(?P<target>\S+)",
        r"(?:\s+(?P<argument>[^:+\-\s]\S*(?:\s+[^:+\-\s]\S*)*))?",
        r"(?:\s*[:+\-]+(?P<trailing>.*))?\s*$",
    ))
    .expect("line grammar is a valid regex")
});

/// Whether `c` belongs to the marker run stripped before trailing text.
pub fn is_trailing_marker(c: char) -> bool {
    matches!(c, ':' | '+' | '-')
}

/// The `nick!user@host` prefix of a line. Server prefixes have no `!`, so the
/// whole name lands in `nick` and `user` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub nick: String,
    pub user: String,
}

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub origin: Option<Origin>,
    pub command: String,
    pub target: String,
    /// Middle parameters between `target` and the trailing text, e.g. the
    /// kicked nick of a `KICK`.
    pub argument: Option<String>,
    pub trailing: Option<String>,
    pub raw: String,
}

impl Message {
    /// Sender nick, or server name for server-originated lines.
    pub fn nick(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.nick.as_str())
    }

    /// The trailing text, or an empty string when the line has none.
    pub fn text(&self) -> &str {
        self.trailing.as_deref().unwrap_or("")
    }
}

/// Parse one protocol line. A trailing CR/LF is ignored.
pub fn parse(raw: &str) -> Result<Message, ParseFailure> {
    let line = raw.trim_end_matches(['\r', '\n']);
    let caps = LINE.captures(line).ok_or_else(|| ParseFailure {
        line: line.to_string(),
    })?;

    let field = |name: &str| caps.name(name).map(|m| m.as_str().trim_end().to_string());

    let origin = field("nick").map(|nick| Origin {
        nick,
        user: field("user").unwrap_or_default(),
    });

    // Both are mandatory in the grammar; the fallback only guards against
    // a future edit to the pattern.
    let (Some(command), Some(target)) = (field("command"), field("target")) else {
        return Err(ParseFailure {
            line: line.to_string(),
        });
    };

    Ok(Message {
        origin,
        command,
        target,
        argument: field("argument"),
        trailing: field("trailing"),
        raw: line.to_string(),
    })
}
