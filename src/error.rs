//! Error types shared by the protocol layer, the session controller and the
//! configuration loader.

use std::path::PathBuf;
use thiserror::Error;

/// An inbound line that does not match the message grammar.
///
/// Never fatal: the read loop logs it and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line does not match the message grammar: {line:?}")]
pub struct ParseFailure {
    pub line: String,
}

/// Connection and session errors.
#[derive(Debug, Error)]
pub enum IrcError {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send line: {0}")]
    Send(#[source] std::io::Error),

    /// Outbound text carried a line terminator and would have split into
    /// several protocol lines.
    #[error("refusing to send line containing CR or LF: {0:?}")]
    InvalidLine(String),

    #[error("not connected")]
    NotConnected,

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("operation not valid in state {0}")]
    InvalidState(&'static str),
}

/// Startup configuration errors. All of these are raised before any network
/// activity takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid value {value:?} for `{key}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to write config to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
