//! IRC protocol layer: line framing, message parsing, outbound commands and
//! the TCP connection.

pub mod codec;
pub mod commands;
pub mod connection;
pub mod message;
pub mod outbound;
