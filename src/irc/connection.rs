//! TCP connection to one IRC server.
//!
//! Owns the socket halves, frames the inbound stream into lines with
//! [`LineCodec`] and terminates outbound lines. Once closed, by
//! [`Connection::disconnect`], by the peer or by a read error, every further
//! operation fails with [`IrcError::NotConnected`].

use crate::config::Server;
use crate::error::IrcError;
use crate::irc::codec::LineCodec;
use crate::irc::outbound::Command;
use futures::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};

pub struct Connection {
    server: Server,
    reader: Option<FramedRead<OwnedReadHalf, LineCodec>>,
    writer: Option<FramedWrite<OwnedWriteHalf, LineCodec>>,
}

impl Connection {
    pub async fn connect(server: &Server) -> Result<Self, IrcError> {
        let address = server.address();
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| IrcError::Connect {
                address: address.clone(),
                source,
            })?;
        tracing::info!(%address, "connected");

        let (read, write) = stream.into_split();
        Ok(Self {
            server: server.clone(),
            reader: Some(FramedRead::new(read, LineCodec::new())),
            writer: Some(FramedWrite::new(write, LineCodec::new())),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Send one line; the terminator is appended here. Never retries.
    pub async fn send_line(&mut self, line: &str) -> Result<(), IrcError> {
        if line.contains(['\r', '\n']) {
            return Err(IrcError::InvalidLine(line.to_string()));
        }
        let writer = self.writer.as_mut().ok_or(IrcError::NotConnected)?;
        writer.send(line).await.map_err(IrcError::Send)
    }

    /// Wait for the next complete inbound line.
    ///
    /// `Ok(None)` means the peer closed the connection. After that, or after
    /// an error, the read side is gone for good.
    pub async fn next_line(&mut self) -> Result<Option<String>, IrcError> {
        let reader = self.reader.as_mut().ok_or(IrcError::NotConnected)?;
        match reader.next().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => {
                self.reader = None;
                Err(IrcError::ConnectionLost(e.to_string()))
            }
            None => {
                self.reader = None;
                Ok(None)
            }
        }
    }

    /// Send `QUIT` (best-effort) and close the socket.
    pub async fn disconnect(&mut self, reason: Option<&str>) {
        if self.writer.is_none() {
            return;
        }

        let quit = Command::Quit(reason.map(str::to_string)).to_string();
        if let Err(e) = self.send_line(&quit).await {
            tracing::warn!(error = %e, "failed to send QUIT");
        }

        if let Some(mut writer) = self.writer.take() {
            // The codec encodes any `AsRef<str>`, so name the item type.
            if let Err(e) = SinkExt::<&str>::close(&mut writer).await {
                tracing::debug!(error = %e, "error while closing socket");
            }
        }
        self.reader = None;
        tracing::info!(server = %self.server, "disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, Server) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, Server::new("127.0.0.1").with_port(port))
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let (listener, server) = listener().await;
        drop(listener);

        let err = Connection::connect(&server).await.err().unwrap();
        assert!(matches!(err, IrcError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_send_and_receive_lines() {
        let (listener, server) = listener().await;
        let mut conn = Connection::connect(&server).await.unwrap();
        let (peer, _) = listener.accept().await.unwrap();
        let (read, mut write) = peer.into_split();
        let mut peer_lines = BufReader::new(read).lines();

        conn.send_line("NICK bot").await.unwrap();
        assert_eq!(peer_lines.next_line().await.unwrap().unwrap(), "NICK bot");

        write.write_all(b"PING :ab").await.unwrap();
        write.flush().await.unwrap();
        write.write_all(b"c\r\n:a!b@c PRIVMSG #x :hi\r\n").await.unwrap();

        assert_eq!(conn.next_line().await.unwrap().as_deref(), Some("PING :abc"));
        assert_eq!(
            conn.next_line().await.unwrap().as_deref(),
            Some(":a!b@c PRIVMSG #x :hi")
        );

        drop(write);
        drop(peer_lines);
        assert_eq!(conn.next_line().await.unwrap(), None);
        assert!(matches!(conn.next_line().await, Err(IrcError::NotConnected)));
    }

    #[tokio::test]
    async fn test_rejects_embedded_line_terminators() {
        let (listener, server) = listener().await;
        let mut conn = Connection::connect(&server).await.unwrap();
        let _peer = listener.accept().await.unwrap();

        let err = conn.send_line("PRIVMSG #x :hi\r\nQUIT").await.unwrap_err();
        assert!(matches!(err, IrcError::InvalidLine(_)));
    }

    #[tokio::test]
    async fn test_disconnect_sends_quit_then_refuses_io() {
        let (listener, server) = listener().await;
        let mut conn = Connection::connect(&server).await.unwrap();
        let (peer, _) = listener.accept().await.unwrap();
        let mut peer_lines = BufReader::new(peer).lines();

        conn.disconnect(None).await;
        assert!(!conn.is_connected());
        assert_eq!(peer_lines.next_line().await.unwrap().unwrap(), "QUIT");
        assert_eq!(peer_lines.next_line().await.unwrap(), None);

        assert!(matches!(conn.send_line("JOIN #x").await, Err(IrcError::NotConnected)));
        assert!(matches!(conn.next_line().await, Err(IrcError::NotConnected)));

        // Second disconnect is a no-op.
        conn.disconnect(None).await;
    }
}
