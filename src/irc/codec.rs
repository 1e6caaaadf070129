//! Line framing for the IRC byte stream.
//!
//! Inbound data has no length prefix: lines end with `\n` (normally `\r\n`)
//! and a single read may hold any number of complete lines plus a partial
//! tail. [`LineCodec`] keeps that tail in the read buffer until the rest
//! arrives and only yields complete lines.

use bytes::{BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Default cap on an inbound line. Far above the 512 bytes the protocol
/// allows, so only a misbehaving peer ever hits it.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

pub struct LineCodec {
    /// Index of the next byte to scan for a newline.
    next_index: usize,
    max_len: usize,
    /// Set while skipping the remainder of an oversized line.
    discarding: bool,
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

            let Some(offset) = newline else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        tracing::warn!(
                            max_len = self.max_len,
                            "inbound line exceeds maximum length, discarding"
                        );
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let end = self.next_index + offset;
            let line = src.split_to(end + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            let line = &line[..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            if line.len() > self.max_len {
                tracing::warn!(
                    len = line.len(),
                    max_len = self.max_len,
                    "inbound line exceeds maximum length, discarding"
                );
                continue;
            }
            return Ok(Some(String::from_utf8_lossy(line).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, io::Error> {
        // An unterminated tail at end-of-stream is not a complete line.
        let line = self.decode(src)?;
        if line.is_none() {
            src.clear();
            self.next_index = 0;
        }
        Ok(line)
    }
}

impl<T: AsRef<str>> Encoder<T> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), io::Error> {
        let line = line.as_ref();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_decode_reassembles_partial_reads() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"PING :ab");
        assert!(decode_all(&mut codec, &mut buf).is_empty());

        buf.extend_from_slice(b"c123\r\n:a!b@c PRIVMSG #x :hi\r\n:a!b@c JO");
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec!["PING :abc123".to_string(), ":a!b@c PRIVMSG #x :hi".to_string()]
        );

        buf.extend_from_slice(b"IN #x\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec![":a!b@c JOIN #x".to_string()]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_skips_empty_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"\r\n\nPING :x\r\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :x".to_string()]);
    }

    #[test]
    fn test_decode_lossy_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"NOTICE bot :caf\xe9\r\n"[..]);
        let lines = decode_all(&mut codec, &mut buf);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("NOTICE bot :caf"));
    }

    #[test]
    fn test_decode_discards_oversized_line() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::new();

        buf.extend_from_slice(&[b'x'; 20]);
        assert!(decode_all(&mut codec, &mut buf).is_empty());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"tail of junk\r\nPING :ok\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["PING :ok".to_string()]);
    }

    #[test]
    fn test_decode_eof_drops_unterminated_tail() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PING :a\r\nPART"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("PING :a".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("JOIN #rust", &mut buf).unwrap();
        codec.encode(String::from("QUIT"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"JOIN #rust\r\nQUIT\r\n");
    }
}
