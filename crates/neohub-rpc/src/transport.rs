//! NUL-terminated transport codec and one-shot frame exchange.
//!
//! The hub speaks one request per TCP connection. Frame format:
//! ```text
//! request:  <JSON document> 0x00 0x0D
//! reply:    <JSON document> 0x00
//! ```
//! There is no length prefix; the reader scans for the NUL terminator and
//! strips it (and only it) from the reply.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder, Framed};

use crate::error::Error;
use crate::protocol::Message;

/// Maximum reply size (1 MB)
const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Bytes appended to every outbound request
const REQUEST_TERMINATOR: &[u8] = b"\0\r";

/// Byte that ends every inbound reply
const REPLY_TERMINATOR: u8 = 0;

pub const DEFAULT_HOST: &str = "Neo-Hub";
pub const DEFAULT_PORT: u16 = 4242;

/// Where the hub listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HubAddress {
    host: String,
    port: u16,
}

impl HubAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for HubAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for HubAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Codec for NUL-terminated NeoHub frames
#[derive(Debug, Default)]
pub struct NeoHubCodec {
    /// Bytes of the buffer already searched for a terminator
    scanned: usize,
}

impl NeoHubCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for NeoHubCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let start = self.scanned.min(src.len());
        if let Some(offset) = src[start..].iter().position(|b| *b == REPLY_TERMINATOR) {
            let frame = src.split_to(start + offset).freeze();
            src.advance(1);
            self.scanned = 0;
            return Ok(Some(frame));
        }

        if src.len() > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge(src.len()));
        }

        self.scanned = src.len();
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(CodecError::Unterminated(src.len())),
        }
    }
}

impl Encoder<&Message> for NeoHubCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(item)?;

        dst.reserve(json.len() + REQUEST_TERMINATOR.len());
        dst.put_slice(&json);
        dst.put_slice(REQUEST_TERMINATOR);

        Ok(())
    }
}

/// Errors that can occur during codec operations
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame too large: {0} bytes without terminator (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Connection closed with {0} bytes of unterminated frame")]
    Unterminated(usize),
}

/// Open a connection, write `message`, read one reply frame and close.
///
/// Exactly one TCP connection lifecycle happens per call. The returned bytes
/// are the reply payload without its NUL terminator.
///
/// # Errors
///
/// Returns [`Error::Resolve`] or [`Error::Connect`] when the hub cannot be
/// reached, [`Error::Disconnected`] if the hub closes the connection before
/// sending a terminated frame, and [`Error::Codec`] on I/O failures.
pub async fn send_frame(address: &HubAddress, message: &Message) -> Result<Bytes, Error> {
    let stream = connect(address).await?;
    let mut framed = Framed::new(stream, NeoHubCodec::new());

    framed.send(message).await?;

    let frame = framed.next().await.ok_or(Error::Disconnected)??;

    let mut stream = framed.into_inner();
    if let Err(e) = stream.shutdown().await {
        tracing::debug!("Shutdown after reply from {} failed: {}", address, e);
    }

    Ok(frame)
}

async fn connect(address: &HubAddress) -> Result<TcpStream, Error> {
    let candidates: Vec<SocketAddr> = tokio::net::lookup_host((address.host(), address.port()))
        .await
        .map_err(|source| Error::Resolve {
            host: address.host().to_string(),
            source,
        })?
        .collect();

    let mut last_error = None;
    for candidate in candidates {
        match TcpStream::connect(candidate).await {
            Ok(stream) => return Ok(stream),
            Err(source) => last_error = Some((candidate, source)),
        }
    }

    match last_error {
        Some((address, source)) => Err(Error::Connect { address, source }),
        None => Err(Error::Resolve {
            host: address.host().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_appends_nul_and_cr() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(&Message::bare("FIRMWARE"), &mut buf).unwrap();

        assert_eq!(&buf[..], b"{\"FIRMWARE\":0}\0\r");
    }

    #[test]
    fn test_decode_strips_only_nul() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::from(&b"{\"result\":\"ok\"}\r\0"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(&frame[..], b"{\"result\":\"ok\"}\r");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_decode() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"{\"firmware ");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"version\": \"2139\"}");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\0");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        let reply: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(reply, json!({"firmware version": "2139"}));
    }

    #[test]
    fn test_decode_leaves_trailing_bytes() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::from(&b"{\"a\":1}\0\r"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(&frame[..], b"{\"a\":1}");
        assert_eq!(&buf[..], b"\r");
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::new();

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_with_unterminated_frame() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::from(&b"{\"a\":"[..]);

        let result = codec.decode_eof(&mut buf);
        assert!(matches!(result, Err(CodecError::Unterminated(5))));
    }

    #[test]
    fn test_frame_too_large() {
        let mut codec = NeoHubCodec::new();
        let mut buf = BytesMut::from(vec![b'x'; MAX_FRAME_SIZE + 1].as_slice());

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::FrameTooLarge(_))));
    }

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::FrameTooLarge(2_000_000);
        let msg = err.to_string();
        assert!(msg.contains("2000000"));
        assert!(msg.contains("too large"));
    }

    #[test]
    fn test_hub_address_default() {
        let address = HubAddress::default();
        assert_eq!(address.host(), "Neo-Hub");
        assert_eq!(address.port(), 4242);
        assert_eq!(address.to_string(), "Neo-Hub:4242");
    }
}
