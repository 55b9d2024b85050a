//! Framing and request engine for the NeoHub TCP/JSON protocol.
//!
//! The hub accepts one JSON command per TCP connection and answers with one
//! NUL-terminated JSON object. This crate provides:
//!
//! - [`protocol`]: the single-verb [`Message`] and the decoded [`Reply`]
//! - [`transport`]: the NUL codec and the one-shot [`send_frame`] exchange
//! - [`engine`]: [`RequestEngine`] with timeout, retry and reply matching
//! - [`error`]: error types and the [`FailureKind`] classification
//!
//! # Example
//!
//! ```no_run
//! use neohub_rpc::{HubAddress, Message, RequestEngine, RequestOptions};
//!
//! # async fn example() -> Result<(), neohub_rpc::Error> {
//! let engine = RequestEngine::new(HubAddress::default(), RequestOptions::default());
//!
//! let reply = engine.request(&Message::bare("FIRMWARE")).await?;
//! println!("{:?}", reply.get("firmware version"));
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod protocol;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use engine::{DEFAULT_TIMEOUT, RequestEngine, RequestOptions};
pub use error::{Error, FailureKind, Result};
pub use protocol::{Message, Reply};
pub use transport::{CodecError, DEFAULT_HOST, DEFAULT_PORT, HubAddress, NeoHubCodec, send_frame};
