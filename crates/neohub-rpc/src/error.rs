//! Error types for the neohub-rpc crate.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::transport::CodecError;

/// Broad class of a failed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Hub unreachable, connection refused or dropped
    Connection,
    /// Round trip exceeded the configured deadline
    Timeout,
    /// Reply was not a JSON object
    Decode,
}

/// Unified error type for hub exchanges
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to resolve hub address {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to connect to hub at {address}: {source}")]
    Connect {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Connection closed before a reply was received")]
    Disconnected,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid JSON reply: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Resolve { .. }
            | Error::Connect { .. }
            | Error::Codec(_)
            | Error::Disconnected => FailureKind::Connection,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::Decode(_) => FailureKind::Decode,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
