use neohub_types::{ProtocolDataError, UsageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Connection, timeout or decode failure after all attempts
    #[error("Hub request failed: {0}")]
    Rpc(#[from] neohub_rpc::Error),

    /// Caller-side contract violation, raised before any I/O
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Reply decoded but violates the expected domain contract
    #[error("Protocol data error: {0}")]
    Protocol(#[from] ProtocolDataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error was raised before talking to the hub.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
