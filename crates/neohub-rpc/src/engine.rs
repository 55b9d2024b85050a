//! Request engine: deadline, retry and reply validation on top of the transport.
//!
//! Two call shapes exist:
//! - [`RequestEngine::request`] returns the decoded reply. Exhausting all
//!   attempts surfaces the last failure.
//! - [`RequestEngine::command`] compares the reply against an expected
//!   acknowledgement. A mismatch is retried like any other failure and the
//!   final outcome is a plain `false`.
//!
//! Attempts are separated by a sleep of half the timeout.

use std::num::NonZeroU32;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::protocol::{Message, Reply};
use crate::transport::{HubAddress, send_frame};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-client request settings, applied to every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    timeout: Duration,
    max_attempts: NonZeroU32,
}

impl RequestOptions {
    #[must_use]
    pub fn new(timeout: Duration, max_attempts: NonZeroU32) -> Self {
        Self {
            timeout,
            max_attempts,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: NonZeroU32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    /// Delay between two attempts of the same call.
    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.timeout / 2
    }

    /// Upper bound on how long a single call may take, saturating at
    /// [`Duration::MAX`].
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_attempts.get();
        self.timeout
            .saturating_mul(attempts)
            .saturating_add(self.backoff().saturating_mul(attempts - 1))
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, NonZeroU32::MIN)
    }
}

/// Stateless request/response engine for one hub.
///
/// Cloning is cheap and every call opens its own connection, so an engine can
/// be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct RequestEngine {
    address: HubAddress,
    options: RequestOptions,
}

impl RequestEngine {
    #[must_use]
    pub fn new(address: HubAddress, options: RequestOptions) -> Self {
        Self { address, options }
    }

    #[must_use]
    pub fn address(&self) -> &HubAddress {
        &self.address
    }

    #[must_use]
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Send `message` and return the decoded reply.
    ///
    /// # Errors
    ///
    /// Returns the failure of the last attempt once `max_attempts` attempts
    /// have failed to produce a JSON object.
    pub async fn request(&self, message: &Message) -> Result<Reply> {
        let attempts = self.options.max_attempts.get();
        let mut attempt = 1;

        loop {
            match self.exchange(message).await {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    error!(
                        "{} failed (attempt {}/{}): {}",
                        message.verb(),
                        attempt,
                        attempts,
                        e
                    );
                    if attempt >= attempts {
                        return Err(e);
                    }
                }
            }

            attempt += 1;
            tokio::time::sleep(self.options.backoff()).await;
        }
    }

    /// Send `message` and report whether the hub answered with `expected`.
    ///
    /// Never fails: transport errors, undecodable replies and unexpected
    /// replies all count as failed attempts.
    pub async fn command(&self, message: &Message, expected: &Value) -> bool {
        let attempts = self.options.max_attempts.get();

        for attempt in 1..=attempts {
            match self.exchange(message).await {
                Ok(reply) if expected.as_object() == Some(&reply) => return true,
                Ok(reply) => {
                    let reply = serde_json::Value::Object(reply);
                    error!(
                        "Unexpected reply to {} (attempt {}/{}): {}",
                        message.verb(),
                        attempt,
                        attempts,
                        reply
                    );
                }
                Err(e) => {
                    error!(
                        "{} failed (attempt {}/{}): {}",
                        message.verb(),
                        attempt,
                        attempts,
                        e
                    );
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.options.backoff()).await;
            }
        }

        false
    }

    /// One connection, one frame, under the deadline.
    async fn exchange(&self, message: &Message) -> Result<Reply> {
        debug!("Sending message to {}: {}", self.address, message);

        // Dropping the timed-out future drops (and closes) its socket
        let frame = tokio::time::timeout(self.options.timeout, send_frame(&self.address, message))
            .await
            .map_err(|_| Error::Timeout(self.options.timeout))??;

        debug!("Received message: {}", String::from_utf8_lossy(&frame));

        Ok(serde_json::from_slice(&frame)?)
    }
}
