//! In-process stand-in for a hub, for tests.
//!
//! [`FakeHub`] listens on an ephemeral loopback port, records every request
//! it receives and answers through a handler closure. Each connection is
//! served exactly like the real hub: read one NUL-terminated request, write
//! one NUL-terminated reply, close.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::BytesMut;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Decoder;

use crate::transport::{HubAddress, NeoHubCodec};

/// How the fake hub answers one request.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Serialize the value and terminate it with NUL
    Json(Value),
    /// Send the text verbatim, terminated with NUL
    Raw(String),
    /// Wait, then answer
    Delayed(Duration, Box<FakeReply>),
    /// Close the connection without answering
    Hangup,
}

impl FakeReply {
    #[must_use]
    pub fn json(value: Value) -> Self {
        FakeReply::Json(value)
    }

    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        FakeReply::Raw(text.into())
    }

    #[must_use]
    pub fn delayed(self, delay: Duration) -> Self {
        FakeReply::Delayed(delay, Box::new(self))
    }
}

type Handler = dyn Fn(&Value) -> FakeReply + Send + Sync;

pub struct FakeHub {
    address: HubAddress,
    requests: Arc<Mutex<Vec<Value>>>,
    connections: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeHub {
    /// Start listening; `handler` sees each decoded request.
    ///
    /// Requests that are not valid JSON are recorded as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub async fn start<F>(handler: F) -> io::Result<Self>
    where
        F: Fn(&Value) -> FakeReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let handler: Arc<Handler> = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let task = {
            let requests = requests.clone();
            let connections = connections.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(stream, handler.clone(), requests.clone()));
                }
            })
        };

        Ok(Self {
            address: HubAddress::new("127.0.0.1", port),
            requests,
            connections,
            task,
        })
    }

    /// Answer every request with the same JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the loopback listener cannot be bound.
    pub async fn always(reply: Value) -> io::Result<Self> {
        Self::start(move |_| FakeReply::Json(reply.clone())).await
    }

    #[must_use]
    pub fn address(&self) -> HubAddress {
        self.address.clone()
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Command verbs received so far, in arrival order.
    #[must_use]
    pub fn verbs(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.as_object()?.keys().next().cloned())
            .collect()
    }

    /// Accepted TCP connections, including ones that never sent a request.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeHub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, handler: Arc<Handler>, requests: Arc<Mutex<Vec<Value>>>) {
    let mut codec = NeoHubCodec::new();
    let mut buf = BytesMut::new();

    let frame = loop {
        match codec.decode(&mut buf) {
            Ok(Some(frame)) => break frame,
            Ok(None) => {}
            Err(_) => return,
        }
        match stream.read_buf(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    };

    let request: Value = serde_json::from_slice(&frame).unwrap_or(Value::Null);
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request.clone());

    let mut reply = handler(&request);
    let body = loop {
        match reply {
            FakeReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            FakeReply::Json(value) => break value.to_string(),
            FakeReply::Raw(text) => break text,
            FakeReply::Hangup => return,
        }
    };

    let mut out = body.into_bytes();
    out.push(0);
    if stream.write_all(&out).await.is_ok() {
        let _ = stream.shutdown().await;
    }
}
