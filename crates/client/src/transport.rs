// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Frame transport.
//!
//! The engine only ever moves text frames; encoding and decoding happen
//! above this layer so that a malformed frame can be logged without
//! tearing the connection down. Tests swap in a channel-backed transport.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot reach {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("not connected")]
    NotConnected,

    #[error("write failed: {0}")]
    Write(String),

    #[error("read failed: {0}")]
    Read(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A duplex channel of text frames to one server endpoint.
///
/// Holds at most one connection. Calling [`Transport::connect`] again
/// abandons the previous connection without draining it.
pub trait Transport: Send + Sync {
    /// Open a connection to `url`, replacing any previous one.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Close the current connection, if any.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Send one text frame.
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()>;

    /// Receive the next text frame.
    ///
    /// Returns `None` once the connection is closed. Must be cancel safe:
    /// dropping the future before it resolves loses no frame.
    fn recv(&mut self) -> TransportFuture<'_, Option<String>>;

    fn is_connected(&self) -> bool;
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Live socket, split so reads and writes borrow independently.
struct Session {
    writer: SplitSink<Socket, Message>,
    reader: SplitStream<Socket>,
}

/// [`Transport`] over `ws://` and `wss://` using tokio-tungstenite.
#[derive(Default)]
pub struct WebSocketTransport {
    session: Option<Session>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&mut self) -> TransportResult<&mut Session> {
        self.session.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_owned();
        Box::pin(async move {
            self.session = None;
            let (socket, _response) =
                tokio_tungstenite::connect_async(url.as_str())
                    .await
                    .map_err(|e| TransportError::Connect {
                        url: url.clone(),
                        reason: e.to_string(),
                    })?;
            let (writer, reader) = socket.split();
            self.session = Some(Session { writer, reader });
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut session) = self.session.take() {
                let _ = session.writer.close().await;
            }
            Ok(())
        })
    }

    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let result = self.session()?.writer.send(Message::Text(frame.into())).await;
            result.map_err(|e| {
                self.session = None;
                TransportError::Write(e.to_string())
            })
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            loop {
                let next = self.session()?.reader.next().await;
                match next {
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                    Some(Ok(Message::Close(_))) | None => {
                        self.session = None;
                        return Ok(None);
                    }
                    // Binary frames are not part of the protocol; pings are
                    // answered by tungstenite.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        self.session = None;
                        return Err(TransportError::Read(e.to_string()));
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
pub(crate) mod tests;
