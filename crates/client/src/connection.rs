// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background connection management for a namespace.
//!
//! One task per namespace owns the transport and cycles through
//!
//! ```text
//! Disconnected -> Connecting -> Open -> Closed -> (retry delay) -> Connecting -> ...
//! ```
//!
//! forever. Lifecycle changes and inbound frames are reported to a single
//! [`EventSink`] as [`ConnectionEvent`]s; outbound frames reach the task
//! through the [`Outbox`] handed over with [`ConnectionEvent::Opened`].
//! Each open gets a fresh outbox, so frames still queued when a connection
//! closes are dropped along with it.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::transport::Transport;

/// Sending half of the live connection. Frames pushed here are written to
/// the transport in order.
pub type Outbox = mpsc::UnboundedSender<String>;

/// Lifecycle state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been attempted yet, or the manager has stopped.
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected; frames flow both ways.
    Open,
    /// The last connection closed or failed; a retry is pending.
    Closed,
}

impl ConnectionState {
    fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Closed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closed,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Connection state visible to both the background task and callers.
///
/// Uses atomic fields for lock-free reads.
pub struct SharedConnectionState {
    state: AtomicU8,
    /// Attempts since the last successful open.
    attempt: AtomicU32,
}

impl SharedConnectionState {
    /// Create a new shared state initialized to disconnected.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected.to_u8()),
            attempt: AtomicU32::new(0),
        }
    }

    /// Get the current state.
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Set the state.
    pub fn set(&self, state: ConnectionState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    /// Get the current attempt count.
    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    fn next_attempt(&self) -> u32 {
        self.attempt.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    fn reset_attempts(&self) {
        self.attempt.store(0, Ordering::Release);
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> String {
        match self.get() {
            ConnectionState::Connecting => {
                let attempt = self.attempt();
                if attempt > 1 {
                    format!("connecting (attempt {})", attempt)
                } else {
                    "connecting".to_string()
                }
            }
            state => state.to_string(),
        }
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events sent from the connection task to its sink.
pub enum ConnectionEvent {
    /// The connection is open. Carries the outbox for this connection.
    Opened(Outbox),
    /// The connection closed, failed, or could not be established.
    Closed,
    /// A text frame arrived.
    Message(String),
}

impl std::fmt::Debug for ConnectionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opened(_) => f.debug_tuple("Opened").field(&"<outbox>").finish(),
            Self::Closed => f.write_str("Closed"),
            Self::Message(text) => f.debug_tuple("Message").field(text).finish(),
        }
    }
}

/// Receiver of connection events.
///
/// Events are delivered one at a time from the connection task, in the
/// order they happened.
pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: ConnectionEvent);
}

/// Owns the transport and keeps it connected.
pub struct ConnectionManager<T: Transport> {
    target: String,
    retry_delay: Duration,
    transport: T,
    shared_state: Arc<SharedConnectionState>,
    cancel_token: CancellationToken,
}

impl<T: Transport + 'static> ConnectionManager<T> {
    /// Create a manager for `target`. Nothing happens until it is run.
    pub fn new(
        target: impl Into<String>,
        retry_delay: Duration,
        transport: T,
        shared_state: Arc<SharedConnectionState>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            target: target.into(),
            retry_delay,
            transport,
            shared_state,
            cancel_token,
        }
    }

    /// Run the connection loop on the current Tokio runtime.
    pub fn spawn(self, sink: Arc<dyn EventSink>) -> JoinHandle<()> {
        tokio::spawn(self.run(sink))
    }

    /// Connect, serve, and reconnect until cancelled.
    ///
    /// There is no retry limit: every close is followed by a new attempt
    /// after the fixed retry delay.
    pub async fn run(mut self, sink: Arc<dyn EventSink>) {
        while !self.cancel_token.is_cancelled() {
            self.serve_once(&*sink).await;

            debug!("reconnecting to {} in {:?}", self.target, self.retry_delay);
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }

        let _ = self.transport.disconnect().await;
        self.shared_state.set(ConnectionState::Disconnected);
        debug!("connection manager for {} stopped", self.target);
    }

    /// One connection lifetime: connect, pump frames until close, report.
    async fn serve_once(&mut self, sink: &dyn EventSink) {
        let attempt = self.shared_state.next_attempt();
        self.shared_state.set(ConnectionState::Connecting);
        debug!("connecting to {} (attempt {})", self.target, attempt);

        let connected = tokio::select! {
            _ = self.cancel_token.cancelled() => return,
            result = self.transport.connect(&self.target) => result,
        };

        if let Err(e) = connected {
            warn!("connection to {} failed: {}", self.target, e);
            self.shared_state.set(ConnectionState::Closed);
            sink.dispatch(ConnectionEvent::Closed);
            return;
        }

        info!("connected to {}", self.target);
        self.shared_state.set(ConnectionState::Open);
        self.shared_state.reset_attempts();

        let (outbox, mut outgoing) = mpsc::unbounded_channel::<String>();
        sink.dispatch(ConnectionEvent::Opened(outbox));

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    let _ = self.transport.disconnect().await;
                    break;
                }
                Some(frame) = outgoing.recv() => {
                    if let Err(e) = self.transport.send(frame).await {
                        warn!("send to {} failed: {}", self.target, e);
                        break;
                    }
                }
                received = self.transport.recv() => match received {
                    Ok(Some(text)) => sink.dispatch(ConnectionEvent::Message(text)),
                    Ok(None) => {
                        info!("connection to {} closed", self.target);
                        break;
                    }
                    Err(e) => {
                        warn!("connection to {} lost: {}", self.target, e);
                        break;
                    }
                },
            }
        }

        self.shared_state.set(ConnectionState::Closed);
        sink.dispatch(ConnectionEvent::Closed);
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
