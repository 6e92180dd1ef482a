// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for engine tests.
//!
//! These drive a namespace by dispatching connection events directly, so
//! tests see exactly which frames the engine queues without a running
//! connection task.

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::NamespaceConfig;
use crate::connection::ConnectionEvent;
use crate::namespace::Namespace;
use crate::transport::tests::MockRemote;

/// Route engine logs to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Namespace with no connection task.
pub fn offline_namespace(stringify: bool) -> Namespace {
    init_tracing();
    let config = NamespaceConfig::new("test")
        .with_stringify(stringify)
        .with_autoconnect(false);
    Namespace::with_transport(config, MockRemote::new().transport())
}

/// Server end of a simulated connection.
pub struct Wire {
    rx: mpsc::UnboundedReceiver<String>,
}

impl Wire {
    /// Frames queued since the last call.
    pub fn frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Frames queued since the last call, sorted for order-free comparison.
    pub fn sorted_frames(&mut self) -> Vec<String> {
        let mut frames = self.frames();
        frames.sort();
        frames
    }
}

/// Simulate the connection opening.
pub fn open(namespace: &Namespace) -> Wire {
    let (tx, rx) = mpsc::unbounded_channel();
    namespace.dispatch(ConnectionEvent::Opened(tx));
    Wire { rx }
}

/// Simulate the connection closing.
pub fn close(namespace: &Namespace) {
    namespace.dispatch(ConnectionEvent::Closed);
}

/// Simulate an inbound frame.
pub fn deliver(namespace: &Namespace, frame: &str) {
    namespace.dispatch(ConnectionEvent::Message(frame.to_string()));
}
