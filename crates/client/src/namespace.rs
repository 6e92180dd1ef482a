// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The namespace engine.
//!
//! A [`Namespace`] ties together one connection, the subscription registry
//! and the payload codec:
//!
//! ```text
//! ┌─────────────┐  subscribe/set  ┌─────────────┐  frames   ┌─────────────┐
//! │ Readable /  │────────────────►│  Namespace  │──────────►│ Connection  │
//! │ Writable    │◄────────────────│ (registry)  │◄──────────│  Manager    │
//! └─────────────┘  handler calls  └─────────────┘  events   └─────────────┘
//! ```
//!
//! Public operations never fail: sending without a live connection, bad
//! inbound frames and undecodable values are logged and dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tether_core::{ClientMessage, Codec, ServerMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::NamespaceConfig;
use crate::connection::{
    ConnectionEvent, ConnectionManager, ConnectionState, EventSink, Outbox, SharedConnectionState,
};
use crate::registry::{Handler, SubscriptionRegistry};
use crate::transport::{Transport, WebSocketTransport};

/// Handle on a namespace. Cheap to clone; all clones share one engine.
///
/// The connection task stops when the last handle (including those held by
/// store proxies) is dropped, or on [`Namespace::close`].
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

struct NamespaceInner {
    name: String,
    target: String,
    codec: Codec,
    engine: Mutex<Engine>,
    connection: Arc<SharedConnectionState>,
    cancel_token: CancellationToken,
}

/// State touched by both local calls and connection events.
struct Engine {
    /// Present exactly while a connection is open.
    outbox: Option<Outbox>,
    registry: SubscriptionRegistry,
}

impl Engine {
    fn is_ready(&self) -> bool {
        self.outbox.is_some()
    }

    /// Queue a message on the live connection, or log that there is none.
    fn send(&self, message: &ClientMessage) -> bool {
        let Some(outbox) = &self.outbox else {
            warn!(
                "no live connection, dropping {} for store '{}'",
                message.kind(),
                message.store()
            );
            return false;
        };
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(e) => {
                error!("failed to encode {}: {}", message.kind(), e);
                return false;
            }
        };
        debug!("-> {}", frame);
        if outbox.send(frame).is_err() {
            warn!(
                "connection closed before {} for store '{}' was sent",
                message.kind(),
                message.store()
            );
            return false;
        }
        true
    }
}

impl Namespace {
    /// Create a namespace that connects over WebSocket.
    ///
    /// Connecting needs a Tokio runtime; without one, or with
    /// `autoconnect` off, the namespace only keeps local state.
    pub fn new(config: NamespaceConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }

    /// Create a namespace over a custom transport.
    pub fn with_transport<T: Transport + 'static>(config: NamespaceConfig, transport: T) -> Self {
        let namespace = Namespace {
            inner: Arc::new(NamespaceInner {
                name: config.name.clone(),
                target: config.target(),
                codec: Codec::new(config.stringify),
                engine: Mutex::new(Engine {
                    outbox: None,
                    registry: SubscriptionRegistry::new(),
                }),
                connection: Arc::new(SharedConnectionState::new()),
                cancel_token: CancellationToken::new(),
            }),
        };

        if !config.autoconnect {
            debug!("namespace '{}' created without a connection", config.name);
            return namespace;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(
                "no Tokio runtime, namespace '{}' will not connect",
                config.name
            );
            return namespace;
        }

        let manager = ConnectionManager::new(
            namespace.inner.target.clone(),
            config.retry_delay(),
            transport,
            Arc::clone(&namespace.inner.connection),
            namespace.inner.cancel_token.clone(),
        );
        let sink = Arc::new(WeakSink(Arc::downgrade(&namespace.inner)));
        let _ = manager.spawn(sink);
        namespace
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Connection target, including the write key if one is set.
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    pub fn codec(&self) -> Codec {
        self.inner.codec
    }

    /// True while a connection is open.
    pub fn is_ready(&self) -> bool {
        self.inner.engine.lock().is_ready()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection.get()
    }

    /// Human-readable connection status.
    pub fn status(&self) -> String {
        self.inner.connection.status_string()
    }

    /// Subscribe `handler` to `store`.
    ///
    /// Replaces any existing subscription for the same name. The Subscribe
    /// message goes out now if connected, otherwise on the next open.
    pub fn subscribe(
        &self,
        store: &str,
        initial: Value,
        handler: impl Fn(Value) + Send + Sync + 'static,
    ) {
        self.subscribe_handler(store, initial, Arc::new(handler));
    }

    pub(crate) fn subscribe_handler(&self, store: &str, initial: Value, handler: Handler) {
        let message = self.inner.codec.subscribe(store, &initial);
        let mut engine = self.inner.engine.lock();
        engine.registry.insert(store, initial, handler);
        if engine.is_ready() {
            engine.send(&message);
        } else {
            debug!("subscribe to '{}' deferred until connected", store);
        }
    }

    /// Stop receiving updates for `store`.
    ///
    /// The entry is removed whether or not the Unsubscribe message could be
    /// sent.
    pub fn unsubscribe(&self, store: &str) {
        let mut engine = self.inner.engine.lock();
        engine.send(&ClientMessage::unsubscribe(store));
        engine.registry.remove(store);
    }

    /// Move the handler subscribed to `old` over to `new`.
    ///
    /// Returns false, and does nothing, when `old` is not subscribed.
    pub fn changeto(&self, old: &str, new: &str, initial: Value) -> bool {
        let Some(handler) = self.inner.engine.lock().registry.handler(old) else {
            warn!("cannot move '{}' to '{}': not subscribed", old, new);
            return false;
        };
        self.unsubscribe(old);
        self.subscribe_handler(new, initial, handler);
        true
    }

    /// Ask the server to adopt `value` for `store`.
    pub fn set<T: Serialize + ?Sized>(&self, store: &str, value: &T) {
        let Some(value) = to_value(store, value) else {
            return;
        };
        let message = self.inner.codec.set(store, &value);
        self.inner.engine.lock().send(&message);
    }

    /// Ask the server for an immediate Update of `store`.
    pub fn get(&self, store: &str) {
        self.inner.engine.lock().send(&ClientMessage::get(store));
    }

    /// Forward a local write if connected; otherwise it stays local.
    pub(crate) fn forward_set(&self, store: &str, value: &Value) {
        let engine = self.inner.engine.lock();
        if !engine.is_ready() {
            debug!("'{}' written locally only, not connected", store);
            return;
        }
        engine.send(&self.inner.codec.set(store, value));
    }

    /// Number of registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.engine.lock().registry.len()
    }

    /// Whether `store` is currently subscribed.
    pub fn is_subscribed(&self, store: &str) -> bool {
        self.inner.engine.lock().registry.contains(store)
    }

    /// Stop the connection task. The namespace keeps its local state but
    /// will not reconnect.
    pub fn close(&self) {
        self.inner.cancel_token.cancel();
    }

    /// Feed a connection event to the engine.
    #[cfg(test)]
    pub(crate) fn dispatch(&self, event: ConnectionEvent) {
        self.inner.dispatch(event);
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.inner.name)
            .field("target", &self.inner.target)
            .field("stringify", &self.inner.codec.stringify())
            .field("state", &self.connection_state())
            .finish()
    }
}

impl NamespaceInner {
    fn on_open(&self, outbox: Outbox) {
        let mut engine = self.engine.lock();
        engine.outbox = Some(outbox);
        let replay = engine.registry.replay(&self.codec);
        info!(
            "namespace '{}' ready, replaying {} subscription(s)",
            self.name,
            replay.len()
        );
        for message in &replay {
            engine.send(message);
        }
    }

    fn on_close(&self) {
        self.engine.lock().outbox = None;
        debug!("namespace '{}' disconnected", self.name);
    }

    fn on_message(&self, text: &str) {
        debug!("<- {}", text);
        let message = match ServerMessage::from_json(text) {
            Ok(message) => message,
            Err(e) if e.is_unknown_type() => {
                warn!("ignoring message: {}", e);
                return;
            }
            Err(e) => {
                error!("dropping malformed frame: {}", e);
                return;
            }
        };
        match message {
            ServerMessage::Update { store, value } => self.route_update(&store, &value),
        }
    }

    fn route_update(&self, store: &str, payload: &str) {
        let Some(handler) = self.engine.lock().registry.handler(store) else {
            debug!("no subscription for '{}', dropping update", store);
            return;
        };
        match self.codec.decode_value(payload) {
            Ok(value) => handler(value),
            Err(e) => warn!("undecodable value for '{}': {}", store, e),
        }
    }
}

impl EventSink for NamespaceInner {
    fn dispatch(&self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened(outbox) => self.on_open(outbox),
            ConnectionEvent::Closed => self.on_close(),
            ConnectionEvent::Message(text) => self.on_message(&text),
        }
    }
}

impl Drop for NamespaceInner {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Sink held by the connection task, so the task does not keep the
/// namespace alive.
struct WeakSink(Weak<NamespaceInner>);

impl EventSink for WeakSink {
    fn dispatch(&self, event: ConnectionEvent) {
        if let Some(inner) = self.0.upgrade() {
            inner.dispatch(event);
        }
    }
}

/// Serialize a local value, logging instead of failing.
pub(crate) fn to_value<T: Serialize + ?Sized>(store: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("cannot serialize value for '{}': {}", store, e);
            None
        }
    }
}

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;
