// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether: mirror server-held stores into local cells.
//!
//! A [`Namespace`] keeps one WebSocket connection to the server and
//! multiplexes any number of named store subscriptions over it. Each
//! subscription is exposed as a [`Readable`] or [`Writable`] proxy whose
//! value lives in a locally observable [`Cell`].
//!
//! # Features
//!
//! - One connection per namespace, retried forever at a fixed delay
//! - Every subscription replayed when the connection (re)opens
//! - Optimistic local writes, forwarded only while connected
//! - Injectable transport and cell implementations for testing
//!
//! ```no_run
//! # async fn demo() {
//! use tether::{Namespace, NamespaceConfig};
//!
//! let ns = Namespace::new(NamespaceConfig::new("sandbox").with_write_key("wk"));
//! let counter = ns.writable("counter", 0i64);
//! let _watch = counter.observe(|v| println!("counter = {}", v));
//! counter.update(|v| v + 1);
//! # }
//! ```

pub mod cell;
pub mod config;
pub mod connection;
pub mod namespace;
pub mod registry;
pub mod store;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use cell::{Cell, LocalCell, Observation, Observer};
pub use config::{ConfigError, NamespaceConfig, MIN_RETRY_DELAY};
pub use connection::{ConnectionState, SharedConnectionState};
pub use namespace::Namespace;
pub use registry::{Handler, Subscription, SubscriptionRegistry};
pub use store::{Readable, StoreValue, Writable};
pub use tether_core::{ClientMessage, Codec, ServerMessage};
pub use transport::{Transport, TransportError, TransportFuture, TransportResult, WebSocketTransport};
