// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Active subscriptions of a namespace.
//!
//! The registry is also the only record of subscriptions that still need to
//! reach the server: there is no outbound queue. Whatever is registered when
//! a connection opens is replayed, each store with the `initial` snapshot
//! captured when it was (re)subscribed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tether_core::{ClientMessage, Codec};

/// Callback invoked with the decoded value of every Update for a store.
pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

/// A store name bound to its handler and subscribe-time snapshot.
#[derive(Clone)]
pub struct Subscription {
    handler: Handler,
    initial: Value,
}

impl Subscription {
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Value captured when the store was subscribed. Later local writes do
    /// not change it.
    pub fn initial(&self) -> &Value {
        &self.initial
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

/// Map from store name to subscription. Names are unique.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: HashMap<String, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store`, replacing any previous handler and snapshot.
    ///
    /// Returns the replaced subscription, if there was one.
    pub fn insert(
        &mut self,
        store: impl Into<String>,
        initial: Value,
        handler: Handler,
    ) -> Option<Subscription> {
        self.entries
            .insert(store.into(), Subscription { handler, initial })
    }

    /// Remove `store`. Routing for it stops immediately.
    pub fn remove(&mut self, store: &str) -> Option<Subscription> {
        self.entries.remove(store)
    }

    pub fn get(&self, store: &str) -> Option<&Subscription> {
        self.entries.get(store)
    }

    /// Handler for `store`, cloned so it can be called without holding the
    /// registry.
    pub fn handler(&self, store: &str) -> Option<Handler> {
        self.entries.get(store).map(|s| Arc::clone(&s.handler))
    }

    pub fn contains(&self, store: &str) -> bool {
        self.entries.contains_key(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered store names, in no particular order.
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Subscribe messages to send when a connection opens: one per
    /// registered store, each carrying its captured snapshot.
    ///
    /// Order follows map iteration and is not meaningful.
    pub fn replay(&self, codec: &Codec) -> Vec<ClientMessage> {
        self.entries
            .iter()
            .map(|(store, sub)| codec.subscribe(store, &sub.initial))
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
