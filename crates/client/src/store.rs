// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Store proxies: typed local views of subscribed stores.
//!
//! [`Readable`] follows the server. [`Writable`] also writes: the local cell
//! changes at once and the new value is forwarded only if the namespace is
//! connected at that moment. Nothing is queued for later.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cell::{Cell, LocalCell, Observation};
use crate::namespace::{to_value, Namespace};
use crate::registry::Handler;

/// Values that can live in a store.
pub trait StoreValue: Serialize + DeserializeOwned + Clone + Send + 'static {}

impl<T> StoreValue for T where T: Serialize + DeserializeOwned + Clone + Send + 'static {}

/// Read-only view of a store.
pub struct Readable<T> {
    _namespace: Namespace,
    store: String,
    cell: Arc<dyn Cell<T>>,
}

impl<T: StoreValue> Readable<T> {
    pub fn store(&self) -> &str {
        &self.store
    }

    /// Latest local value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Observe the value. The observer runs with the current value first.
    pub fn observe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Observation {
        self.cell.observe(Box::new(observer))
    }
}

impl<T> fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readable")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Read-write view of a store. Clones share the same cell and subscription.
pub struct Writable<T> {
    namespace: Namespace,
    store: Arc<Mutex<String>>,
    cell: Arc<dyn Cell<T>>,
    handler: Handler,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Writable {
            namespace: self.namespace.clone(),
            store: Arc::clone(&self.store),
            cell: Arc::clone(&self.cell),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T: StoreValue> Writable<T> {
    /// Current store name; changes with [`Writable::changeto`].
    pub fn store(&self) -> String {
        self.store.lock().clone()
    }

    /// Latest local value.
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Observe the value. The observer runs with the current value first.
    pub fn observe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Observation {
        self.cell.observe(Box::new(observer))
    }

    /// Write `value` locally, and send it if connected.
    pub fn set(&self, value: T) {
        self.cell.set(value.clone());
        self.forward(&value);
    }

    /// Write `f(current)` locally, and send it if connected.
    ///
    /// `current` is always the latest local value, so concurrent local
    /// updates compose. Server updates arriving in between are not merged.
    pub fn update(&self, mut f: impl FnMut(&T) -> T) {
        let next = self.cell.update(&mut f);
        self.forward(&next);
    }

    /// Stop following the store. The cell keeps its last value.
    pub fn unsubscribe(&self) {
        let store = self.store();
        self.namespace.unsubscribe(&store);
    }

    /// Follow a different store with the same cell and handler.
    ///
    /// The cell is not reset; it changes when the new store's first Update
    /// arrives.
    pub fn changeto(&self, store: impl Into<String>, initial: T) {
        let new = store.into();
        let old = std::mem::replace(&mut *self.store.lock(), new.clone());
        self.namespace.unsubscribe(&old);
        let initial = to_value(&new, &initial).unwrap_or(Value::Null);
        self.namespace
            .subscribe_handler(&new, initial, Arc::clone(&self.handler));
    }

    fn forward(&self, value: &T) {
        let store = self.store();
        if let Some(value) = to_value(&store, value) {
            self.namespace.forward_set(&store, &value);
        }
    }
}

impl<T> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("store", &*self.store.lock())
            .finish_non_exhaustive()
    }
}

/// Handler that writes decoded updates into `cell`.
fn bind<T: StoreValue>(store: Arc<Mutex<String>>, cell: Arc<dyn Cell<T>>) -> Handler {
    Arc::new(move |value: Value| match serde_json::from_value::<T>(value) {
        Ok(value) => cell.set(value),
        Err(e) => warn!(
            "update for '{}' does not match the local type: {}",
            store.lock(),
            e
        ),
    })
}

/// With `stringify` off, inbound payloads always decode to JSON strings, so
/// only string-shaped `T` (such as `String`) receive server updates; other
/// types still send but log and drop every Update.
impl Namespace {
    /// Read-only view of `store`, starting at `initial`.
    pub fn readable<T: StoreValue>(&self, store: impl Into<String>, initial: T) -> Readable<T> {
        self.readable_with_cell(store, LocalCell::new(initial))
    }

    /// Read-only view of `store` kept in a caller-supplied cell. The cell's
    /// current value is the subscription snapshot.
    pub fn readable_with_cell<T, C>(&self, store: impl Into<String>, cell: C) -> Readable<T>
    where
        T: StoreValue,
        C: Cell<T> + 'static,
    {
        let store = store.into();
        let cell: Arc<dyn Cell<T>> = Arc::new(cell);
        let handler = bind(Arc::new(Mutex::new(store.clone())), Arc::clone(&cell));
        let initial = to_value(&store, &cell.get()).unwrap_or(Value::Null);
        self.subscribe_handler(&store, initial, handler);
        Readable {
            _namespace: self.clone(),
            store,
            cell,
        }
    }

    /// Read-write view of `store`, starting at `initial`.
    ///
    /// In raw mode only string-shaped `T` round-trip; see above.
    pub fn writable<T: StoreValue>(&self, store: impl Into<String>, initial: T) -> Writable<T> {
        self.writable_with_cell(store, LocalCell::new(initial))
    }

    /// Read-write view of `store` kept in a caller-supplied cell.
    pub fn writable_with_cell<T, C>(&self, store: impl Into<String>, cell: C) -> Writable<T>
    where
        T: StoreValue,
        C: Cell<T> + 'static,
    {
        let name = store.into();
        let store = Arc::new(Mutex::new(name.clone()));
        let cell: Arc<dyn Cell<T>> = Arc::new(cell);
        let handler = bind(Arc::clone(&store), Arc::clone(&cell));
        let initial = to_value(&name, &cell.get()).unwrap_or(Value::Null);
        self.subscribe_handler(&name, initial, Arc::clone(&handler));
        Writable {
            namespace: self.clone(),
            store,
            cell,
            handler,
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
