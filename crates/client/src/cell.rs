// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Locally observable value cells.
//!
//! A store proxy keeps its value in a [`Cell`]. Anything that can hold a
//! value, replace it, and notify observers works; [`LocalCell`] is the
//! in-process implementation used by default.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

/// Callback notified with the cell's value.
pub type Observer<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Minimal reactive container.
pub trait Cell<T>: Send + Sync {
    /// Current value.
    fn get(&self) -> T;

    /// Replace the value and notify observers.
    fn set(&self, value: T);

    /// Register an observer. It stays registered until the returned
    /// [`Observation`] is cancelled or dropped.
    fn observe(&self, observer: Observer<T>) -> Observation;

    /// Replace the value with `f(current)` and return the new value.
    ///
    /// Implementations that can be written to from several places should
    /// make this atomic.
    fn update(&self, f: &mut dyn FnMut(&T) -> T) -> T
    where
        T: Clone,
    {
        let next = f(&self.get());
        self.set(next.clone());
        next
    }
}

/// Registration of an observer on a cell.
#[must_use = "dropping an Observation removes the observer"]
pub struct Observation {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Observation {
    /// Wrap the function that removes the observer.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Observation {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the observer now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the observer registered for the lifetime of the cell.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

struct Shared<T> {
    value: T,
    next_id: u64,
    observers: Vec<(u64, Arc<dyn Fn(&T) + Send + Sync>)>,
}

/// In-process cell.
///
/// Observers are called with the current value as soon as they register,
/// then after every write. They run outside the cell's lock, so an observer
/// may read or write the cell it observes. Update closures also run outside
/// it; concurrent updates are serialized by a separate reentrant lock.
pub struct LocalCell<T> {
    shared: Arc<Mutex<Shared<T>>>,
    updating: Arc<ReentrantMutex<()>>,
}

impl<T: Clone + Send + 'static> LocalCell<T> {
    pub fn new(value: T) -> Self {
        LocalCell {
            shared: Arc::new(Mutex::new(Shared {
                value,
                next_id: 0,
                observers: Vec::new(),
            })),
            updating: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.shared.lock().observers.len()
    }

    fn notify(&self, value: &T, observers: Vec<Arc<dyn Fn(&T) + Send + Sync>>) {
        for observer in observers {
            observer(value);
        }
    }

    fn snapshot_observers(shared: &Shared<T>) -> Vec<Arc<dyn Fn(&T) + Send + Sync>> {
        shared.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
    }
}

impl<T> Clone for LocalCell<T> {
    fn clone(&self) -> Self {
        LocalCell {
            shared: Arc::clone(&self.shared),
            updating: Arc::clone(&self.updating),
        }
    }
}

impl<T: Clone + Send + 'static> Cell<T> for LocalCell<T> {
    fn get(&self) -> T {
        self.shared.lock().value.clone()
    }

    fn set(&self, value: T) {
        let observers = {
            let mut shared = self.shared.lock();
            shared.value = value.clone();
            Self::snapshot_observers(&shared)
        };
        self.notify(&value, observers);
    }

    fn observe(&self, observer: Observer<T>) -> Observation {
        let observer: Arc<dyn Fn(&T) + Send + Sync> = Arc::from(observer);
        let (id, current) = {
            let mut shared = self.shared.lock();
            let id = shared.next_id;
            shared.next_id += 1;
            shared.observers.push((id, Arc::clone(&observer)));
            (id, shared.value.clone())
        };
        observer(&current);

        let weak = Arc::downgrade(&self.shared);
        Observation::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.lock().observers.retain(|(i, _)| *i != id);
            }
        })
    }

    fn update(&self, f: &mut dyn FnMut(&T) -> T) -> T {
        let updating = self.updating.lock();
        let current = self.shared.lock().value.clone();
        let next = f(&current);
        let observers = {
            let mut shared = self.shared.lock();
            shared.value = next.clone();
            Self::snapshot_observers(&shared)
        };
        drop(updating);
        self.notify(&next, observers);
        next
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("LocalCell")
            .field("value", &shared.value)
            .field("observers", &shared.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "cell_tests.rs"]
mod tests;
