//! Per-instance change notification.
//!
//! [`Subscribers`] is the callback registry behind every observable type in
//! the crate: the root set, the pair set and each size computation own one.
//! Callbacks run synchronously on the notifying thread, in registration
//! order, after the registry lock has been released, so a callback may
//! subscribe or unsubscribe without deadlocking.
//!
//! A panicking callback is logged and skipped; the remaining callbacks still
//! receive the event.
//!
//! # Example
//!
//! ```
//! use dupdirs::notify::Subscribers;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let subscribers: Subscribers<u32> = Subscribers::new();
//! let total = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&total);
//! let id = subscribers.subscribe(move |n| {
//!     sink.fetch_add(*n as usize, Ordering::SeqCst);
//! });
//!
//! subscribers.notify(&5);
//! assert!(subscribers.unsubscribe(id));
//! subscribers.notify(&7);
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//! ```

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered registry of callbacks interested in events of type `E`.
pub struct Subscribers<E> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Subscribers<E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback<E>)>> {
        // A callback never runs while the lock is held, so a poisoned lock
        // still guards a consistent list.
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `callback`; it will run for every later event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.lock();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Whether `id` is currently registered.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.lock().iter().any(|(existing, _)| *existing == id)
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Deliver `event` to every callback registered at the time of the call.
    ///
    /// Returns the number of callbacks that completed without panicking.
    pub fn notify(&self, event: &E) -> usize {
        let snapshot: Vec<(SubscriptionId, Callback<E>)> = self.lock().clone();
        let mut delivered = 0;
        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered += 1,
                Err(_) => log::error!("Subscriber {:?} panicked while handling a change", id),
            }
        }
        delivered
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish()
    }
}
