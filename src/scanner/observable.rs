//! Background size computation with completion notification.
//!
//! A [`SizeObservable`] starts out [`SizeState::Pending`]. Once started it
//! measures its directory on the rayon global pool, stores the result and
//! notifies every subscriber exactly once. There is no cancellation: an owner
//! that no longer cares calls [`SizeObservable::detach`], and a completion
//! that arrives after that is dropped silently.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::notify::{SubscriptionId, Subscribers};

use super::size::{measure, SizeFormat, SIZE_PLACEHOLDER};

/// Display string for a directory that did not exist when measured.
const ABSENT_DISPLAY: &str = "0 B";

/// Progress of one size computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeState {
    /// Not computed yet
    Pending,
    /// Computed total
    Computed {
        /// Total bytes
        bytes: u64,
        /// `bytes` rendered with the observable's [`SizeFormat`]
        display: String,
    },
    /// The directory did not exist at computation time
    Absent,
}

impl SizeState {
    /// Whether the computation has not finished.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Size in bytes once known; an absent directory counts as zero.
    #[must_use]
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Pending => None,
            Self::Computed { bytes, .. } => Some(*bytes),
            Self::Absent => Some(0),
        }
    }

    /// Text to show for this state.
    #[must_use]
    pub fn display(&self) -> &str {
        match self {
            Self::Pending => SIZE_PLACEHOLDER,
            Self::Computed { display, .. } => display,
            Self::Absent => ABSENT_DISPLAY,
        }
    }
}

/// Delivered to subscribers when a computation completes.
#[derive(Debug, Clone)]
pub struct SizeEvent {
    /// Directory that was measured
    pub path: PathBuf,
    /// Final state (never `Pending`)
    pub state: SizeState,
}

struct Shared {
    path: PathBuf,
    format: SizeFormat,
    state: Mutex<SizeState>,
    ready: Condvar,
    started: AtomicBool,
    detached: AtomicBool,
    subscribers: Subscribers<SizeEvent>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SizeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, measured: Option<u64>) {
        if self.detached.load(Ordering::SeqCst) {
            log::trace!("Dropping size of detached {}", self.path.display());
            return;
        }

        let state = match measured {
            Some(bytes) => SizeState::Computed {
                bytes,
                display: self.format.format(bytes),
            },
            None => SizeState::Absent,
        };

        {
            let mut current = self.state();
            if !current.is_pending() {
                return;
            }
            *current = state.clone();
        }
        self.ready.notify_all();

        log::debug!("Size of {}: {}", self.path.display(), state.display());
        self.subscribers.notify(&SizeEvent {
            path: self.path.clone(),
            state,
        });
    }
}

/// One directory's size, computed in the background.
///
/// Clones share the same computation, state and subscribers.
#[derive(Clone)]
pub struct SizeObservable {
    shared: Arc<Shared>,
}

impl SizeObservable {
    /// Create a pending observable without starting the computation.
    ///
    /// Subscribe first, then call [`SizeObservable::start`], to be sure no
    /// completion is missed.
    #[must_use]
    pub fn pending(path: impl AsRef<Path>, format: SizeFormat) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.as_ref().to_path_buf(),
                format,
                state: Mutex::new(SizeState::Pending),
                ready: Condvar::new(),
                started: AtomicBool::new(false),
                detached: AtomicBool::new(false),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Create an observable and immediately start measuring.
    #[must_use]
    pub fn spawn(path: impl AsRef<Path>, format: SizeFormat) -> Self {
        let observable = Self::pending(path, format);
        observable.start();
        observable
    }

    /// Schedule the measurement on the rayon global pool.
    ///
    /// Only the first call schedules anything.
    pub fn start(&self) {
        if self.shared.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        rayon::spawn(move || {
            let measured = measure(&shared.path);
            shared.complete(measured);
        });
    }

    /// Measure on the calling thread (no-op once started elsewhere).
    pub fn compute_blocking(&self) {
        if self.shared.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.complete(measure(&self.shared.path));
    }

    /// Directory being measured.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SizeState {
        self.shared.state().clone()
    }

    /// Size in bytes once known.
    #[must_use]
    pub fn bytes(&self) -> Option<u64> {
        self.shared.state().bytes()
    }

    /// Text to show right now: the placeholder while pending.
    #[must_use]
    pub fn display(&self) -> String {
        self.shared.state().display().to_string()
    }

    /// Register a completion callback.
    ///
    /// Callbacks run on the pool thread that finished the measurement.
    /// Subscribing after completion does not replay the event; read
    /// [`SizeObservable::state`] instead.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SizeEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(callback)
    }

    /// Remove a completion callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.unsubscribe(id)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.is_subscribed(id)
    }

    /// Mark the owner as gone; a later completion changes nothing and
    /// notifies nobody.
    pub fn detach(&self) {
        self.shared.detached.store(true, Ordering::SeqCst);
    }

    /// Whether [`SizeObservable::detach`] was called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.shared.detached.load(Ordering::SeqCst)
    }

    /// Whether `self` and `other` are clones of one computation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Block until the computation leaves `Pending` or `timeout` elapses,
    /// returning the state at that point.
    pub fn wait_timeout(&self, timeout: Duration) -> SizeState {
        let guard = self.shared.state();
        let (guard, _) = self
            .shared
            .ready
            .wait_timeout_while(guard, timeout, |state| state.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }
}

impl fmt::Debug for SizeObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeObservable")
            .field("path", &self.shared.path)
            .field("format", &self.shared.format)
            .field("state", &*self.shared.state())
            .field("detached", &self.is_detached())
            .finish()
    }
}
