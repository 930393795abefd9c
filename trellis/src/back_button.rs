//! Hardware back button arbitration.
//!
//! Every back signal is offered to all listeners at once. Each listener may
//! register handlers with a priority on the [`BackButtonEvent`] it is handed;
//! exactly one handler runs per signal. Signals arriving while a handler's
//! deferred work is still pending are dropped, not queued.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = BackButtonDispatcher::new();
//! dispatcher.add_listener(|ev| {
//!     ev.register_async(100, || async {
//!         close_menu().await;
//!     });
//! });
//! dispatcher.handle_back_button();
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// Handler run when selected. Returning a future keeps the dispatcher busy
/// until it completes.
pub type BackButtonHandler = Box<dyn FnOnce() -> Option<BoxFuture<'static, ()>> + Send>;

/// Called for every back signal with the event to register handlers on.
pub type BackButtonListener = Arc<dyn Fn(&mut BackButtonEvent) + Send + Sync>;

/// Handle returned by [`BackButtonDispatcher::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    priority: i32,
    handler: BackButtonHandler,
}

/// Collects handler registrations for a single back signal.
///
/// Only reachable by `&mut` during the dispatcher's synchronous fan-out, so
/// registrations cannot arrive late.
pub struct BackButtonEvent {
    registrations: Vec<Registration>,
}

impl BackButtonEvent {
    fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    /// Register a handler. Higher priority wins; among equal priorities the
    /// last registered wins.
    pub fn register<F>(&mut self, priority: i32, handler: F)
    where
        F: FnOnce() -> Option<BoxFuture<'static, ()>> + Send + 'static,
    {
        self.registrations.push(Registration {
            priority,
            handler: Box::new(handler),
        });
    }

    /// Register a handler with no deferred work.
    pub fn register_sync<F>(&mut self, priority: i32, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.register(priority, move || {
            handler();
            None
        });
    }

    /// Register a handler whose future must finish before the next signal is accepted.
    pub fn register_async<F, Fut>(&mut self, priority: i32, handler: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(priority, move || Some(handler().boxed()));
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn select(self) -> Option<Registration> {
        // max_by_key yields the last of several equal maxima.
        self.registrations.into_iter().max_by_key(|r| r.priority)
    }
}

impl fmt::Debug for BackButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let priorities: Vec<i32> = self.registrations.iter().map(|r| r.priority).collect();
        f.debug_struct("BackButtonEvent")
            .field("priorities", &priorities)
            .finish()
    }
}

/// What happened to a back signal.
#[derive(Debug)]
pub enum BackButtonOutcome {
    /// A previous signal is still being handled; this one was dropped.
    Busy,
    /// Nobody registered a handler.
    Unhandled,
    /// The selected handler finished synchronously.
    Handled { priority: i32 },
    /// The selected handler returned deferred work, running on `task`.
    Pending { priority: i32, task: JoinHandle<()> },
}

impl BackButtonOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            BackButtonOutcome::Handled { .. } | BackButtonOutcome::Pending { .. }
        )
    }

    /// Priority of the handler that ran, if any.
    pub fn priority(&self) -> Option<i32> {
        match self {
            BackButtonOutcome::Handled { priority } | BackButtonOutcome::Pending { priority, .. } => {
                Some(*priority)
            }
            _ => None,
        }
    }
}

/// Process-wide arbiter for the hardware back signal.
///
/// Cheap to clone; clones share listeners and the busy flag.
#[derive(Clone, Default)]
pub struct BackButtonDispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    busy: AtomicBool,
    listeners: Mutex<Vec<(ListenerId, BackButtonListener)>>,
    next_listener: AtomicU64,
}

/// Clears the busy flag when dropped, including on unwind.
struct BusyGuard {
    inner: Arc<DispatcherInner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.busy.store(false, Ordering::SeqCst);
    }
}

impl BackButtonDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&mut BackButtonEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns true if the listener was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        before != listeners.len()
    }

    /// Whether a back signal is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::SeqCst)
    }

    /// Handle one hardware back signal.
    ///
    /// Deferred handler work is spawned on the current tokio runtime and the
    /// dispatcher stays busy until it completes. A panicking handler still
    /// releases the busy flag.
    pub fn handle_back_button(&self) -> BackButtonOutcome {
        if self.inner.busy.swap(true, Ordering::SeqCst) {
            log::debug!("[back_button] busy, ignoring signal");
            return BackButtonOutcome::Busy;
        }
        let guard = BusyGuard {
            inner: Arc::clone(&self.inner),
        };

        let listeners: Vec<BackButtonListener> = self
            .inner
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut event = BackButtonEvent::new();
        for listener in &listeners {
            listener(&mut event);
        }
        log::trace!(
            "[back_button] {} listener(s) registered {:?}",
            listeners.len(),
            event
        );

        let candidates = event.len();
        let Some(selected) = event.select() else {
            log::debug!("[back_button] no handlers registered");
            return BackButtonOutcome::Unhandled;
        };
        let priority = selected.priority;
        log::debug!("[back_button] selected priority {priority} of {candidates} handler(s)");

        match (selected.handler)() {
            None => BackButtonOutcome::Handled { priority },
            Some(work) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let task = handle.spawn(async move {
                        let _guard = guard;
                        work.await;
                    });
                    BackButtonOutcome::Pending { priority, task }
                }
                Err(_) => {
                    log::warn!("[back_button] no async runtime, deferred handler work dropped");
                    BackButtonOutcome::Handled { priority }
                }
            },
        }
    }
}

impl fmt::Debug for BackButtonDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackButtonDispatcher")
            .field("busy", &self.is_busy())
            .field("listeners", &self.inner.listeners.lock().unwrap().len())
            .finish()
    }
}
