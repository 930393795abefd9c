use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::event::KeyEvent;
use crate::node::Node;

/// Callback invoked for every key event dispatched on the document.
pub type KeyListener = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Handle returned by [`Document::add_key_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A document: a `body` root, document-scope key listeners and the focused element.
///
/// Cheap to clone; clones share the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    body: Node,
    active: Mutex<Option<Node>>,
    listeners: Mutex<Vec<(ListenerId, KeyListener)>>,
    next_listener: AtomicU64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                body: Node::new("body"),
                active: Mutex::new(None),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    pub fn body(&self) -> Node {
        self.inner.body.clone()
    }

    /// Whether `node` is attached under `body`.
    pub fn contains(&self, node: &Node) -> bool {
        self.inner.body.contains(node)
    }

    /// First node under `body` (pre-order) whose tag matches, case-insensitively.
    pub fn query_selector(&self, tag: &str) -> Option<Node> {
        self.inner
            .body
            .descendants()
            .into_iter()
            .find(|node| node.has_tag(tag))
    }

    // Focus

    /// The focused element, if it is still attached to this document.
    pub fn active_element(&self) -> Option<Node> {
        let active = self.inner.active.lock().unwrap().clone()?;
        self.contains(&active).then_some(active)
    }

    /// Focus a node. Returns true if focus changed.
    pub fn focus(&self, node: &Node) -> bool {
        let mut active = self.inner.active.lock().unwrap();
        if active.as_ref() == Some(node) {
            return false;
        }
        *active = Some(node.clone());
        true
    }

    /// Clear focus, returning the element that had it.
    pub fn blur(&self) -> Option<Node> {
        self.inner.active.lock().unwrap().take()
    }

    // Key listeners

    pub fn add_key_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&KeyEvent) + Send + Sync + 'static,
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
    pub fn remove_key_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        before != listeners.len()
    }

    pub fn key_listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap().len()
    }

    /// Deliver a key event to every listener in registration order.
    ///
    /// Listeners run on a snapshot, so they may add or remove listeners or
    /// mutate the tree.
    pub fn dispatch_key(&self, event: &KeyEvent) {
        let listeners: Vec<KeyListener> = self
            .inner
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        log::trace!(
            "[layerdom] dispatching {:?} to {} listener(s)",
            event,
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("body", &self.inner.body)
            .field("listeners", &self.key_listener_count())
            .finish()
    }
}
