//! Overlay controller and the stack registry behind it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use layerdom::{Document, Node, NodeKey};
use serde_json::Value;

use crate::animation::{AnimationController, TimedAnimationController};
use crate::config::Config;
use crate::dismiss_trigger;
use crate::error::OverlayError;
use crate::overlay::{HIDDEN_CLASS, Overlay, OverlayKind, OverlayOptions};

/// Tag of the element overlays attach to. Falls back to `body` when absent.
pub const APP_ROOT_TAG: &str = "app-root";

/// Collaborators shared by a controller and every overlay it created.
///
/// Holds no overlays, so instances can keep it alive without a cycle.
pub(crate) struct Shared {
    pub(crate) document: Document,
    pub(crate) animations: Arc<dyn AnimationController>,
    pub(crate) config: Config,
}

impl Shared {
    /// The container overlays are attached to.
    pub(crate) fn app_root(&self) -> Node {
        self.document
            .query_selector(APP_ROOT_TAG)
            .unwrap_or_else(|| self.document.body())
    }
}

/// Membership of live overlays, keyed by their element.
///
/// Order is never stored here: the container's child order is the stacking
/// order. `last_id` doubles as the one-time guard for the document listener.
/// Overlays only point back at the stack weakly.
pub(crate) struct OverlayStack {
    last_id: AtomicU64,
    members: Mutex<HashMap<NodeKey, Arc<Overlay>>>,
}

impl OverlayStack {
    fn new() -> Self {
        Self {
            last_id: AtomicU64::new(0),
            members: Mutex::new(HashMap::new()),
        }
    }

    /// True exactly once per stack: the first caller installs listeners.
    pub(crate) fn claim_listeners(&self) -> bool {
        self.last_id
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn next_index(&self) -> u64 {
        self.last_id.fetch_add(1, Ordering::SeqCst)
    }

    fn insert(&self, overlay: Arc<Overlay>) {
        self.members
            .lock()
            .unwrap()
            .insert(overlay.element().key(), overlay);
    }

    pub(crate) fn forget(&self, key: NodeKey) {
        self.members.lock().unwrap().remove(&key);
    }

    /// Overlays among `container`'s direct children, in attachment order.
    ///
    /// Members whose element was detached without a dismissal are dropped.
    pub(crate) fn list(&self, container: &Node, tag: Option<&str>) -> Vec<Arc<Overlay>> {
        let mut members = self.members.lock().unwrap();
        members.retain(|_, overlay| overlay.element().parent().is_some());
        container
            .children()
            .iter()
            .filter(|node| tag.is_none_or(|tag| node.has_tag(tag)))
            .filter_map(|node| members.get(&node.key()).cloned())
            .collect()
    }

    /// The overlay with `id`, or the last one in stacking order.
    pub(crate) fn top(&self, container: &Node, tag: Option<&str>, id: Option<&str>) -> Option<Arc<Overlay>> {
        let mut overlays = self.list(container, tag);
        match id {
            Some(id) => overlays
                .into_iter()
                .find(|overlay| overlay.element().id().as_deref() == Some(id)),
            None => overlays.pop(),
        }
    }

    fn len(&self) -> usize {
        self.members.lock().unwrap().len()
    }
}

/// A freshly attached overlay waiting for its own setup to finish.
#[derive(Debug)]
pub struct PendingOverlay {
    overlay: Arc<Overlay>,
}

impl PendingOverlay {
    /// The instance, already attached and hidden.
    pub fn overlay(&self) -> &Arc<Overlay> {
        &self.overlay
    }

    /// Wait until the instance reports ready.
    pub async fn ready(self) -> Arc<Overlay> {
        self.overlay.ready().await;
        self.overlay
    }
}

/// Creates overlays and looks them up on one document.
///
/// Cheap to clone; clones share the same stack. Dropping the last clone
/// releases every overlay nobody else holds.
#[derive(Clone)]
pub struct OverlayController {
    shared: Arc<Shared>,
    stack: Arc<OverlayStack>,
}

impl OverlayController {
    pub fn new(document: Document, animations: Arc<dyn AnimationController>, config: Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                document,
                animations,
                config,
            }),
            stack: Arc::new(OverlayStack::new()),
        }
    }

    /// Controller backed by the built-in [`TimedAnimationController`].
    pub fn with_timed_animations(document: Document, config: Config) -> Self {
        Self::new(document, Arc::new(TimedAnimationController::default()), config)
    }

    pub fn document(&self) -> &Document {
        &self.shared.document
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// The container overlays are attached to.
    pub fn app_root(&self) -> Node {
        self.shared.app_root()
    }

    /// Create an overlay of `kind` with a fresh element.
    pub fn create_overlay(&self, kind: OverlayKind, options: OverlayOptions) -> PendingOverlay {
        self.create_overlay_with(Node::new(kind.tag()), kind, options)
    }

    /// Create an overlay around an existing element.
    ///
    /// The element is hidden, given an index and (unless it has one) an id,
    /// and appended as the last child of the app root.
    pub fn create_overlay_with(
        &self,
        element: Node,
        kind: OverlayKind,
        options: OverlayOptions,
    ) -> PendingOverlay {
        dismiss_trigger::connect_listeners(&self.shared, &self.stack);

        let index = self.stack.next_index();
        let overlay = Arc::new(Overlay::new(
            index,
            kind,
            element.clone(),
            Arc::clone(&self.shared),
            Arc::downgrade(&self.stack),
            options,
        ));
        element.add_class(HIDDEN_CLASS);
        if !element.has_id() {
            element.set_id(format!("overlay-{index}"));
        }

        self.shared.app_root().append_child(&element);
        self.stack.insert(Arc::clone(&overlay));
        log::debug!(
            "[overlay] created {} #{} (index {}, {} live)",
            kind.tag(),
            overlay.id(),
            index,
            self.stack.len()
        );

        PendingOverlay { overlay }
    }

    /// Attached overlays in stacking order, optionally filtered by tag.
    pub fn get_overlays(&self, tag: Option<&str>) -> Vec<Arc<Overlay>> {
        self.stack.list(&self.shared.app_root(), tag)
    }

    /// The overlay with `id`, or the top of the (filtered) stack.
    pub fn get_overlay(&self, tag: Option<&str>, id: Option<&str>) -> Option<Arc<Overlay>> {
        self.stack.top(&self.shared.app_root(), tag, id)
    }

    /// Dismiss the overlay found by `tag` and `id`.
    pub async fn dismiss_overlay(
        &self,
        data: Option<Value>,
        role: Option<&str>,
        tag: &str,
        id: Option<&str>,
    ) -> Result<bool, OverlayError> {
        let overlay = self
            .get_overlay(Some(tag), id)
            .ok_or_else(|| OverlayError::not_found(tag, id))?;
        overlay.dismiss(data, role).await
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("document", &self.shared.document)
            .field("config", &self.shared.config)
            .field("live", &self.stack.len())
            .finish()
    }
}
