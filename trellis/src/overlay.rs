//! Overlay instances.
//!
//! An [`Overlay`] is a stacked transient surface (modal, popover, alert,
//! action sheet) attached to the app root of a document. Instances are created
//! through [`OverlayController::create_overlay`](crate::OverlayController::create_overlay)
//! and driven with [`Overlay::present`] / [`Overlay::dismiss`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use layerdom::{Document, Node};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};

use crate::animation::{Animation, AnimationBuilder, AnimationOptions, presets};
use crate::config::{ConfigKey, Mode};
use crate::controller::{OverlayStack, Shared};
use crate::error::OverlayError;
use crate::lifecycle;

/// Role for a dismissal the user cancelled explicitly.
pub const CANCEL: &str = "cancel";

/// Role for a dismissal triggered by the backdrop or the escape key.
pub const BACKDROP: &str = "backdrop";

/// Class marking an attached overlay that has not been shown yet.
pub const HIDDEN_CLASS: &str = "overlay-hidden";

const EVENT_CAPACITY: usize = 16;

/// Whether a dismissal role means "the user backed out".
pub fn is_cancel(role: Option<&str>) -> bool {
    matches!(role, Some(CANCEL) | Some(BACKDROP))
}

/// The kinds of overlay this crate knows how to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Modal,
    Popover,
    Alert,
    ActionSheet,
}

impl OverlayKind {
    /// Element tag used for instances of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            OverlayKind::Modal => "modal",
            OverlayKind::Popover => "popover",
            OverlayKind::Alert => "alert",
            OverlayKind::ActionSheet => "action-sheet",
        }
    }

    pub fn enter_key(self) -> ConfigKey {
        match self {
            OverlayKind::Modal => ConfigKey::ModalEnter,
            OverlayKind::Popover => ConfigKey::PopoverEnter,
            OverlayKind::Alert => ConfigKey::AlertEnter,
            OverlayKind::ActionSheet => ConfigKey::ActionSheetEnter,
        }
    }

    pub fn leave_key(self) -> ConfigKey {
        match self {
            OverlayKind::Modal => ConfigKey::ModalLeave,
            OverlayKind::Popover => ConfigKey::PopoverLeave,
            OverlayKind::Alert => ConfigKey::AlertLeave,
            OverlayKind::ActionSheet => ConfigKey::ActionSheetLeave,
        }
    }
}

/// Payload of the dismiss notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct DismissDetail {
    pub data: Option<Value>,
    pub role: Option<String>,
}

impl DismissDetail {
    pub fn is_cancel(&self) -> bool {
        is_cancel(self.role.as_deref())
    }
}

/// Lifecycle notifications broadcast by an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    WillPresent,
    DidPresent,
    WillDismiss(DismissDetail),
    DidDismiss(DismissDetail),
}

/// Where an attached overlay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Attached but never shown.
    Invisible,
    Presenting,
    Presented,
    Dismissing,
    /// Detached after the leave animation.
    Removed,
}

/// Options applied onto an overlay when it is created.
///
/// Only fields that are set override the instance defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayOptions {
    pub id: Option<String>,
    pub backdrop_dismiss: Option<bool>,
    pub keyboard_close: Option<bool>,
    pub animated: Option<bool>,
    pub mode: Option<Mode>,
    #[serde(skip)]
    pub enter_animation: Option<AnimationBuilder>,
    #[serde(skip)]
    pub leave_animation: Option<AnimationBuilder>,
}

impl OverlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn backdrop_dismiss(mut self, enabled: bool) -> Self {
        self.backdrop_dismiss = Some(enabled);
        self
    }

    pub fn keyboard_close(mut self, enabled: bool) -> Self {
        self.keyboard_close = Some(enabled);
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = Some(animated);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn enter_animation(mut self, builder: AnimationBuilder) -> Self {
        self.enter_animation = Some(builder);
        self
    }

    pub fn leave_animation(mut self, builder: AnimationBuilder) -> Self {
        self.leave_animation = Some(builder);
        self
    }
}

/// Mutable per-instance state. Never held across an `.await`.
pub(crate) struct OverlayState {
    pub(crate) presented: bool,
    pub(crate) phase: LifecyclePhase,
    /// Bumped by every accepted present or dismiss.
    pub(crate) generation: u64,
    pub(crate) animation: Option<Arc<dyn Animation>>,
    pub(crate) backdrop_dismiss: bool,
    pub(crate) keyboard_close: bool,
    pub(crate) animated: bool,
    pub(crate) mode: Mode,
    pub(crate) enter_animation: Option<AnimationBuilder>,
    pub(crate) leave_animation: Option<AnimationBuilder>,
}

/// A live overlay instance.
pub struct Overlay {
    index: u64,
    kind: OverlayKind,
    element: Node,
    shared: Arc<Shared>,
    stack: Weak<OverlayStack>,
    state: Mutex<OverlayState>,
    events: broadcast::Sender<OverlayEvent>,
    ready: watch::Sender<bool>,
}

impl Overlay {
    pub(crate) fn new(
        index: u64,
        kind: OverlayKind,
        element: Node,
        shared: Arc<Shared>,
        stack: Weak<OverlayStack>,
        options: OverlayOptions,
    ) -> Self {
        let state = OverlayState {
            presented: false,
            phase: LifecyclePhase::Invisible,
            generation: 0,
            animation: None,
            backdrop_dismiss: options.backdrop_dismiss.unwrap_or(true),
            keyboard_close: options.keyboard_close.unwrap_or(true),
            animated: options.animated.unwrap_or(shared.config.animated),
            mode: options.mode.unwrap_or(shared.config.mode),
            enter_animation: options.enter_animation,
            leave_animation: options.leave_animation,
        };
        if let Some(id) = options.id {
            element.set_id(id);
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (ready, _) = watch::channel(false);
        Self {
            index,
            kind,
            element,
            shared,
            stack,
            state: Mutex::new(state),
            events,
            ready,
        }
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// The registry this overlay belongs to, while its controller is alive.
    pub(crate) fn stack(&self) -> Option<Arc<OverlayStack>> {
        self.stack.upgrade()
    }

    pub(crate) fn emit(&self, event: OverlayEvent) {
        log::trace!("[overlay] {} emits {:?}", self.id(), event);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // Identity

    /// Creation index; ascending and never reused within a controller.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn id(&self) -> String {
        self.element.id().unwrap_or_default()
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn element(&self) -> &Node {
        &self.element
    }

    pub fn document(&self) -> &Document {
        &self.shared.document
    }

    // State

    pub fn is_presented(&self) -> bool {
        self.state().presented
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.state().phase
    }

    /// Whether an enter or leave animation is currently held.
    pub fn is_animating(&self) -> bool {
        self.state().animation.is_some()
    }

    pub fn backdrop_dismiss(&self) -> bool {
        self.state().backdrop_dismiss
    }

    pub fn set_backdrop_dismiss(&self, enabled: bool) {
        self.state().backdrop_dismiss = enabled;
    }

    pub fn keyboard_close(&self) -> bool {
        self.state().keyboard_close
    }

    pub fn set_keyboard_close(&self, enabled: bool) {
        self.state().keyboard_close = enabled;
    }

    pub fn animated(&self) -> bool {
        self.state().animated
    }

    pub fn set_animated(&self, animated: bool) {
        self.state().animated = animated;
    }

    pub fn mode(&self) -> Mode {
        self.state().mode
    }

    pub fn set_enter_animation(&self, builder: Option<AnimationBuilder>) {
        self.state().enter_animation = builder;
    }

    pub fn set_leave_animation(&self, builder: Option<AnimationBuilder>) {
        self.state().leave_animation = builder;
    }

    // Readiness

    /// Signal that the instance finished its own setup.
    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolves once [`mark_ready`](Self::mark_ready) has been called.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    // Notifications

    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.events.subscribe()
    }

    /// Resolves with the detail of the next will-dismiss notification.
    ///
    /// Subscribes immediately, so a dismissal started after this call is never
    /// missed even if the future is polled late.
    pub fn on_will_dismiss(&self) -> impl Future<Output = Option<DismissDetail>> + Send + 'static {
        next_dismiss(self.subscribe(), false)
    }

    /// Resolves with the detail of the next did-dismiss notification.
    pub fn on_did_dismiss(&self) -> impl Future<Output = Option<DismissDetail>> + Send + 'static {
        next_dismiss(self.subscribe(), true)
    }

    // Lifecycle

    /// Present with this kind's configured enter animation.
    pub async fn present(&self) -> Result<(), OverlayError> {
        self.present_with(None).await
    }

    /// Present, forwarding `opts` to the animation builder.
    pub async fn present_with(&self, opts: Option<&AnimationOptions>) -> Result<(), OverlayError> {
        lifecycle::present(
            self,
            self.kind.enter_key(),
            &presets::enter(self.kind, Mode::Ios),
            &presets::enter(self.kind, Mode::Md),
            opts,
        )
        .await
    }

    /// Dismiss with this kind's configured leave animation.
    ///
    /// Returns `Ok(false)` if the overlay was not presented.
    pub async fn dismiss(&self, data: Option<Value>, role: Option<&str>) -> Result<bool, OverlayError> {
        lifecycle::dismiss(
            self,
            data,
            role,
            self.kind.leave_key(),
            &presets::leave(self.kind, Mode::Ios),
            &presets::leave(self.kind, Mode::Md),
            None,
        )
        .await
    }

    /// Focus the first focusable element inside this overlay.
    pub fn auto_focus(&self) -> Option<Node> {
        crate::focus::auto_focus(&self.shared.document, &self.element)
    }
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Overlay")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("id", &self.element.id())
            .field("presented", &state.presented)
            .field("phase", &state.phase)
            .finish()
    }
}

async fn next_dismiss(
    mut rx: broadcast::Receiver<OverlayEvent>,
    did: bool,
) -> Option<DismissDetail> {
    loop {
        match rx.recv().await {
            Ok(OverlayEvent::DidDismiss(detail)) if did => return Some(detail),
            Ok(OverlayEvent::WillDismiss(detail)) if !did => return Some(detail),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("[overlay] dismiss waiter lagged by {skipped} notifications");
                continue;
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Something the global dismiss trigger can close.
#[async_trait]
pub trait Dismissible: Send + Sync {
    fn is_presented(&self) -> bool;

    fn backdrop_dismiss(&self) -> bool;

    async fn dismiss(&self, data: Option<Value>, role: Option<&str>) -> Result<bool, OverlayError>;
}

#[async_trait]
impl Dismissible for Overlay {
    fn is_presented(&self) -> bool {
        Overlay::is_presented(self)
    }

    fn backdrop_dismiss(&self) -> bool {
        Overlay::backdrop_dismiss(self)
    }

    async fn dismiss(&self, data: Option<Value>, role: Option<&str>) -> Result<bool, OverlayError> {
        Overlay::dismiss(self, data, role).await
    }
}
