#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use layerdom::{Document, Node};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use trellis::animation::{
    Animation, AnimationBuilder, AnimationController, AnimationOptions, BeforeCommit,
};
use trellis::config::Config;
use trellis::{AnimationError, Overlay, OverlayController, OverlayKind, OverlayOptions};

/// Animation controller that records what it creates.
///
/// When gated, every `play()` waits for a permit from [`MockAnimations::release`].
#[derive(Clone, Default)]
pub struct MockAnimations {
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    created: Mutex<Vec<Created>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    fail_create: AtomicBool,
    fail_play: AtomicBool,
}

#[derive(Clone)]
pub struct Created {
    pub builder: String,
    pub root: Node,
    pub animation: Arc<MockAnimation>,
}

impl MockAnimations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(self) -> Self {
        *self.state.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` gated animations finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.state.gate.lock().unwrap().as_ref() {
            gate.add_permits(n);
        }
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_play(&self, fail: bool) {
        self.state.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.state.created.lock().unwrap().len()
    }

    pub fn builder_names(&self) -> Vec<String> {
        self.state
            .created
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.builder.clone())
            .collect()
    }

    pub fn created(&self) -> Vec<Created> {
        self.state.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnimationController for MockAnimations {
    async fn create(
        &self,
        builder: &AnimationBuilder,
        root: &Node,
        opts: Option<&AnimationOptions>,
    ) -> Result<Arc<dyn Animation>, AnimationError> {
        if self.state.fail_create.load(Ordering::SeqCst) {
            return Err(AnimationError::create("mock refused"));
        }
        let spec = builder.build(root, opts);
        let animation = Arc::new(MockAnimation {
            duration: Mutex::new(spec.duration),
            callbacks: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
            gate: self.state.gate.lock().unwrap().clone(),
            fail: self.state.fail_play.load(Ordering::SeqCst),
            played: AtomicBool::new(false),
        });
        self.state.created.lock().unwrap().push(Created {
            builder: builder.name().to_string(),
            root: root.clone(),
            animation: Arc::clone(&animation),
        });
        Ok(animation)
    }
}

pub struct MockAnimation {
    duration: Mutex<Duration>,
    callbacks: Mutex<Vec<BeforeCommit>>,
    cancel: CancellationToken,
    gate: Option<Arc<Semaphore>>,
    fail: bool,
    played: AtomicBool,
}

impl MockAnimation {
    pub fn duration(&self) -> Duration {
        *self.duration.lock().unwrap()
    }

    pub fn is_destroyed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn was_played(&self) -> bool {
        self.played.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Animation for MockAnimation {
    fn set_duration(&self, duration: Duration) {
        *self.duration.lock().unwrap() = duration;
    }

    fn before_commit(&self, callback: BeforeCommit) {
        self.callbacks.lock().unwrap().push(callback);
    }

    async fn play(&self) -> Result<(), AnimationError> {
        self.played.store(true, Ordering::SeqCst);
        let callbacks = std::mem::take(&mut *self.callbacks.lock().unwrap());
        for callback in callbacks {
            callback();
        }
        if let Some(gate) = &self.gate {
            tokio::select! {
                permit = gate.acquire() => {
                    if let Ok(permit) = permit {
                        permit.forget();
                    }
                }
                _ = self.cancel.cancelled() => return Err(AnimationError::Cancelled),
            }
        }
        if self.fail {
            return Err(AnimationError::play("mock failure"));
        }
        Ok(())
    }

    fn destroy(&self) {
        self.cancel.cancel();
    }
}

pub fn controller(mock: &MockAnimations) -> OverlayController {
    controller_with(mock, Config::default())
}

pub fn controller_with(mock: &MockAnimations, config: Config) -> OverlayController {
    OverlayController::new(Document::new(), Arc::new(mock.clone()), config)
}

/// Create an overlay and mark it ready, as its own setup would.
pub async fn ready_overlay(
    controller: &OverlayController,
    kind: OverlayKind,
    options: OverlayOptions,
) -> Arc<Overlay> {
    let pending = controller.create_overlay(kind, options);
    pending.overlay().mark_ready();
    pending.ready().await
}

pub async fn presented_overlay(
    controller: &OverlayController,
    kind: OverlayKind,
    options: OverlayOptions,
) -> Arc<Overlay> {
    let overlay = ready_overlay(controller, kind, options).await;
    overlay.present().await.unwrap();
    overlay
}

/// Yield to spawned tasks until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
