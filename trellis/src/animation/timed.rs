use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use layerdom::Node;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Animation, AnimationBuilder, AnimationController, AnimationOptions, AnimationSpec, BeforeCommit};
use crate::error::AnimationError;

/// Interval between intermediate commits.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Controller producing [`TimedAnimation`]s.
///
/// When `reduce_motion` is set every animation is created with a zero
/// duration; hooks still run and final values are still committed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedAnimationController {
    reduce_motion: bool,
}

impl TimedAnimationController {
    pub fn new(reduce_motion: bool) -> Self {
        Self { reduce_motion }
    }
}

#[async_trait]
impl AnimationController for TimedAnimationController {
    async fn create(
        &self,
        builder: &AnimationBuilder,
        root: &Node,
        opts: Option<&AnimationOptions>,
    ) -> Result<Arc<dyn Animation>, AnimationError> {
        let spec = builder.build(root, opts);
        log::debug!(
            "[animation] created '{}' on <{}> ({:?}, {} properties)",
            builder.name(),
            root.tag(),
            spec.duration,
            spec.properties.len()
        );
        let animation = TimedAnimation::new(root.clone(), spec);
        if self.reduce_motion {
            animation.set_duration(Duration::ZERO);
        }
        Ok(Arc::new(animation))
    }
}

/// Animation that steps through its duration on the tokio clock, writing the
/// eased value of every property onto its root as an attribute each frame.
///
/// The last write is always the final value.
pub struct TimedAnimation {
    root: Node,
    spec: AnimationSpec,
    duration: Mutex<Duration>,
    before_commit: Mutex<Vec<BeforeCommit>>,
    cancel: CancellationToken,
}

impl TimedAnimation {
    pub fn new(root: Node, spec: AnimationSpec) -> Self {
        Self {
            duration: Mutex::new(spec.duration),
            root,
            spec,
            before_commit: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        *self.duration.lock().unwrap()
    }

    pub fn is_destroyed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Write every property at linear progress `t`.
    fn commit(&self, t: f32) {
        let progress = self.spec.easing.apply(t);
        for property in &self.spec.properties {
            self.root
                .set_attribute(property.attribute(), format!("{:.2}", property.value_at(progress)));
        }
    }
}

#[async_trait]
impl Animation for TimedAnimation {
    fn set_duration(&self, duration: Duration) {
        *self.duration.lock().unwrap() = duration;
    }

    fn before_commit(&self, callback: BeforeCommit) {
        self.before_commit.lock().unwrap().push(callback);
    }

    async fn play(&self) -> Result<(), AnimationError> {
        if self.cancel.is_cancelled() {
            return Err(AnimationError::Cancelled);
        }

        let callbacks = std::mem::take(&mut *self.before_commit.lock().unwrap());
        for callback in callbacks {
            callback();
        }

        let duration = self.duration();
        if !duration.is_zero() {
            let start = Instant::now();
            let deadline = start + duration;
            let finished = tokio::time::sleep_until(deadline);
            tokio::pin!(finished);
            let mut frames = tokio::time::interval(FRAME_INTERVAL);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = frames.tick() => {}
                    _ = &mut finished => break,
                    _ = self.cancel.cancelled() => return Err(AnimationError::Cancelled),
                }
                let elapsed = start.elapsed();
                if elapsed >= duration {
                    break;
                }
                self.commit(elapsed.as_secs_f32() / duration.as_secs_f32());
            }
        }

        self.commit(1.0);
        Ok(())
    }

    fn destroy(&self) {
        self.cancel.cancel();
    }
}
