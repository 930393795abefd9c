//! Animation collaborator contract.
//!
//! Overlays never drive frames themselves. They ask an [`AnimationController`]
//! to turn an [`AnimationBuilder`] into a playable [`Animation`], tweak it
//! (duration, pre-commit hooks), play it to completion and destroy it.
//!
//! [`TimedAnimationController`] is the built-in controller: it steps through the
//! animation's duration frame by frame, committing eased property values onto
//! the root.

pub mod presets;
mod timed;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use layerdom::Node;

use crate::error::AnimationError;

pub use timed::{FRAME_INTERVAL, TimedAnimation, TimedAnimationController};

/// Free-form options forwarded from `present`/`dismiss` to builders.
pub type AnimationOptions = serde_json::Value;

/// Callback run once, right before an animation starts writing.
pub type BeforeCommit = Box<dyn FnOnce() + Send>;

/// Easing function for animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation (constant speed)
    #[default]
    Linear,
    /// Ease in (slow start, fast end)
    EaseIn,
    /// Ease out (fast start, slow end)
    EaseOut,
    /// Ease in-out (slow start and end)
    EaseInOut,
}

impl Easing {
    /// Apply easing function to a normalized time value (0.0 to 1.0).
    ///
    /// Returns the eased value (also 0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Property being animated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedProperty {
    /// Opacity of the surface (0.0 to 1.0)
    Opacity { from: f32, to: f32 },
    /// Vertical offset as a percentage of the surface height
    TranslateY { from: f32, to: f32 },
    /// Uniform scale factor
    Scale { from: f32, to: f32 },
    /// Opacity of the dimmed backdrop behind the surface
    BackdropOpacity { from: f32, to: f32 },
}

impl AnimatedProperty {
    /// Interpolate the property at the given (eased) progress.
    pub fn value_at(&self, progress: f32) -> f32 {
        let (from, to) = match *self {
            AnimatedProperty::Opacity { from, to }
            | AnimatedProperty::TranslateY { from, to }
            | AnimatedProperty::Scale { from, to }
            | AnimatedProperty::BackdropOpacity { from, to } => (from, to),
        };
        from + (to - from) * progress
    }

    /// Attribute the committed value is written to on the animation root.
    pub fn attribute(&self) -> &'static str {
        match self {
            AnimatedProperty::Opacity { .. } => "data-opacity",
            AnimatedProperty::TranslateY { .. } => "data-translate-y",
            AnimatedProperty::Scale { .. } => "data-scale",
            AnimatedProperty::BackdropOpacity { .. } => "data-backdrop-opacity",
        }
    }
}

/// What a builder produces: timing plus the properties to animate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub easing: Easing,
    pub properties: Vec<AnimatedProperty>,
}

impl AnimationSpec {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
            properties: Vec::new(),
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn property(mut self, property: AnimatedProperty) -> Self {
        self.properties.push(property);
        self
    }
}

type BuildFn = dyn Fn(&Node, Option<&AnimationOptions>) -> AnimationSpec + Send + Sync;

/// Named factory turning a root node (and options) into an [`AnimationSpec`].
#[derive(Clone)]
pub struct AnimationBuilder {
    name: Arc<str>,
    build: Arc<BuildFn>,
}

impl AnimationBuilder {
    pub fn new<F>(name: impl AsRef<str>, build: F) -> Self
    where
        F: Fn(&Node, Option<&AnimationOptions>) -> AnimationSpec + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            build: Arc::new(build),
        }
    }

    /// Builder that ignores its inputs and always yields `spec`.
    pub fn fixed(name: impl AsRef<str>, spec: AnimationSpec) -> Self {
        Self::new(name, move |_, _| spec.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self, root: &Node, opts: Option<&AnimationOptions>) -> AnimationSpec {
        (self.build)(root, opts)
    }
}

impl fmt::Debug for AnimationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimationBuilder").field(&self.name).finish()
    }
}

/// Creates playable animations from builders.
#[async_trait]
pub trait AnimationController: Send + Sync {
    async fn create(
        &self,
        builder: &AnimationBuilder,
        root: &Node,
        opts: Option<&AnimationOptions>,
    ) -> Result<Arc<dyn Animation>, AnimationError>;
}

/// A single playable animation.
///
/// `destroy` may be called at any time, including while `play` is pending; a
/// destroyed animation must make `play` return [`AnimationError::Cancelled`].
#[async_trait]
pub trait Animation: Send + Sync {
    /// Override the duration from the spec. Zero skips the visual part.
    fn set_duration(&self, duration: Duration);

    /// Register a callback to run before the first write.
    fn before_commit(&self, callback: BeforeCommit);

    /// Play to completion.
    async fn play(&self) -> Result<(), AnimationError>;

    /// Release resources. Idempotent.
    fn destroy(&self);
}
