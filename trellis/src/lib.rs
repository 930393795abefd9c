pub mod animation;
pub mod back_button;
pub mod config;
pub mod controller;
pub mod dismiss_trigger;
pub mod error;
pub mod focus;
pub mod lifecycle;
pub mod overlay;

pub use controller::{APP_ROOT_TAG, OverlayController, PendingOverlay};
pub use error::{AnimationError, OverlayError};
pub use overlay::{
    BACKDROP, CANCEL, DismissDetail, Dismissible, LifecyclePhase, Overlay, OverlayEvent,
    OverlayKind, OverlayOptions, is_cancel,
};

pub mod prelude {
    pub use crate::animation::{
        AnimatedProperty, Animation, AnimationBuilder, AnimationController, AnimationSpec, Easing,
        TimedAnimationController,
    };
    pub use crate::back_button::{BackButtonDispatcher, BackButtonEvent, BackButtonOutcome};
    pub use crate::config::{Config, ConfigKey, Mode};
    pub use crate::controller::{OverlayController, PendingOverlay};
    pub use crate::error::{AnimationError, OverlayError};
    pub use crate::focus::auto_focus;
    pub use crate::overlay::{
        BACKDROP, CANCEL, DismissDetail, Dismissible, LifecyclePhase, Overlay, OverlayEvent,
        OverlayKind, OverlayOptions, is_cancel,
    };
}
