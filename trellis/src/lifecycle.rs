//! Present/dismiss protocol shared by every overlay kind.
//!
//! Both directions flip `presented` first, so a second call on the same
//! instance is a no-op while the first is still animating. Calls on other
//! instances proceed independently.
//!
//! Every accepted call bumps the overlay's generation. A call that finds a
//! newer generation once its animation settles has been taken over by an
//! opposite-direction call and leaves state and notifications to it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::animation::{Animation, AnimationBuilder, AnimationOptions};
use crate::config::{ConfigKey, Mode};
use crate::error::{AnimationError, OverlayError};
use crate::overlay::{DismissDetail, HIDDEN_CLASS, LifecyclePhase, Overlay, OverlayEvent};

/// Present `overlay`, animating with the instance override, the configured
/// animation for `name`, or the default for the overlay's mode.
///
/// Returns immediately if the overlay is already presented. If a `dismiss`
/// takes over before the enter animation finishes, this returns `Ok(())`
/// without announcing `DidPresent`.
pub async fn present(
    overlay: &Overlay,
    name: ConfigKey,
    ios_enter: &AnimationBuilder,
    md_enter: &AnimationBuilder,
    opts: Option<&AnimationOptions>,
) -> Result<(), OverlayError> {
    let generation = {
        let mut state = overlay.state();
        if state.presented {
            log::debug!("[overlay] {} already presented", overlay.id());
            return Ok(());
        }
        state.presented = true;
        state.phase = LifecyclePhase::Presenting;
        state.generation += 1;
        state.generation
    };
    overlay.emit(OverlayEvent::WillPresent);

    let builder = resolve_builder(overlay, name, ios_enter, md_enter, true);
    log::debug!("[overlay] presenting {} with '{}'", overlay.id(), builder.name());

    let result = overlay_animation(overlay, generation, &builder, opts).await;

    {
        let mut state = overlay.state();
        if state.generation != generation {
            log::debug!("[overlay] presentation of {} superseded by dismiss", overlay.id());
            return Ok(());
        }
        if let Err(err) = result {
            log::warn!("[overlay] present of {} failed: {}", overlay.id(), err);
            state.presented = false;
            state.phase = LifecyclePhase::Invisible;
            return Err(err.into());
        }
        state.phase = LifecyclePhase::Presented;
    }
    overlay.emit(OverlayEvent::DidPresent);
    Ok(())
}

/// Dismiss `overlay` and detach it from its container.
///
/// Returns `Ok(false)` without animating if the overlay is not presented, or
/// if a later `present` took it back before the leave animation finished.
pub async fn dismiss(
    overlay: &Overlay,
    data: Option<Value>,
    role: Option<&str>,
    name: ConfigKey,
    ios_leave: &AnimationBuilder,
    md_leave: &AnimationBuilder,
    opts: Option<&AnimationOptions>,
) -> Result<bool, OverlayError> {
    let generation = {
        let mut state = overlay.state();
        if !state.presented {
            log::debug!("[overlay] {} not presented, nothing to dismiss", overlay.id());
            return Ok(false);
        }
        state.presented = false;
        state.phase = LifecyclePhase::Dismissing;
        state.generation += 1;
        state.generation
    };

    let detail = DismissDetail {
        data,
        role: role.map(str::to_string),
    };
    overlay.emit(OverlayEvent::WillDismiss(detail.clone()));

    let builder = resolve_builder(overlay, name, ios_leave, md_leave, false);
    log::debug!(
        "[overlay] dismissing {} (role {:?}) with '{}'",
        overlay.id(),
        detail.role,
        builder.name()
    );

    let result = overlay_animation(overlay, generation, &builder, opts).await;

    {
        let mut state = overlay.state();
        if state.generation != generation {
            log::debug!("[overlay] dismissal of {} superseded by present", overlay.id());
            return Ok(false);
        }
        if let Err(err) = result {
            log::warn!("[overlay] dismiss of {} failed: {}", overlay.id(), err);
            state.presented = true;
            state.phase = LifecyclePhase::Presented;
            return Err(err.into());
        }
        state.phase = LifecyclePhase::Removed;
    }

    overlay.emit(OverlayEvent::DidDismiss(detail));
    overlay.element().remove();
    if let Some(stack) = overlay.stack() {
        stack.forget(overlay.element().key());
    }
    log::debug!("[overlay] removed {}", overlay.id());
    Ok(true)
}

fn resolve_builder(
    overlay: &Overlay,
    name: ConfigKey,
    ios: &AnimationBuilder,
    md: &AnimationBuilder,
    entering: bool,
) -> AnimationBuilder {
    let (custom, mode) = {
        let state = overlay.state();
        let custom = if entering {
            state.enter_animation.clone()
        } else {
            state.leave_animation.clone()
        };
        (custom, state.mode)
    };
    custom.unwrap_or_else(|| {
        let fallback = match mode {
            Mode::Ios => ios,
            Mode::Md => md,
        };
        overlay.shared().config.get(name, fallback)
    })
}

async fn overlay_animation(
    overlay: &Overlay,
    generation: u64,
    builder: &AnimationBuilder,
    opts: Option<&AnimationOptions>,
) -> Result<(), AnimationError> {
    // A running animation in the other direction loses.
    let previous = overlay.state().animation.take();
    if let Some(previous) = previous {
        log::debug!("[overlay] {} pre-empting running animation", overlay.id());
        previous.destroy();
    }

    // Visible even when leaving: the overlay may be dismissed before it was ever shown.
    let element = overlay.element();
    element.remove_class(HIDDEN_CLASS);
    let root = element.shadow_root().unwrap_or_else(|| element.clone());

    let shared = overlay.shared();
    let animation = shared.animations.create(builder, &root, opts).await?;

    let (animated, keyboard_close) = {
        let mut state = overlay.state();
        if state.generation != generation {
            // Superseded while creating; the newer call's animation stays.
            animation.destroy();
            return Ok(());
        }
        if let Some(stale) = state.animation.replace(Arc::clone(&animation)) {
            stale.destroy();
        }
        (state.animated, state.keyboard_close)
    };

    if !animated {
        animation.set_duration(Duration::ZERO);
    }
    if keyboard_close {
        let document = shared.document.clone();
        animation.before_commit(Box::new(move || {
            if let Some(active) = document.active_element() {
                if active.is_text_input() {
                    log::debug!("[overlay] closing keyboard on <{}>", active.tag());
                    document.blur();
                }
            }
        }));
    }

    let result = animation.play().await;

    animation.destroy();
    {
        let mut state = overlay.state();
        if state
            .animation
            .as_ref()
            .is_some_and(|current| same_animation(current, &animation))
        {
            state.animation = None;
        }
    }

    match result {
        // Destroyed by a later call, which owns the overlay from here on.
        Err(AnimationError::Cancelled) => Ok(()),
        other => other,
    }
}

fn same_animation(a: &Arc<dyn Animation>, b: &Arc<dyn Animation>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
