//! Default enter/leave animations per overlay kind and mode.

use std::time::Duration;

use super::{AnimatedProperty, AnimationBuilder, AnimationSpec, Easing};
use crate::config::Mode;
use crate::overlay::OverlayKind;

/// Default enter animation for `kind` in `mode`.
pub fn enter(kind: OverlayKind, mode: Mode) -> AnimationBuilder {
    let name = format!("{}-enter-{}", kind.tag(), mode.as_str());
    AnimationBuilder::fixed(name, enter_spec(kind, mode))
}

/// Default leave animation for `kind` in `mode`.
pub fn leave(kind: OverlayKind, mode: Mode) -> AnimationBuilder {
    let name = format!("{}-leave-{}", kind.tag(), mode.as_str());
    AnimationBuilder::fixed(name, leave_spec(kind, mode))
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn enter_spec(kind: OverlayKind, mode: Mode) -> AnimationSpec {
    use AnimatedProperty::*;

    match (kind, mode) {
        (OverlayKind::Modal, Mode::Ios) => AnimationSpec::new(ms(400))
            .easing(Easing::EaseOut)
            .property(TranslateY { from: 100.0, to: 0.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.4 }),
        (OverlayKind::Modal, Mode::Md) => AnimationSpec::new(ms(280))
            .easing(Easing::EaseOut)
            .property(TranslateY { from: 40.0, to: 0.0 })
            .property(Opacity { from: 0.01, to: 1.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.32 }),
        (OverlayKind::Popover, Mode::Ios) => AnimationSpec::new(ms(100))
            .easing(Easing::EaseOut)
            .property(Opacity { from: 0.01, to: 1.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.08 }),
        (OverlayKind::Popover, Mode::Md) => AnimationSpec::new(ms(300))
            .easing(Easing::EaseOut)
            .property(Scale { from: 0.001, to: 1.0 })
            .property(Opacity { from: 0.01, to: 1.0 }),
        (OverlayKind::Alert, Mode::Ios) => AnimationSpec::new(ms(200))
            .easing(Easing::EaseInOut)
            .property(Scale { from: 1.1, to: 1.0 })
            .property(Opacity { from: 0.01, to: 1.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.3 }),
        (OverlayKind::Alert, Mode::Md) => AnimationSpec::new(ms(150))
            .easing(Easing::EaseInOut)
            .property(Scale { from: 0.9, to: 1.0 })
            .property(Opacity { from: 0.01, to: 1.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.32 }),
        (OverlayKind::ActionSheet, Mode::Ios) => AnimationSpec::new(ms(400))
            .easing(Easing::EaseOut)
            .property(TranslateY { from: 100.0, to: 0.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.4 }),
        (OverlayKind::ActionSheet, Mode::Md) => AnimationSpec::new(ms(400))
            .easing(Easing::EaseOut)
            .property(TranslateY { from: 100.0, to: 0.0 })
            .property(BackdropOpacity { from: 0.01, to: 0.32 }),
    }
}

fn leave_spec(kind: OverlayKind, mode: Mode) -> AnimationSpec {
    use AnimatedProperty::*;

    match (kind, mode) {
        (OverlayKind::Modal, Mode::Ios) => AnimationSpec::new(ms(250))
            .easing(Easing::EaseIn)
            .property(TranslateY { from: 0.0, to: 100.0 })
            .property(BackdropOpacity { from: 0.4, to: 0.0 }),
        (OverlayKind::Modal, Mode::Md) => AnimationSpec::new(ms(200))
            .easing(Easing::EaseIn)
            .property(TranslateY { from: 0.0, to: 40.0 })
            .property(Opacity { from: 1.0, to: 0.0 }),
        (OverlayKind::Popover, Mode::Ios) => AnimationSpec::new(ms(500))
            .easing(Easing::EaseIn)
            .property(Opacity { from: 0.99, to: 0.0 })
            .property(BackdropOpacity { from: 0.08, to: 0.0 }),
        (OverlayKind::Popover, Mode::Md) => AnimationSpec::new(ms(500))
            .easing(Easing::EaseIn)
            .property(Opacity { from: 0.99, to: 0.0 }),
        (OverlayKind::Alert, Mode::Ios) | (OverlayKind::Alert, Mode::Md) => {
            AnimationSpec::new(ms(if mode == Mode::Ios { 200 } else { 150 }))
                .easing(Easing::EaseInOut)
                .property(Scale { from: 1.0, to: 0.9 })
                .property(Opacity { from: 0.99, to: 0.0 })
                .property(BackdropOpacity { from: 0.3, to: 0.0 })
        }
        (OverlayKind::ActionSheet, Mode::Ios) => AnimationSpec::new(ms(450))
            .easing(Easing::EaseIn)
            .property(TranslateY { from: 0.0, to: 100.0 })
            .property(BackdropOpacity { from: 0.4, to: 0.0 }),
        (OverlayKind::ActionSheet, Mode::Md) => AnimationSpec::new(ms(250))
            .easing(Easing::EaseIn)
            .property(TranslateY { from: 0.0, to: 100.0 })
            .property(BackdropOpacity { from: 0.32, to: 0.0 }),
    }
}
