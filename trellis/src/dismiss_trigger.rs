//! Document-level escape handling.
//!
//! The first overlay created on a controller installs one key listener on the
//! document. On escape key-up it re-queries the stack and dismisses the top
//! overlay with the [`BACKDROP`] role if that overlay allows it.

use std::sync::{Arc, Weak};

use layerdom::{Key, KeyEvent};

use crate::controller::{OverlayStack, Shared};
use crate::overlay::{BACKDROP, Dismissible};

/// Key that closes the top overlay.
pub const DISMISS_KEY: Key = Key::Escape;

pub(crate) fn connect_listeners(shared: &Arc<Shared>, stack: &Arc<OverlayStack>) {
    if !stack.claim_listeners() {
        return;
    }
    // Weak: the document owns the listener and `Shared` owns the document.
    let weak_shared: Weak<Shared> = Arc::downgrade(shared);
    let weak_stack: Weak<OverlayStack> = Arc::downgrade(stack);
    shared.document.add_key_listener(move |event: &KeyEvent| {
        if !event.is_release() || event.key != DISMISS_KEY {
            return;
        }
        let (Some(shared), Some(stack)) = (weak_shared.upgrade(), weak_stack.upgrade()) else {
            return;
        };
        if let Some(top) = stack.top(&shared.app_root(), None, None) {
            dismiss_from_backdrop(top);
        }
    });
    log::debug!("[overlay] document dismiss listener installed");
}

/// Fire-and-forget backdrop dismissal of `target`.
pub fn dismiss_from_backdrop(target: Arc<dyn Dismissible>) {
    if !target.backdrop_dismiss() {
        log::trace!("[overlay] top overlay ignores backdrop dismissal");
        return;
    }
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(err) = target.dismiss(None, Some(BACKDROP)).await {
                    log::warn!("[overlay] backdrop dismissal failed: {}", err);
                }
            });
        }
        Err(_) => log::warn!("[overlay] no async runtime, backdrop dismissal dropped"),
    }
}
