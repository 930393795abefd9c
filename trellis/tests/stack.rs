mod common;

use common::{MockAnimations, controller, presented_overlay, ready_overlay};
use layerdom::Node;
use trellis::{APP_ROOT_TAG, OverlayError, OverlayKind, OverlayOptions};

fn indices(overlays: &[std::sync::Arc<trellis::Overlay>]) -> Vec<u64> {
    overlays.iter().map(|o| o.index()).collect()
}

#[tokio::test]
async fn test_top_overlay_is_last_attached() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let a = presented_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    let b = presented_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    let c = presented_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;

    assert_eq!(indices(&ctrl.get_overlays(None)), vec![a.index(), b.index(), c.index()]);
    assert_eq!(ctrl.get_overlay(None, None).unwrap().index(), c.index());

    c.dismiss(None, None).await.unwrap();
    assert_eq!(ctrl.get_overlay(None, None).unwrap().index(), b.index());
    assert_eq!(ctrl.get_overlays(None).len(), 2);
}

#[tokio::test]
async fn test_empty_stack_has_no_top() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    assert!(ctrl.get_overlays(None).is_empty());
    assert!(ctrl.get_overlay(None, None).is_none());
}

#[tokio::test]
async fn test_tag_filter_is_case_insensitive() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let alert = ready_overlay(&ctrl, OverlayKind::Alert, OverlayOptions::new()).await;
    let modal = ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    let sheet = ready_overlay(&ctrl, OverlayKind::ActionSheet, OverlayOptions::new()).await;

    assert_eq!(indices(&ctrl.get_overlays(Some("ALERT"))), vec![alert.index()]);
    assert_eq!(indices(&ctrl.get_overlays(Some("Action-Sheet"))), vec![sheet.index()]);
    assert_eq!(
        ctrl.get_overlay(Some("modal"), None).map(|o| o.index()),
        Some(modal.index())
    );
    assert!(ctrl.get_overlay(Some("popover"), None).is_none());
}

#[tokio::test]
async fn test_lookup_by_id() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let first = ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new().id("settings")).await;
    ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;

    let found = ctrl.get_overlay(Some("modal"), Some("settings")).unwrap();
    assert_eq!(found.index(), first.index());
    assert!(ctrl.get_overlay(Some("alert"), Some("settings")).is_none());
    assert!(ctrl.get_overlay(None, Some("missing")).is_none());
}

#[tokio::test]
async fn test_overlays_attach_to_app_root() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let app = Node::new(APP_ROOT_TAG);
    ctrl.document().body().append_child(&app);

    let overlay = ready_overlay(&ctrl, OverlayKind::Popover, OverlayOptions::new()).await;
    assert_eq!(overlay.element().parent(), Some(app.clone()));
    assert_eq!(ctrl.app_root(), app);
    assert_eq!(ctrl.get_overlays(None).len(), 1);
}

#[tokio::test]
async fn test_non_overlay_children_are_ignored() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let overlay = ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    ctrl.document().body().append_child(&Node::new("main"));

    assert_eq!(ctrl.get_overlay(None, None).unwrap().index(), overlay.index());
}

#[tokio::test]
async fn test_manually_detached_overlay_leaves_stack() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let a = ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    let b = ready_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;

    b.element().remove();
    assert_eq!(indices(&ctrl.get_overlays(None)), vec![a.index()]);
}

#[tokio::test]
async fn test_dismiss_overlay_by_lookup() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let sheet = presented_overlay(&ctrl, OverlayKind::ActionSheet, OverlayOptions::new().id("share")).await;

    let dismissed = ctrl
        .dismiss_overlay(None, Some("cancel"), "action-sheet", Some("share"))
        .await
        .unwrap();
    assert!(dismissed);
    assert!(!sheet.is_presented());
    assert!(ctrl.get_overlays(None).is_empty());
}

#[tokio::test]
async fn test_dismiss_overlay_not_found() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    presented_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new().id("present")).await;

    let err = ctrl
        .dismiss_overlay(None, None, "modal", Some("absent"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        OverlayError::NotFound { ref tag, ref id } if tag == "modal" && id.as_deref() == Some("absent")
    ));

    let err = ctrl.dismiss_overlay(None, None, "alert", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_dismiss_overlay_on_unpresented_returns_false() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    ready_overlay(&ctrl, OverlayKind::Alert, OverlayOptions::new()).await;

    let dismissed = ctrl.dismiss_overlay(None, None, "alert", None).await.unwrap();
    assert!(!dismissed);
    assert_eq!(mock.created_count(), 0);
}

#[test]
fn test_detached_overlay_is_released() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let pending = ctrl.create_overlay(OverlayKind::Modal, OverlayOptions::new());
    let weak = std::sync::Arc::downgrade(pending.overlay());
    let element = pending.overlay().element().clone();
    drop(pending);

    assert!(weak.upgrade().is_some());
    element.remove();
    assert!(ctrl.get_overlays(None).is_empty());
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_dropping_controller_releases_overlays() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let document = ctrl.document().clone();
    let pending = ctrl.create_overlay(OverlayKind::Alert, OverlayOptions::new());
    let weak = std::sync::Arc::downgrade(pending.overlay());
    drop(pending);

    drop(ctrl);
    assert!(weak.upgrade().is_none());
    // The element stays in the document; escape no longer reaches a stack.
    assert!(document.query_selector("alert").is_some());
    document.dispatch_key(&layerdom::KeyEvent::release(layerdom::Key::Escape));
}

#[tokio::test]
async fn test_held_overlay_outlives_controller() {
    let mock = MockAnimations::new();
    let ctrl = controller(&mock);
    let overlay = presented_overlay(&ctrl, OverlayKind::Modal, OverlayOptions::new()).await;
    drop(ctrl);

    assert!(overlay.dismiss(None, None).await.unwrap());
    assert!(overlay.element().parent().is_none());
}
