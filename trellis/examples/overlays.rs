//! Walks a document through a few overlay lifecycles.
//!
//! Run with `cargo run -p trellis --example overlays` and read `overlays.log`.

use std::fs::File;
use std::time::Duration;

use layerdom::{Document, Key, KeyEvent, Node};
use serde_json::json;
use simplelog::{LevelFilter, WriteLogger};
use trellis::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = File::create("overlays.log")?;
    WriteLogger::init(LevelFilter::Debug, simplelog::Config::default(), log_file)
        .expect("Failed to initialize logger");

    let document = Document::new();
    document.body().append_child(&Node::new("app-root"));

    let config = Config::from_json(r#"{ "mode": "ios" }"#)?;
    let controller = OverlayController::with_timed_animations(document.clone(), config);

    // A modal with a form: present, fill in, dismiss with data.
    let form = Node::new("modal")
        .child(Node::new("h1"))
        .child(Node::new("input").with_attr("name", "title"))
        .child(Node::new("button"));
    let pending = controller.create_overlay_with(form, OverlayKind::Modal, OverlayOptions::new().id("editor"));
    pending.overlay().mark_ready();
    let editor = pending.ready().await;

    let did_dismiss = editor.on_did_dismiss();
    editor.present().await?;
    if let Some(focused) = editor.auto_focus() {
        println!("focused <{}> inside #{}", focused.tag(), editor.id());
    }
    controller
        .dismiss_overlay(Some(json!({ "title": "Groceries" })), Some("save"), "modal", Some("editor"))
        .await?;
    if let Some(detail) = did_dismiss.await {
        println!("editor closed with {:?} (cancelled: {})", detail.data, detail.is_cancel());
    }

    // An alert closed with the escape key.
    let pending = controller.create_overlay(OverlayKind::Alert, OverlayOptions::new());
    pending.overlay().mark_ready();
    let alert = pending.ready().await;
    let did_dismiss = alert.on_did_dismiss();
    alert.present().await?;
    document.dispatch_key(&KeyEvent::release(Key::Escape));
    if let Some(detail) = did_dismiss.await {
        println!("alert closed by {:?}", detail.role);
    }

    // Back button: the top overlay outranks the page handler.
    let pending = controller.create_overlay(OverlayKind::ActionSheet, OverlayOptions::new());
    pending.overlay().mark_ready();
    let sheet = pending.ready().await;
    sheet.present().await?;

    let dispatcher = BackButtonDispatcher::new();
    dispatcher.add_listener(|ev| ev.register_sync(0, || println!("page: navigate back")));
    let overlays = controller.clone();
    dispatcher.add_listener(move |ev| {
        if let Some(top) = overlays.get_overlay(None, None) {
            ev.register_async(100, move || async move {
                if let Err(err) = top.dismiss(None, Some(CANCEL)).await {
                    log::warn!("back button dismissal failed: {}", err);
                }
            });
        }
    });

    if let BackButtonOutcome::Pending { priority, task } = dispatcher.handle_back_button() {
        println!("back handled at priority {priority}");
        // Still closing, so this one is dropped.
        println!("second press: {:?}", dispatcher.handle_back_button());
        task.await?;
    }
    println!("third press: {:?}", dispatcher.handle_back_button());

    tokio::time::sleep(Duration::from_millis(10)).await;
    println!("{} overlay(s) left", controller.get_overlays(None).len());
    Ok(())
}
