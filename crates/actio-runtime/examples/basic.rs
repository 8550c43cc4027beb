//! Example: Basic usage of the actio runtime

use actio_dom::{Document, DocumentHandle, EventPayload};
use actio_runtime::{ActionRuntime, LifecycleEvent};
use anyhow::ensure;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Build a small document with one scene and a clickable button
    let mut document = Document::new("demo", "https://example.com/");
    let scene = document.tree_mut().create_element("div");
    let button = document.tree_mut().create_element_with_id("button", "counter");
    document.tree_mut().set_attr(
        button,
        "data-click-action",
        "clicks = (if clicks == () { 0 } else { clicks }) + 1; clicks",
    );
    document.tree_mut().append_child(scene, button);
    document.add_scene("main", scene);
    document.set_current_scene(Some("main"));

    let mut runtime = ActionRuntime::new(DocumentHandle::new(document));
    println!("actio runtime v{} initialized", actio_runtime::VERSION);

    runtime.dispatch_lifecycle(LifecycleEvent::DocumentReady);
    runtime.dispatch_lifecycle(LifecycleEvent::SceneLoad {
        scene_id: "main".to_string(),
    });

    for _ in 0..3 {
        let result = runtime.dispatch_native_event(EventPayload::native("click", button));
        println!("click -> {:?}", result);
    }

    let clicks = runtime.document().borrow().custom_data("clicks");
    ensure!(clicks == actio_dom::Value::Int(3), "expected three clicks");
    println!("custom data 'clicks' = {}", clicks);
    Ok(())
}
