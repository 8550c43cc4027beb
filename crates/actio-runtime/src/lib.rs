//! actio runtime
//!
//! Binds declarative markup attributes to executable action snippets:
//! native input via root-level delegation, observer and frame
//! resources scoped to scene lifecycles, window/document events,
//! physics collisions, and lifecycle transitions. Snippet execution
//! and scope resolution live in `actio-script`; this crate wires them
//! to a document.

pub mod attributes;
pub mod delegate;
pub mod frame;
pub mod intersection_observer;
pub mod lifecycle;
pub mod mutation_observer;
pub mod physics;
pub mod registry;
pub mod resize_observer;

pub use delegate::EventDelegator;
pub use intersection_observer::{IntersectionOptions, Rect};
pub use lifecycle::LifecycleEvent;
pub use physics::{CollisionPair, CollisionPhase};
pub use registry::{ObserverKind, PendingAction, Registration, ResourceRegistry};

use actio_dom::{DocumentHandle, EventPayload, NodeId, Value};
use actio_script::{ActionTrigger, Settings, TriggerOptions};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-document action-event runtime.
///
/// Owns the trigger, the resource registry and (once the document is
/// ready) the event delegator. All entry points are synchronous; a
/// failing snippet never aborts dispatch to subsequent elements.
pub struct ActionRuntime {
    doc: DocumentHandle,
    settings: Rc<RefCell<Settings>>,
    trigger: ActionTrigger,
    registry: ResourceRegistry,
    delegator: Option<EventDelegator>,
    ready: bool,
}

impl ActionRuntime {
    pub fn new(doc: DocumentHandle) -> Self {
        Self::with_settings(doc, Settings::default())
    }

    pub fn with_settings(doc: DocumentHandle, settings: Settings) -> Self {
        let settings = Rc::new(RefCell::new(settings));
        let trigger = ActionTrigger::new(&doc, Rc::clone(&settings));
        let registry = ResourceRegistry::new(doc.clone(), Rc::clone(&settings));
        Self {
            doc,
            settings,
            trigger,
            registry,
            delegator: None,
            ready: false,
        }
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.doc
    }

    pub fn settings(&self) -> Rc<RefCell<Settings>> {
        Rc::clone(&self.settings)
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn delegator(&self) -> Option<&EventDelegator> {
        self.delegator.as_ref()
    }

    /// Execute an arbitrary snippet against an element/event context.
    pub fn trigger_action(&self, code: &str, options: TriggerOptions) -> Option<Value> {
        self.trigger.trigger(code, options)
    }

    /// Scan `root` (defaults to the active scene root) for elements
    /// carrying `attr` and fire each one's value as an action.
    pub fn trigger_actions_by_attribute(
        &self,
        attr: &str,
        root: Option<NodeId>,
        event: &EventPayload,
    ) {
        let root = match root.or_else(|| self.doc.borrow().current_scene_root()) {
            Some(root) => root,
            None => return,
        };
        let bindings: Vec<(NodeId, String)> = {
            let doc = self.doc.borrow();
            let tree = doc.tree();
            tree.query_by_attribute(root, attr)
                .into_iter()
                .filter_map(|node| {
                    tree.attr(node, attr)
                        .filter(|code| !code.is_empty())
                        .map(|code| (node, code.to_string()))
                })
                .collect()
        };
        for (element, code) in bindings {
            let mut event = event.clone();
            event.target = Some(element);
            self.trigger.trigger(
                &code,
                TriggerOptions {
                    element: Some(element),
                    event: Some(event),
                    ..Default::default()
                },
            );
        }
    }

    /// Route a native input event through the delegator. Returns the
    /// snippet result when an action fired.
    pub fn dispatch_native_event(&self, event: EventPayload) -> Option<Value> {
        let action = self.delegator.as_ref()?.dispatch(event)?;
        self.fire(action)
    }

    /// Advance the frame loop one host tick.
    pub fn tick(&mut self) {
        for action in self.registry.tick() {
            self.fire(action);
        }
    }

    /// Feed host-measured element sizes to the resize observers.
    pub fn process_sizes(&mut self, sizes: &HashMap<NodeId, (f64, f64)>) {
        for action in self.registry.process_sizes(sizes) {
            self.fire(action);
        }
    }

    /// Feed host-measured rects to the intersection observers.
    pub fn process_intersections(&mut self, viewport: Rect, rects: &HashMap<NodeId, Rect>) {
        for action in self.registry.process_intersections(viewport, rects) {
            self.fire(action);
        }
    }

    /// Report an attribute mutation to interested observers.
    pub fn notify_attribute_change(
        &mut self,
        target: NodeId,
        name: &str,
        old_value: Option<String>,
    ) {
        for action in self.registry.notify_attribute_change(target, name, old_value) {
            self.fire(action);
        }
    }

    /// Report a child-list mutation to interested observers.
    pub fn notify_child_list_change(
        &mut self,
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    ) {
        for action in self.registry.notify_child_list_change(target, added, removed) {
            self.fire(action);
        }
    }

    /// Report a window-level event (scroll, hashchange, ...).
    pub fn dispatch_window_event(&self, event_type: &str) {
        for action in self.registry.window_event(event_type) {
            self.fire(action);
        }
    }

    /// Report a document-level event (visibilitychange, ...).
    pub fn dispatch_document_event(&self, event_type: &str) {
        for action in self.registry.document_event(event_type) {
            self.fire(action);
        }
    }

    /// Report collision pairs for one phase from the host physics
    /// engine.
    pub fn dispatch_collisions(&self, phase: CollisionPhase, pairs: &[CollisionPair]) {
        for action in self.registry.collisions(phase, pairs) {
            self.fire(action);
        }
    }

    pub(crate) fn fire(&self, action: PendingAction) -> Option<Value> {
        self.trigger.trigger(
            &action.code,
            TriggerOptions {
                element: Some(action.element),
                event: Some(action.event),
                ..Default::default()
            },
        )
    }

    pub(crate) fn set_delegator(&mut self, delegator: EventDelegator) {
        self.delegator = Some(delegator);
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actio_dom::Document;

    fn runtime_with_scene() -> (ActionRuntime, NodeId) {
        let mut document = Document::new("doc-1", "https://example.com/");
        let root = document.tree_mut().create_element("div");
        document.add_scene("scene-1", root);
        document.set_current_scene(Some("scene-1"));
        let runtime = ActionRuntime::new(DocumentHandle::new(document));
        (runtime, root)
    }

    #[test]
    fn test_two_elements_two_independent_invocations() {
        let (mut runtime, root) = runtime_with_scene();
        {
            let doc = runtime.document().clone();
            let mut d = doc.borrow_mut();
            let a = d.tree_mut().create_element("div");
            let b = d.tree_mut().create_element("div");
            d.tree_mut()
                .set_attr(a, "data-click-action", "hits_a = (if hits_a == () { 0 } else { hits_a }) + 1");
            d.tree_mut()
                .set_attr(b, "data-click-action", "hits_b = (if hits_b == () { 0 } else { hits_b }) + 1");
            d.tree_mut().append_child(root, a);
            d.tree_mut().append_child(root, b);
        }
        runtime.dispatch_lifecycle(LifecycleEvent::DocumentReady);

        let (a, b) = {
            let doc = runtime.document().borrow();
            let children = doc.tree().children(root);
            (children[0], children[1])
        };
        runtime.dispatch_native_event(EventPayload::native("click", a));
        runtime.dispatch_native_event(EventPayload::native("click", b));

        let doc = runtime.document().borrow();
        assert_eq!(doc.custom_data("hits_a"), Value::Int(1));
        assert_eq!(doc.custom_data("hits_b"), Value::Int(1));
    }

    #[test]
    fn test_click_action_increments_three_times() {
        let (mut runtime, root) = runtime_with_scene();
        {
            let doc = runtime.document().clone();
            let mut d = doc.borrow_mut();
            d.tree_mut()
                .set_attr(root, "data-click-action", "x = (if x == () { 0 } else { x }) + 1");
        }
        runtime.dispatch_lifecycle(LifecycleEvent::DocumentReady);

        for _ in 0..3 {
            runtime.dispatch_native_event(EventPayload::native("click", root));
        }
        assert_eq!(runtime.document().borrow().custom_data("x"), Value::Int(3));
    }

    #[test]
    fn test_scan_and_trigger_by_attribute() {
        let (runtime, root) = runtime_with_scene();
        {
            let doc = runtime.document().clone();
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element("div");
            d.tree_mut().set_attr(el, "data-custom-thing", "ran = true");
            d.tree_mut().append_child(root, el);
        }
        runtime.trigger_actions_by_attribute("data-custom-thing", None, &EventPayload::empty());
        assert_eq!(
            runtime.document().borrow().custom_data("ran"),
            Value::Bool(true)
        );
    }
}
