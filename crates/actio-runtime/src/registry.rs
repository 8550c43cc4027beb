//! Resource registry
//!
//! Per-document owner of every lifecycle-bound native resource:
//! size/visibility/mutation observers, the shared frame loop, and
//! window/document listener bookkeeping. Resources attach on scene
//! entry and detach on scene exit; observer handles are keyed by
//! (element id, kind) and reused instead of duplicated.

use crate::attributes::{self, action_attr, config_attr, parse_flag};
use crate::frame::FrameLoop;
use crate::intersection_observer::{
    parse_thresholds, IntersectionObserverManager, IntersectionOptions, Rect,
};
use crate::mutation_observer::{MutationInit, MutationObserverManager, MutationType};
use crate::physics::{collision_payload, CollisionPair, CollisionPhase};
use crate::resize_observer::ResizeObserverManager;
use actio_dom::{DocumentHandle, EventPayload, NodeId, Value};
use actio_script::Settings;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Observer kind, one registration slot per element id and kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    Resize,
    Intersection,
    Mutation,
}

/// A live observer handle bound to a declaring element
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    /// Handle into the matching observer manager
    pub observer_id: u64,
    /// Element whose attribute declared the action
    pub element: NodeId,
    /// Element actually observed (may differ via a target selector)
    pub target: NodeId,
}

/// An action the registry wants fired. The registry never executes
/// code itself; callers pass these to the trigger.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub element: NodeId,
    pub code: String,
    pub event: EventPayload,
}

/// Per-document resource registry
pub struct ResourceRegistry {
    doc: DocumentHandle,
    settings: Rc<RefCell<Settings>>,
    resize: ResizeObserverManager,
    intersection: IntersectionObserverManager,
    mutation: MutationObserverManager,
    frames: FrameLoop,
    registrations: HashMap<(String, ObserverKind), Registration>,
    /// Registrations worked while the current scene is active
    scene_worked: Vec<(String, ObserverKind)>,
    window_listeners: HashSet<String>,
    document_listeners: HashSet<String>,
    physics_armed: bool,
    active_scene: Option<String>,
}

impl ResourceRegistry {
    pub fn new(doc: DocumentHandle, settings: Rc<RefCell<Settings>>) -> Self {
        Self {
            doc,
            settings,
            resize: ResizeObserverManager::new(),
            intersection: IntersectionObserverManager::new(),
            mutation: MutationObserverManager::new(),
            frames: FrameLoop::new(),
            registrations: HashMap::new(),
            scene_worked: Vec::new(),
            window_listeners: HashSet::new(),
            document_listeners: HashSet::new(),
            physics_armed: false,
            active_scene: None,
        }
    }

    pub fn active_scene(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn registration(&self, element_key: &str, kind: ObserverKind) -> Option<&Registration> {
        self.registrations.get(&(element_key.to_string(), kind))
    }

    pub fn is_window_listening(&self, event_type: &str) -> bool {
        self.window_listeners.contains(event_type)
    }

    pub fn is_document_listening(&self, event_type: &str) -> bool {
        self.document_listeners.contains(event_type)
    }

    pub fn frames_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn physics_armed(&self) -> bool {
        self.physics_armed
    }

    /// Stable registry key for an element: its markup id when present,
    /// otherwise a synthetic key from the arena index.
    pub fn element_key(&self, node: NodeId) -> String {
        let doc = self.doc.borrow();
        match doc.tree().element_id(node) {
            Some(id) => id.to_string(),
            None => format!("node-{}", node.index()),
        }
    }

    /// Attach resources for a scene. Re-entering the active scene is
    /// safe: existing registrations are reused, never duplicated.
    pub fn enter_scene(&mut self, scene_id: &str) {
        let root = match self.doc.borrow().scene_root(scene_id) {
            Some(root) => root,
            None => {
                tracing::warn!(scene = scene_id, "enter_scene: unknown scene");
                return;
            }
        };
        self.active_scene = Some(scene_id.to_string());

        self.attach_resize(root);
        self.attach_intersection(root);
        self.attach_mutation(root);

        let doc = self.doc.borrow();
        let tree = doc.tree();

        if !tree.query_by_attribute(root, &action_attr(attributes::FRAME)).is_empty() {
            self.frames.start();
        }

        let settings = self.settings.borrow();
        for event_type in &settings.window_events {
            if !tree.query_by_attribute(root, &action_attr(event_type)).is_empty() {
                self.window_listeners.insert(event_type.clone());
            }
        }
        for event_type in &settings.document_events {
            if !tree.query_by_attribute(root, &action_attr(event_type)).is_empty() {
                self.document_listeners.insert(event_type.clone());
            }
        }

        let has_engine = doc.element_property(root, "physics-engine").is_some();
        let declares_collision = settings.physics_events.iter().any(|token| {
            !tree.query_by_attribute(root, &action_attr(token)).is_empty()
        });
        self.physics_armed =
            has_engine && !settings.physics_events.is_empty() && declares_collision;

        tracing::debug!(
            scene = scene_id,
            registrations = self.registrations.len(),
            frames = self.frames.is_running(),
            physics = self.physics_armed,
            "scene resources attached"
        );
    }

    /// Detach everything the active scene attached. Size/visibility
    /// observer handles survive for reuse; their targets are
    /// unobserved. Mutation observers are fully disconnected.
    pub fn exit_scene(&mut self) {
        for key in std::mem::take(&mut self.scene_worked) {
            let Some(reg) = self.registrations.get(&key).copied() else {
                continue;
            };
            match key.1 {
                ObserverKind::Resize => {
                    if let Some(observer) = self.resize.get(reg.observer_id) {
                        observer.unobserve(reg.target);
                    }
                }
                ObserverKind::Intersection => {
                    if let Some(observer) = self.intersection.get(reg.observer_id) {
                        observer.unobserve(reg.target);
                    }
                }
                ObserverKind::Mutation => {
                    if let Some(observer) = self.mutation.get(reg.observer_id) {
                        observer.disconnect();
                    }
                    self.mutation.remove(reg.observer_id);
                    self.registrations.remove(&key);
                }
            }
        }
        self.frames.stop();
        self.window_listeners.clear();
        self.document_listeners.clear();
        self.physics_armed = false;
        let scene = self.active_scene.take();
        tracing::debug!(scene = scene.as_deref(), "scene resources detached");
    }

    fn mark_worked(&mut self, key: (String, ObserverKind)) {
        if !self.scene_worked.contains(&key) {
            self.scene_worked.push(key);
        }
    }

    /// Resolve the observed target: an explicit `…-target` attribute
    /// naming an element id wins over the declaring element.
    fn resolve_target(&self, element: NodeId, kind_token: &str) -> NodeId {
        let doc = self.doc.borrow();
        let tree = doc.tree();
        tree.attr(element, &config_attr(kind_token, "target"))
            .and_then(|id| tree.element_by_id(id))
            .unwrap_or(element)
    }

    fn attach_resize(&mut self, root: NodeId) {
        let declaring = self
            .doc
            .borrow()
            .tree()
            .query_by_attribute(root, &action_attr(attributes::RESIZE));
        for element in declaring {
            let key = (self.element_key(element), ObserverKind::Resize);
            let target = self.resolve_target(element, attributes::RESIZE);
            let observer_id = match self.registrations.get(&key) {
                Some(reg) => reg.observer_id,
                None => self.resize.create(),
            };
            if let Some(observer) = self.resize.get(observer_id) {
                observer.observe(target);
            }
            self.registrations.insert(
                key.clone(),
                Registration {
                    observer_id,
                    element,
                    target,
                },
            );
            self.mark_worked(key);
        }
    }

    fn attach_intersection(&mut self, root: NodeId) {
        let declaring = self
            .doc
            .borrow()
            .tree()
            .query_by_attribute(root, &action_attr(attributes::INTERSECTION));
        for element in declaring {
            let key = (self.element_key(element), ObserverKind::Intersection);
            let target = self.resolve_target(element, attributes::INTERSECTION);
            let observer_id = match self.registrations.get(&key) {
                Some(reg) => reg.observer_id,
                None => {
                    let options = self.intersection_options(element);
                    self.intersection.create(options)
                }
            };
            if let Some(observer) = self.intersection.get(observer_id) {
                observer.observe(target);
            }
            self.registrations.insert(
                key.clone(),
                Registration {
                    observer_id,
                    element,
                    target,
                },
            );
            self.mark_worked(key);
        }
    }

    fn intersection_options(&self, element: NodeId) -> IntersectionOptions {
        let doc = self.doc.borrow();
        let tree = doc.tree();
        let mut options = IntersectionOptions::default();
        if let Some(root) = tree.attr(element, &config_attr(attributes::INTERSECTION, "root")) {
            options.root = Some(root.to_string());
        }
        if let Some(margin) = tree.attr(element, &config_attr(attributes::INTERSECTION, "margin")) {
            options.root_margin = margin.to_string();
        }
        if let Some(raw) = tree.attr(element, &config_attr(attributes::INTERSECTION, "threshold")) {
            options.threshold = parse_thresholds(raw);
        }
        options
    }

    fn attach_mutation(&mut self, root: NodeId) {
        let declaring = self
            .doc
            .borrow()
            .tree()
            .query_by_attribute(root, &action_attr(attributes::MUTATION));
        for element in declaring {
            let key = (self.element_key(element), ObserverKind::Mutation);
            let target = self.resolve_target(element, attributes::MUTATION);
            let init = self.mutation_init(element);
            let observer_id = match self.registrations.get(&key) {
                Some(reg) => reg.observer_id,
                None => self.mutation.create(),
            };
            if let Some(observer) = self.mutation.get(observer_id) {
                observer.observe(target, init);
            }
            self.registrations.insert(
                key.clone(),
                Registration {
                    observer_id,
                    element,
                    target,
                },
            );
            self.mark_worked(key);
        }
    }

    fn mutation_init(&self, element: NodeId) -> MutationInit {
        let doc = self.doc.borrow();
        let tree = doc.tree();
        let flag = |name: &str, default: bool| {
            parse_flag(tree.attr(element, &config_attr(attributes::MUTATION, name)), default)
        };
        MutationInit {
            child_list: flag("child-list", true),
            attributes: flag("attributes", true),
            character_data: flag("character-data", false),
            subtree: flag("subtree", false),
            attribute_old_value: flag("attribute-old-value", false),
            attribute_filter: tree
                .attr(element, &config_attr(attributes::MUTATION, "filter"))
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                }),
        }
    }

    /// Code attribute read lazily at fire time
    fn action_code(&self, element: NodeId, attr: &str) -> Option<String> {
        let doc = self.doc.borrow();
        let code = doc.tree().attr(element, attr)?;
        if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        }
    }

    /// Advance the frame loop one host tick. Frame-declared elements
    /// are re-queried every tick so markup changes take effect.
    pub fn tick(&mut self) -> Vec<PendingAction> {
        let Some((scene_frames, document_frames)) = self.frames.tick() else {
            return Vec::new();
        };
        let Some(root) = self.scene_root() else {
            return Vec::new();
        };
        let attr = action_attr(attributes::FRAME);
        let declaring = self.doc.borrow().tree().query_by_attribute(root, &attr);
        declaring
            .into_iter()
            .filter_map(|element| {
                let code = self.action_code(element, &attr)?;
                let mut event = EventPayload::frame(scene_frames, document_frames);
                event.target = Some(element);
                Some(PendingAction { element, code, event })
            })
            .collect()
    }

    /// Feed host-measured sizes through the resize observers
    pub fn process_sizes(&mut self, sizes: &HashMap<NodeId, (f64, f64)>) -> Vec<PendingAction> {
        let attr = action_attr(attributes::RESIZE);
        let results = self.resize.process(sizes);
        let mut pending = Vec::new();
        for (observer_id, entries) in results {
            for entry in entries {
                let Some(reg) = self.registration_for(observer_id, ObserverKind::Resize, entry.target)
                else {
                    continue;
                };
                if let Some(code) = self.action_code(reg.element, &attr) {
                    let event = EventPayload::native("resize", entry.target)
                        .with_field("width", Value::Float(entry.width))
                        .with_field("height", Value::Float(entry.height));
                    pending.push(PendingAction {
                        element: reg.element,
                        code,
                        event,
                    });
                }
            }
        }
        pending
    }

    /// Feed host-measured rects through the intersection observers
    pub fn process_intersections(
        &mut self,
        viewport: Rect,
        element_rects: &HashMap<NodeId, Rect>,
    ) -> Vec<PendingAction> {
        let attr = action_attr(attributes::INTERSECTION);
        let results = self.intersection.process(viewport, element_rects);
        let mut pending = Vec::new();
        for (observer_id, entries) in results {
            for entry in entries {
                let Some(reg) =
                    self.registration_for(observer_id, ObserverKind::Intersection, entry.target)
                else {
                    continue;
                };
                if let Some(code) = self.action_code(reg.element, &attr) {
                    let event = EventPayload::native("intersection", entry.target)
                        .with_field("intersectionRatio", Value::Float(entry.intersection_ratio))
                        .with_field("isIntersecting", Value::Bool(entry.is_intersecting));
                    pending.push(PendingAction {
                        element: reg.element,
                        code,
                        event,
                    });
                }
            }
        }
        pending
    }

    /// Record an attribute mutation and collect actions it triggers
    pub fn notify_attribute_change(
        &mut self,
        target: NodeId,
        name: &str,
        old_value: Option<String>,
    ) -> Vec<PendingAction> {
        let path = self.doc.borrow().tree().ancestors_inclusive(target);
        self.mutation
            .notify_attribute_change(target, name, old_value, &path);
        self.drain_mutations()
    }

    /// Record a child-list mutation and collect actions it triggers
    pub fn notify_child_list_change(
        &mut self,
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    ) -> Vec<PendingAction> {
        let path = self.doc.borrow().tree().ancestors_inclusive(target);
        self.mutation.notify_child_change(target, added, removed, &path);
        self.drain_mutations()
    }

    fn drain_mutations(&mut self) -> Vec<PendingAction> {
        let attr = action_attr(attributes::MUTATION);
        let results = self.mutation.take_all();
        let mut pending = Vec::new();
        for (observer_id, records) in results {
            let Some(reg) = self
                .registrations
                .iter()
                .find(|((_, kind), reg)| {
                    *kind == ObserverKind::Mutation && reg.observer_id == observer_id
                })
                .map(|(_, reg)| *reg)
            else {
                continue;
            };
            for record in records {
                if let Some(code) = self.action_code(reg.element, &attr) {
                    let kind = match record.mutation_type {
                        MutationType::Attributes => "attributes",
                        MutationType::CharacterData => "characterData",
                        MutationType::ChildList => "childList",
                    };
                    let mut event = EventPayload::native("mutation", record.target)
                        .with_field("mutationType", Value::Str(kind.to_string()));
                    if let Some(name) = record.attribute_name {
                        event.set("attributeName", Value::Str(name));
                    }
                    if let Some(old) = record.old_value {
                        event.set("oldValue", Value::Str(old));
                    }
                    pending.push(PendingAction {
                        element: reg.element,
                        code,
                        event,
                    });
                }
            }
        }
        pending
    }

    /// A window-level event fired by the host
    pub fn window_event(&self, event_type: &str) -> Vec<PendingAction> {
        if !self.window_listeners.contains(event_type) {
            return Vec::new();
        }
        self.collect_declaring(event_type)
    }

    /// A document-level event fired by the host
    pub fn document_event(&self, event_type: &str) -> Vec<PendingAction> {
        if !self.document_listeners.contains(event_type) {
            return Vec::new();
        }
        self.collect_declaring(event_type)
    }

    fn collect_declaring(&self, event_type: &str) -> Vec<PendingAction> {
        let Some(root) = self.scene_root() else {
            return Vec::new();
        };
        let attr = action_attr(event_type);
        let declaring = self.doc.borrow().tree().query_by_attribute(root, &attr);
        declaring
            .into_iter()
            .filter_map(|element| {
                let code = self.action_code(element, &attr)?;
                Some(PendingAction {
                    element,
                    code,
                    event: EventPayload::native(event_type, element),
                })
            })
            .collect()
    }

    /// Collision pairs reported by the host physics engine for one
    /// phase. Both sides of each pair fire their own bound action.
    pub fn collisions(&self, phase: CollisionPhase, pairs: &[CollisionPair]) -> Vec<PendingAction> {
        if !self.physics_armed {
            return Vec::new();
        }
        if !self
            .settings
            .borrow()
            .physics_events
            .iter()
            .any(|t| t == phase.token())
        {
            return Vec::new();
        }
        let attr = action_attr(phase.token());
        let mut pending = Vec::new();
        for pair in pairs {
            for (target, other) in [
                (pair.element_a, pair.element_b),
                (pair.element_b, pair.element_a),
            ] {
                if let Some(code) = self.action_code(target, &attr) {
                    let doc = self.doc.borrow();
                    let other_id = doc.tree().element_id(other);
                    let event = collision_payload(phase, target, other, other_id);
                    drop(doc);
                    pending.push(PendingAction {
                        element: target,
                        code,
                        event,
                    });
                }
            }
        }
        pending
    }

    fn registration_for(
        &self,
        observer_id: u64,
        kind: ObserverKind,
        target: NodeId,
    ) -> Option<Registration> {
        self.registrations
            .iter()
            .find(|((_, k), reg)| *k == kind && reg.observer_id == observer_id && reg.target == target)
            .map(|(_, reg)| *reg)
    }

    fn scene_root(&self) -> Option<NodeId> {
        let doc = self.doc.borrow();
        self.active_scene
            .as_deref()
            .and_then(|scene| doc.scene_root(scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actio_dom::Document;

    fn settings() -> Rc<RefCell<Settings>> {
        Rc::new(RefCell::new(Settings::default()))
    }

    fn doc_with_scene() -> (DocumentHandle, NodeId) {
        let mut document = Document::new("doc-1", "https://example.com/");
        let root = document.tree_mut().create_element("div");
        document.add_scene("scene-1", root);
        document.set_current_scene(Some("scene-1"));
        (DocumentHandle::new(document), root)
    }

    #[test]
    fn test_idempotent_registration() {
        let (doc, root) = doc_with_scene();
        {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element_with_id("div", "box");
            d.tree_mut().set_attr(el, "data-resize-action", "noted = true");
            d.tree_mut().append_child(root, el);
        }
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");
        assert_eq!(registry.registration_count(), 1);

        registry.enter_scene("scene-1");
        assert_eq!(registry.registration_count(), 1);
        let reg = registry.registration("box", ObserverKind::Resize).unwrap();
        assert_eq!(
            registry.registration("box", ObserverKind::Resize).unwrap().observer_id,
            reg.observer_id
        );
    }

    #[test]
    fn test_resize_entry_fires_declaring_element() {
        let (doc, root) = doc_with_scene();
        let el = {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element_with_id("div", "box");
            d.tree_mut().set_attr(el, "data-resize-action", "w = event.width");
            d.tree_mut().append_child(root, el);
            el
        };
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");

        let mut sizes = HashMap::new();
        sizes.insert(el, (320.0, 200.0));
        let pending = registry.process_sizes(&sizes);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].element, el);
        assert_eq!(pending[0].event.get("width"), Some(&Value::Float(320.0)));
    }

    #[test]
    fn test_unload_completeness() {
        let (doc, root) = doc_with_scene();
        let el = {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element_with_id("div", "box");
            d.tree_mut().set_attr(el, "data-resize-action", "x = 1");
            d.tree_mut().set_attr(el, "data-mutation-action", "y = 1");
            d.tree_mut().set_attr(el, "data-scroll-action", "z = 1");
            d.tree_mut().append_child(root, el);
            el
        };
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");
        assert!(registry.is_window_listening("scroll"));
        assert!(registry.registration("box", ObserverKind::Mutation).is_some());

        registry.exit_scene();

        // No further callbacks for the unloaded scene's elements
        let mut sizes = HashMap::new();
        sizes.insert(el, (10.0, 10.0));
        assert!(registry.process_sizes(&sizes).is_empty());
        assert!(registry.notify_attribute_change(el, "class", None).is_empty());
        assert!(registry.window_event("scroll").is_empty());
        assert!(registry.registration("box", ObserverKind::Mutation).is_none());
        // Resize handle survives for reuse, but observes nothing
        assert!(registry.registration("box", ObserverKind::Resize).is_some());
    }

    #[test]
    fn test_frame_tick_in_document_order() {
        let (doc, root) = doc_with_scene();
        let (first, second) = {
            let mut d = doc.borrow_mut();
            let first = d.tree_mut().create_element("div");
            let second = d.tree_mut().create_element("div");
            d.tree_mut().set_attr(first, "data-frame-action", "a()");
            d.tree_mut().set_attr(second, "data-frame-action", "b()");
            d.tree_mut().append_child(root, first);
            d.tree_mut().append_child(root, second);
            (first, second)
        };
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");
        assert!(registry.frames_running());

        let pending = registry.tick();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].element, first);
        assert_eq!(pending[1].element, second);
        assert_eq!(pending[0].event.get("sceneFrames"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_scene_frame_counter_resets_on_unload() {
        let (doc, root) = doc_with_scene();
        {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element("div");
            d.tree_mut().set_attr(el, "data-frame-action", "t()");
            d.tree_mut().append_child(root, el);
        }
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");
        registry.tick();
        registry.tick();
        registry.exit_scene();
        registry.enter_scene("scene-1");

        let pending = registry.tick();
        assert_eq!(pending[0].event.get("sceneFrames"), Some(&Value::Int(1)));
        assert_eq!(pending[0].event.get("documentFrames"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_collisions_require_arming() {
        let (doc, root) = doc_with_scene();
        let (a, b) = {
            let mut d = doc.borrow_mut();
            let a = d.tree_mut().create_element_with_id("div", "ball");
            let b = d.tree_mut().create_element_with_id("div", "wall");
            d.tree_mut().set_attr(a, "data-collision-start-action", "hit = true");
            d.tree_mut().append_child(root, a);
            d.tree_mut().append_child(root, b);
            (a, b)
        };
        let pair = CollisionPair {
            element_a: a,
            element_b: b,
        };

        // No physics engine property: not armed
        let mut registry = ResourceRegistry::new(doc.clone(), settings());
        registry.enter_scene("scene-1");
        assert!(!registry.physics_armed());
        assert!(registry.collisions(CollisionPhase::Start, &[pair]).is_empty());
        registry.exit_scene();

        doc.borrow_mut()
            .set_element_property(root, "physics-engine", Value::Bool(true));
        registry.enter_scene("scene-1");
        assert!(registry.physics_armed());
        let pending = registry.collisions(CollisionPhase::Start, &[pair]);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].element, a);
        assert_eq!(
            pending[0].event.get("otherElementId"),
            Some(&Value::Str("wall".to_string()))
        );
    }

    #[test]
    fn test_intersection_root_config_reaches_observer() {
        let (doc, root) = doc_with_scene();
        {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element_with_id("div", "hero");
            d.tree_mut().set_attr(el, "data-intersection-action", "seen = true");
            d.tree_mut().set_attr(el, "data-intersection-root", "viewport-pane");
            d.tree_mut().set_attr(el, "data-intersection-margin", "10px");
            d.tree_mut().set_attr(el, "data-intersection-threshold", "25% 0.75");
            d.tree_mut().append_child(root, el);
        }
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");

        let reg = registry
            .registration("hero", ObserverKind::Intersection)
            .unwrap();
        let options = registry
            .intersection
            .get(reg.observer_id)
            .unwrap()
            .options()
            .clone();
        assert_eq!(options.root.as_deref(), Some("viewport-pane"));
        assert_eq!(options.root_margin, "10px");
        assert_eq!(options.threshold, vec![0.25, 0.75]);
    }

    #[test]
    fn test_target_selector_overrides_element() {
        let (doc, root) = doc_with_scene();
        let (el, watched) = {
            let mut d = doc.borrow_mut();
            let el = d.tree_mut().create_element_with_id("div", "panel");
            let watched = d.tree_mut().create_element_with_id("div", "content");
            d.tree_mut().set_attr(el, "data-resize-action", "resized = true");
            d.tree_mut().set_attr(el, "data-resize-target", "content");
            d.tree_mut().append_child(root, el);
            d.tree_mut().append_child(root, watched);
            (el, watched)
        };
        let mut registry = ResourceRegistry::new(doc, settings());
        registry.enter_scene("scene-1");

        let mut sizes = HashMap::new();
        sizes.insert(watched, (640.0, 480.0));
        let pending = registry.process_sizes(&sizes);
        assert_eq!(pending.len(), 1);
        // Action fires on the declaring element, not the watched one
        assert_eq!(pending[0].element, el);
    }
}
