//! Document context - the per-document host surface
//!
//! One instance per mounted interactive document. Owns the element tree,
//! the scene table, the custom data store (durable per-document user
//! variables), the user function table and per-element host properties.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::{ComponentInstance, DomTree, EventPayload, NodeId, Value};

/// A user-defined function callable from action snippets.
///
/// Always invoked with the document handle, the element the triggering
/// action ran against, and the triggering event payload.
pub type UserFunction = Rc<dyn Fn(&DocumentHandle, Option<NodeId>, &EventPayload) -> Value>;

/// Per-document host context
pub struct Document {
    id: String,
    url: String,
    tree: DomTree,
    scenes: HashMap<String, NodeId>,
    current_scene: Option<String>,
    custom_data: HashMap<String, Value>,
    functions: HashMap<String, UserFunction>,
    components: HashMap<NodeId, ComponentInstance>,
    element_properties: HashMap<(NodeId, String), Value>,
    next_component_id: u64,
}

impl Document {
    pub fn new(id: &str, url: &str) -> Self {
        tracing::debug!(document = id, "creating document context");
        Self {
            id: id.to_string(),
            url: url.to_string(),
            tree: DomTree::new(),
            scenes: HashMap::new(),
            current_scene: None,
            custom_data: HashMap::new(),
            functions: HashMap::new(),
            components: HashMap::new(),
            element_properties: HashMap::new(),
            next_component_id: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // --- scenes ---

    /// Register a scene root under a scene identifier
    pub fn add_scene(&mut self, scene_id: &str, root: NodeId) {
        self.scenes.insert(scene_id.to_string(), root);
    }

    pub fn scene_root(&self, scene_id: &str) -> Option<NodeId> {
        self.scenes.get(scene_id).copied()
    }

    pub fn set_current_scene(&mut self, scene_id: Option<&str>) {
        self.current_scene = scene_id.map(|s| s.to_string());
    }

    pub fn current_scene_id(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    /// Root element of the currently active scene
    pub fn current_scene_root(&self) -> Option<NodeId> {
        self.current_scene
            .as_deref()
            .and_then(|id| self.scene_root(id))
    }

    // --- custom data store ---

    pub fn custom_data(&self, key: &str) -> Value {
        self.custom_data.get(key).cloned().unwrap_or_default()
    }

    pub fn has_custom_data(&self, key: &str) -> bool {
        self.custom_data.contains_key(key)
    }

    pub fn set_custom_data(&mut self, key: &str, value: Value) {
        self.custom_data.insert(key.to_string(), value);
    }

    pub fn custom_data_keys(&self) -> Vec<String> {
        self.custom_data.keys().cloned().collect()
    }

    // --- user function table ---

    pub fn set_function(&mut self, name: &str, func: UserFunction) {
        self.functions.insert(name.to_string(), func);
    }

    pub fn function(&self, name: &str) -> Option<UserFunction> {
        self.functions.get(name).cloned()
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    // --- components ---

    /// Mount a component instance on an element, returning the instance
    pub fn register_component(&mut self, element: NodeId, name: &str) -> ComponentInstance {
        let instance = ComponentInstance::new(self.next_component_id, name);
        self.next_component_id += 1;
        self.components.insert(element, instance.clone());
        instance
    }

    /// Component instance mounted directly on an element
    pub fn component_at(&self, element: NodeId) -> Option<&ComponentInstance> {
        self.components.get(&element)
    }

    /// Nearest enclosing component of an element (inclusive ancestor walk)
    pub fn component_for_element(&self, element: NodeId) -> Option<ComponentInstance> {
        self.tree
            .ancestors_inclusive(element)
            .into_iter()
            .find_map(|node| self.components.get(&node).cloned())
    }

    // --- element properties (host-managed, e.g. "physics-engine") ---

    pub fn element_property(&self, element: NodeId, key: &str) -> Option<&Value> {
        self.element_properties.get(&(element, key.to_string()))
    }

    pub fn set_element_property(&mut self, element: NodeId, key: &str, value: Value) {
        self.element_properties.insert((element, key.to_string()), value);
    }

    /// Public members merged into non-strict execution scopes
    pub fn scope_surface(&self) -> Vec<(String, Value)> {
        vec![
            ("documentId".to_string(), Value::from(self.id.as_str())),
            ("documentUrl".to_string(), Value::from(self.url.as_str())),
            (
                "sceneId".to_string(),
                self.current_scene
                    .as_deref()
                    .map(Value::from)
                    .unwrap_or_default(),
            ),
        ]
    }
}

/// Shared handle to a document context.
///
/// The whole subsystem is single-threaded and event-driven, so plain
/// `Rc<RefCell>` sharing is sufficient (no concurrent mutation exists).
#[derive(Clone)]
pub struct DocumentHandle(Rc<RefCell<Document>>);

impl DocumentHandle {
    pub fn new(document: Document) -> Self {
        Self(Rc::new(RefCell::new(document)))
    }

    pub fn borrow(&self) -> Ref<'_, Document> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Document> {
        self.0.borrow_mut()
    }
}
