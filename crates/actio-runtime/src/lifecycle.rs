//! Lifecycle dispatch
//!
//! Fans host lifecycle notifications out to attribute-bound actions
//! and to the resource registry's attach/detach transitions.

use crate::attributes::{self, action_attr, named_action_attr};
use crate::delegate::EventDelegator;
use crate::ActionRuntime;
use actio_dom::{EventPayload, NodeId, Value};

/// User function invoked at document ready, when defined
pub const SUBSYSTEM_FUNCTION: &str = "ActionEvents";

/// Behavior names starting with this marker belong to an external
/// routing mechanism and are ignored here.
pub const ESCAPE_MARKER: char = '#';

/// Host lifecycle notification
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    DocumentReady,
    SceneLoad { scene_id: String },
    ScenePrepare { scene_id: String },
    LayoutRequest { scene_id: String },
    SceneUnload { scene_id: String },
    ComponentLoad { element: NodeId, name: String },
    ComponentUnload { element: NodeId, name: String },
    Behavior { name: String },
    TimelineComplete { name: String },
}

/// Fuzzy code-vs-name test for behavior signals. Deliberately loose:
/// a semicolon, equals sign or parenthesis marks the signal as
/// executable text.
pub fn looks_like_code(name: &str) -> bool {
    name.contains(|c| matches!(c, ';' | '=' | '(' | ')'))
}

impl ActionRuntime {
    /// Route one host lifecycle notification.
    pub fn dispatch_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::DocumentReady => self.document_ready(),
            LifecycleEvent::SceneLoad { scene_id } => {
                self.fire_scene_attr(&scene_id, attributes::SCENE_LOAD, "sceneLoad");
                self.registry_mut().enter_scene(&scene_id);
            }
            LifecycleEvent::ScenePrepare { scene_id } => {
                self.fire_scene_attr(&scene_id, attributes::SCENE_PREPARE, "scenePrepare");
            }
            LifecycleEvent::LayoutRequest { scene_id } => {
                self.fire_scene_attr(&scene_id, attributes::LAYOUT_REQUEST, "layoutRequest");
            }
            LifecycleEvent::SceneUnload { scene_id } => {
                self.fire_scene_attr(&scene_id, attributes::SCENE_UNLOAD, "sceneUnload");
                self.registry_mut().exit_scene();
            }
            LifecycleEvent::ComponentLoad { element, name } => {
                self.component_transition(element, &name, attributes::COMPONENT_LOAD, "componentLoad");
            }
            LifecycleEvent::ComponentUnload { element, name } => {
                self.component_transition(
                    element,
                    &name,
                    attributes::COMPONENT_UNLOAD,
                    "componentUnload",
                );
            }
            LifecycleEvent::Behavior { name } => self.behavior(&name),
            LifecycleEvent::TimelineComplete { name } => {
                let event = EventPayload::lifecycle("timelineComplete")
                    .with_field("name", Value::Str(name.clone()));
                self.trigger_actions_by_attribute(&action_attr(attributes::TIMELINE), None, &event);
                if let Some(attr) = named_action_attr(attributes::TIMELINE, &name) {
                    self.trigger_actions_by_attribute(&attr, None, &event);
                }
            }
        }
    }

    fn document_ready(&mut self) {
        if self.is_ready() {
            return;
        }
        let delegator = {
            let settings = self.settings();
            let settings = settings.borrow();
            EventDelegator::install(self.document().clone(), &settings)
        };
        self.set_delegator(delegator);
        self.set_ready();
        tracing::info!(
            document = %self.document().borrow().id(),
            version = crate::VERSION,
            "action events ready"
        );

        let hook = self.document().borrow().function(SUBSYSTEM_FUNCTION);
        if let Some(hook) = hook {
            let event = EventPayload::lifecycle("documentReady");
            hook(self.document(), None, &event);
        }
    }

    fn fire_scene_attr(&self, scene_id: &str, token: &str, event_type: &str) {
        let root = self.document().borrow().scene_root(scene_id);
        let Some(root) = root else { return };
        let event = EventPayload::lifecycle(event_type)
            .with_field("sceneId", Value::Str(scene_id.to_string()));
        self.trigger_actions_by_attribute(&action_attr(token), Some(root), &event);
    }

    /// Component mount/unmount: a user function sharing the component's
    /// name is invoked with a marker flag, then generic and
    /// name-specific attributes fire within the component's subtree.
    fn component_transition(&self, element: NodeId, name: &str, token: &str, event_type: &str) {
        let event = EventPayload::lifecycle(event_type)
            .with_field("name", Value::Str(name.to_string()))
            .with_field("lifecycleDriven", Value::Bool(true));

        let func = self.document().borrow().function(name);
        if let Some(func) = func {
            func(self.document(), Some(element), &event);
        }

        self.trigger_actions_by_attribute(&action_attr(token), Some(element), &event);
        if let Some(attr) = named_action_attr(token, name) {
            self.trigger_actions_by_attribute(&attr, Some(element), &event);
        }
    }

    /// Named signal: escape-marked signals are ignored, code-looking
    /// signals execute directly, plain names fire generic and
    /// name-specific behavior attributes.
    fn behavior(&self, name: &str) {
        if name.starts_with(ESCAPE_MARKER) {
            return;
        }
        let event =
            EventPayload::lifecycle("behavior").with_field("name", Value::Str(name.to_string()));
        if looks_like_code(name) {
            self.trigger_action(
                name,
                actio_script::TriggerOptions {
                    event: Some(event),
                    ..Default::default()
                },
            );
            return;
        }
        self.trigger_actions_by_attribute(&action_attr(attributes::BEHAVIOR), None, &event);
        if let Some(attr) = named_action_attr(attributes::BEHAVIOR, name) {
            self.trigger_actions_by_attribute(&attr, None, &event);
        }
    }
}
