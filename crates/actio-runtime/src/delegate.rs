//! Event delegation
//!
//! One conceptual listener per recognized native event type, resolved
//! against markup by nearest-ancestor attribute lookup instead of
//! per-element handlers.

use crate::attributes::action_attr;
use crate::registry::PendingAction;
use actio_dom::{DocumentHandle, EventPayload, NodeId};
use actio_script::Settings;
use std::collections::HashMap;

/// Root-level native event delegator
pub struct EventDelegator {
    doc: DocumentHandle,
    /// Listened event type -> passive flag
    listeners: HashMap<String, bool>,
}

impl EventDelegator {
    /// Install one listener per recognized native event type. Types in
    /// the non-passive subset (pointer-drag, keyboard, submit,
    /// contextmenu) are registered cancelable.
    pub fn install(doc: DocumentHandle, settings: &Settings) -> Self {
        let mut listeners = HashMap::new();
        for event_type in settings.dom_event_types() {
            let passive = !settings.is_non_passive(&event_type);
            listeners.insert(event_type, passive);
        }
        tracing::debug!(listeners = listeners.len(), "event delegation installed");
        Self { doc, listeners }
    }

    pub fn is_listening(&self, event_type: &str) -> bool {
        self.listeners.contains_key(event_type)
    }

    pub fn is_passive(&self, event_type: &str) -> Option<bool> {
        self.listeners.get(event_type).copied()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Nearest inclusive ancestor of `target` carrying a non-empty
    /// action attribute for this event type.
    pub fn resolve(&self, event_type: &str, target: NodeId) -> Option<(NodeId, String)> {
        let attr = action_attr(event_type);
        let doc = self.doc.borrow();
        let tree = doc.tree();
        for node in tree.ancestors_inclusive(target) {
            if let Some(code) = tree.attr(node, &attr) {
                if !code.is_empty() {
                    return Some((node, code.to_string()));
                }
            }
        }
        None
    }

    /// Map a native event to the action it should fire, if any. The
    /// payload passes through unchanged aside from retargeting to the
    /// resolved element.
    pub fn dispatch(&self, event: EventPayload) -> Option<PendingAction> {
        if !self.is_listening(&event.event_type) {
            return None;
        }
        let target = event.target?;
        let (element, code) = self.resolve(&event.event_type, target)?;
        let mut event = event;
        event.target = Some(element);
        Some(PendingAction {
            element,
            code,
            event,
        })
    }
}
