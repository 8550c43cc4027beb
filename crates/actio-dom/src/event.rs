//! Event payloads
//!
//! Normalized record handed to every action invocation. Native input,
//! observer callbacks, frame ticks, collisions and lifecycle transitions
//! all flatten into the same shape.

use std::collections::HashMap;

use crate::{NodeId, Value};

/// Payload carried into one action invocation
#[derive(Debug, Clone, Default)]
pub struct EventPayload {
    /// Event type token (e.g. "click", "resize", "collisionStart")
    pub event_type: String,
    /// Element the underlying event targeted, if any
    pub target: Option<NodeId>,
    /// Arbitrary event fields, readable from snippets via `evt`
    pub data: HashMap<String, Value>,
}

impl EventPayload {
    /// Empty payload (the default for direct trigger calls)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Payload for a native input event
    pub fn native(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: Some(target),
            data: HashMap::new(),
        }
    }

    /// Payload for one animation-loop tick
    pub fn frame(scene_frames: u64, document_frames: u64) -> Self {
        let mut data = HashMap::new();
        data.insert("sceneFrames".to_string(), Value::Int(scene_frames as i64));
        data.insert("documentFrames".to_string(), Value::Int(document_frames as i64));
        Self {
            event_type: "frame".to_string(),
            target: None,
            data,
        }
    }

    /// Payload for a lifecycle transition
    pub fn lifecycle(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            target: None,
            data: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_payload_counters() {
        let evt = EventPayload::frame(3, 40);
        assert_eq!(evt.event_type, "frame");
        assert_eq!(evt.get("sceneFrames"), Some(&Value::Int(3)));
        assert_eq!(evt.get("documentFrames"), Some(&Value::Int(40)));
    }

    #[test]
    fn test_with_field() {
        let evt = EventPayload::lifecycle("sceneLoad").with_field("scene", Value::from("intro"));
        assert_eq!(evt.get("scene"), Some(&Value::from("intro")));
    }
}
