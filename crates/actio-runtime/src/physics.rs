//! Collision events
//!
//! Maps host physics collision pairs onto per-phase action attributes.
//! Elements are identified by their markup id; pairs without resolvable
//! ids are dropped.

use actio_dom::{EventPayload, NodeId, Value};

/// Collision lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPhase {
    Start,
    Active,
    End,
}

impl CollisionPhase {
    /// Attribute token for this phase
    pub fn token(&self) -> &'static str {
        match self {
            CollisionPhase::Start => "collision-start",
            CollisionPhase::Active => "collision-active",
            CollisionPhase::End => "collision-end",
        }
    }

    /// Event type name carried on the payload
    pub fn event_name(&self) -> &'static str {
        match self {
            CollisionPhase::Start => "collisionStart",
            CollisionPhase::Active => "collisionActive",
            CollisionPhase::End => "collisionEnd",
        }
    }
}

/// One colliding pair, as reported by the host physics engine
#[derive(Debug, Clone, Copy)]
pub struct CollisionPair {
    pub element_a: NodeId,
    pub element_b: NodeId,
}

/// Build the payload for one side of a collision. `other_id` is the
/// markup id of the opposing element, when it has one.
pub fn collision_payload(
    phase: CollisionPhase,
    target: NodeId,
    other: NodeId,
    other_id: Option<&str>,
) -> EventPayload {
    let mut event = EventPayload::native(phase.event_name(), target);
    event.set("otherElement", Value::Int(other.index() as i64));
    if let Some(id) = other_id {
        event.set("otherElementId", Value::Str(id.to_string()));
    }
    event
}
