//! Component instances
//!
//! A named, nested sub-unit inside a scene. Elements resolve to their
//! enclosing component by walking ancestors (see `Document::component_for_element`).

use crate::Value;

/// A named component instance mounted in a scene
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    id: u64,
    name: String,
}

impl ComponentInstance {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public members merged into non-strict execution scopes
    pub fn scope_surface(&self) -> Vec<(String, Value)> {
        vec![
            ("componentId".to_string(), Value::Int(self.id as i64)),
            ("componentName".to_string(), Value::from(self.name.as_str())),
        ]
    }
}
