//! Configuration surface
//!
//! One table of defaults for the whole subsystem: every knob is
//! individually settable, through the public fields or the keyed
//! [`Settings::get`]/[`Settings::set`] pair, or replaced wholesale.

use actio_dom::Value;
use serde::{Deserialize, Serialize};

use crate::scope::{ScopeMode, RESERVED_BINDINGS};

/// Subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Report snippet failures on the diagnostics channel even outside preview
    pub debug: bool,
    /// Run snippets with no implicit context at all
    pub strict_mode: bool,
    /// Eager (flat merged record) vs dynamic (resolve-on-read) scoping
    pub scope_mode: ScopeMode,

    // Context layers merged into non-strict scopes
    pub context_custom_data: bool,
    pub context_document: bool,
    pub context_component: bool,
    pub context_functions: bool,

    // Recognized native event types, grouped as the delegator installs them
    pub mouse_events: Vec<String>,
    pub touch_events: Vec<String>,
    pub keyboard_events: Vec<String>,
    pub form_events: Vec<String>,

    // Window- and document-level event types handled by the registry
    pub window_events: Vec<String>,
    pub document_events: Vec<String>,

    /// Physics collision phases (attribute tokens); empty disables collisions
    pub physics_events: Vec<String>,

    /// Native event types that must stay cancelable (registered non-passive)
    pub non_passive_events: Vec<String>,

    /// Names excluded from dynamic scope claiming (the positional bindings)
    pub reserved_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            strict_mode: false,
            scope_mode: ScopeMode::Dynamic,

            context_custom_data: true,
            context_document: true,
            context_component: true,
            context_functions: true,

            mouse_events: strings(&[
                "mousedown",
                "mouseup",
                "click",
                "dblclick",
                "mouseover",
                "mousewheel",
                "mouseout",
                "contextmenu",
                "mousemove",
            ]),
            touch_events: strings(&["touchstart", "touchmove", "touchend", "touchcancel"]),
            keyboard_events: strings(&["keydown", "keypress", "keyup"]),
            form_events: strings(&["focus", "blur", "change", "submit"]),

            window_events: strings(&["scroll", "hashchange", "online", "offline"]),
            document_events: strings(&["visibilitychange", "fullscreenchange"]),

            physics_events: strings(&["collision-start", "collision-active", "collision-end"]),

            non_passive_events: strings(&[
                "mousedown",
                "mousemove",
                "touchstart",
                "touchmove",
                "keydown",
                "keypress",
                "keyup",
                "submit",
                "contextmenu",
            ]),

            reserved_names: RESERVED_BINDINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// All native event types the delegator listens for
    pub fn dom_event_types(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(self.mouse_events.iter().cloned());
        out.extend(self.touch_events.iter().cloned());
        out.extend(self.keyboard_events.iter().cloned());
        out.extend(self.form_events.iter().cloned());
        out
    }

    pub fn is_non_passive(&self, event_type: &str) -> bool {
        self.non_passive_events.iter().any(|e| e == event_type)
    }

    /// Read one default by key. Keys are the field names; unknown keys
    /// read as `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        Some(match key {
            "debug" => Value::Bool(self.debug),
            "strict_mode" => Value::Bool(self.strict_mode),
            "scope_mode" => Value::Str(
                match self.scope_mode {
                    ScopeMode::Eager => "eager",
                    ScopeMode::Dynamic => "dynamic",
                }
                .to_string(),
            ),
            "context_custom_data" => Value::Bool(self.context_custom_data),
            "context_document" => Value::Bool(self.context_document),
            "context_component" => Value::Bool(self.context_component),
            "context_functions" => Value::Bool(self.context_functions),
            "mouse_events" => list_value(&self.mouse_events),
            "touch_events" => list_value(&self.touch_events),
            "keyboard_events" => list_value(&self.keyboard_events),
            "form_events" => list_value(&self.form_events),
            "window_events" => list_value(&self.window_events),
            "document_events" => list_value(&self.document_events),
            "physics_events" => list_value(&self.physics_events),
            "non_passive_events" => list_value(&self.non_passive_events),
            "reserved_names" => list_value(&self.reserved_names),
            _ => return None,
        })
    }

    /// Set one default by key. Returns false for an unknown key or a
    /// value of the wrong shape, leaving the table untouched.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        match key {
            "debug" => put_bool(&mut self.debug, value),
            "strict_mode" => put_bool(&mut self.strict_mode, value),
            "scope_mode" => match value {
                Value::Str(s) if s == "eager" => {
                    self.scope_mode = ScopeMode::Eager;
                    true
                }
                Value::Str(s) if s == "dynamic" => {
                    self.scope_mode = ScopeMode::Dynamic;
                    true
                }
                _ => false,
            },
            "context_custom_data" => put_bool(&mut self.context_custom_data, value),
            "context_document" => put_bool(&mut self.context_document, value),
            "context_component" => put_bool(&mut self.context_component, value),
            "context_functions" => put_bool(&mut self.context_functions, value),
            "mouse_events" => put_list(&mut self.mouse_events, value),
            "touch_events" => put_list(&mut self.touch_events, value),
            "keyboard_events" => put_list(&mut self.keyboard_events, value),
            "form_events" => put_list(&mut self.form_events, value),
            "window_events" => put_list(&mut self.window_events, value),
            "document_events" => put_list(&mut self.document_events, value),
            "physics_events" => put_list(&mut self.physics_events, value),
            "non_passive_events" => put_list(&mut self.non_passive_events, value),
            "reserved_names" => put_list(&mut self.reserved_names, value),
            _ => false,
        }
    }

    /// Replace the whole configuration at once
    pub fn replace(&mut self, other: Settings) {
        *self = other;
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn list_value(items: &[String]) -> Value {
    Value::List(items.iter().map(|s| Value::Str(s.clone())).collect())
}

fn put_bool(slot: &mut bool, value: Value) -> bool {
    if let Value::Bool(b) = value {
        *slot = b;
        true
    } else {
        false
    }
}

fn put_list(slot: &mut Vec<String>, value: Value) -> bool {
    let Value::List(items) = value else {
        return false;
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Str(s) => out.push(s),
            _ => return false,
        }
    }
    *slot = out;
    true
}
