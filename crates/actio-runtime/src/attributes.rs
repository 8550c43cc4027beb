//! Attribute vocabulary
//!
//! Fixed naming scheme consumed by the delegator, registry and lifecycle
//! dispatcher: `data-` + event token + `-action`, auxiliary config
//! attributes per observer kind, and sanitized name-specific variants.

/// Attribute prefix for everything this subsystem reads
pub const PREFIX: &str = "data-";

// Lifecycle tokens
pub const SCENE_LOAD: &str = "scene-load";
pub const SCENE_UNLOAD: &str = "scene-unload";
pub const SCENE_PREPARE: &str = "scene-prepare";
pub const LAYOUT_REQUEST: &str = "layout-request";
pub const COMPONENT_LOAD: &str = "component-load";
pub const COMPONENT_UNLOAD: &str = "component-unload";
pub const BEHAVIOR: &str = "behavior";
pub const TIMELINE: &str = "timeline";

// Observer kind tokens
pub const RESIZE: &str = "resize";
pub const INTERSECTION: &str = "intersection";
pub const MUTATION: &str = "mutation";
pub const FRAME: &str = "frame";

/// Action attribute for an event token: `data-<token>-action`
pub fn action_attr(token: &str) -> String {
    format!("{}{}-action", PREFIX, token)
}

/// Name-specific action attribute: `data-<token>-<sanitized-name>-action`
pub fn named_action_attr(token: &str, name: &str) -> Option<String> {
    let sanitized = sanitize_name(name);
    if sanitized.is_empty() {
        return None;
    }
    Some(format!("{}{}-{}-action", PREFIX, token, sanitized))
}

/// Auxiliary configuration attribute: `data-<token>-<key>`
pub fn config_attr(token: &str, key: &str) -> String {
    format!("{}{}-{}", PREFIX, token, key)
}

/// Sanitize a user-facing name for use in an attribute: non-alphanumeric
/// characters stripped, word boundaries (whitespace or a lower-to-upper
/// camel-case edge) collapsed to a single dash, lowercased.
pub fn sanitize_name(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower {
                spaced.push(' ');
            }
            spaced.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        } else {
            if c.is_whitespace() {
                spaced.push(' ');
            }
            prev_lower = false;
        }
    }
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Parse a boolean config attribute value (best effort, documented default)
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some("") | Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(_) => default,
    }
}
