//! Name resolver
//!
//! Computes, per invocation, the ordered scope an action snippet executes
//! against. Resolution is an explicit ordered lookup chain (user functions
//! -> document/component merge -> custom data fallback) rather than any
//! engine-side dynamic-property trap, so the rules are testable on their
//! own and identical across evaluator implementations.

use std::collections::HashSet;

use actio_dom::{ComponentInstance, DocumentHandle, EventPayload, NodeId, Value};

use serde::{Deserialize, Serialize};

/// Positional binding names, always present and never shadowable.
///
/// Short forms `ctx`/`doc`/`comp`/`elem`/`evt` plus the long-form repeats
/// kept for snippets that prefer spelled-out names.
pub const RESERVED_BINDINGS: [&str; 9] = [
    "ctx", "doc", "comp", "elem", "evt", "document", "component", "element", "event",
];

/// Resolution strategy for non-strict execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// Flat merged record built up front; lookups are plain reads
    Eager,
    /// Resolve-on-read with custom-data fallback and durable implicit writes
    #[default]
    Dynamic,
}

/// One claimed name in a dynamic scope.
///
/// Claiming is how "any plausible identifier" becomes readable and
/// writable: every identifier the snippet mentions that no other layer
/// owns is seeded from the custom data store (unit when absent there).
#[derive(Debug, Clone)]
pub struct Claim {
    pub name: String,
    pub initial: Value,
    pub from_custom_data: bool,
}

/// Per-invocation scope, output of [`resolve_scope`].
///
/// Lives exactly as long as one invocation; nothing in it is retained.
pub struct ResolvedScope {
    pub strict: bool,
    pub mode: ScopeMode,
    /// User functions callable from this invocation
    pub functions: bool,
    pub document: DocumentHandle,
    pub component: Option<ComponentInstance>,
    pub element: Option<NodeId>,
    pub event: EventPayload,
    /// Merged document/component surface (writes are transient)
    pub base: Vec<(String, Value)>,
    /// Dynamic-mode fallback layer (writes persist to custom data)
    pub claims: Vec<Claim>,
}

/// Inputs controlling scope construction
pub struct ScopeOptions<'a> {
    pub mode: ScopeMode,
    pub strict: bool,
    pub reserved: &'a [String],
    pub include_custom_data: bool,
    pub include_document: bool,
    pub include_component: bool,
    pub include_functions: bool,
}

/// Build the scope for one snippet execution.
///
/// Cannot fail: names that resolve nowhere simply read as unit, matching
/// ordinary variable semantics.
pub fn resolve_scope(
    document: &DocumentHandle,
    component: Option<ComponentInstance>,
    element: Option<NodeId>,
    event: EventPayload,
    code: &str,
    opts: &ScopeOptions<'_>,
) -> ResolvedScope {
    if opts.strict {
        return ResolvedScope {
            strict: true,
            mode: opts.mode,
            functions: false,
            document: document.clone(),
            component,
            element,
            event,
            base: Vec::new(),
            claims: Vec::new(),
        };
    }

    let doc = document.borrow();
    // With functions out of the context, same-named members shadow them.
    let function_names: HashSet<String> = if opts.include_functions {
        doc.function_names().into_iter().collect()
    } else {
        HashSet::new()
    };

    let excluded = |name: &str| {
        opts.reserved.iter().any(|r| r == name) || function_names.contains(name)
    };

    let mut base: Vec<(String, Value)> = Vec::new();
    let mut merge = |base: &mut Vec<(String, Value)>, name: String, value: Value| {
        if excluded(&name) {
            return;
        }
        if let Some(slot) = base.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            base.push((name, value));
        }
    };

    // Eager mode folds the custom data store into the flat record up
    // front; dynamic mode reaches it through claims instead.
    if opts.mode == ScopeMode::Eager && opts.include_custom_data {
        for key in doc.custom_data_keys() {
            let value = doc.custom_data(&key);
            merge(&mut base, key, value);
        }
    }
    if opts.include_document {
        for (name, value) in doc.scope_surface() {
            merge(&mut base, name, value);
        }
    }
    // Component members override document members on collision.
    if opts.include_component {
        if let Some(instance) = &component {
            for (name, value) in instance.scope_surface() {
                merge(&mut base, name, value);
            }
        }
    }

    let mut claims = Vec::new();
    if opts.mode == ScopeMode::Dynamic {
        for name in scan_identifiers(code) {
            if excluded(&name) || base.iter().any(|(n, _)| *n == name) {
                continue;
            }
            if claims.iter().any(|c: &Claim| c.name == name) {
                continue;
            }
            let from_custom_data = doc.has_custom_data(&name);
            let initial = doc.custom_data(&name);
            claims.push(Claim {
                name,
                initial,
                from_custom_data,
            });
        }
    }
    drop(doc);

    ResolvedScope {
        strict: false,
        mode: opts.mode,
        functions: opts.include_functions,
        document: document.clone(),
        component,
        element,
        event,
        base,
        claims,
    }
}

/// Language keywords never claimed as variables
const KEYWORDS: [&str; 30] = [
    "let", "const", "if", "else", "switch", "while", "do", "loop", "for", "in", "until",
    "break", "continue", "return", "throw", "try", "catch", "fn", "private", "import",
    "export", "as", "global", "true", "false", "this", "type_of", "Fn", "call", "curry",
];

/// Extract identifier-like tokens from a snippet.
///
/// Best-effort lexical scan: skips string literals, member-access names
/// (`a.b` claims only `a`) and `let`/`const`-declared names (those are
/// snippet locals, not implicit document state). Over-claiming is
/// harmless: a claimed name the snippet never writes stays out of the
/// custom data store.
pub fn scan_identifiers(code: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut locals: HashSet<String> = HashSet::new();
    let bytes = code.as_bytes();
    let mut i = 0;
    let mut prev_significant: Option<u8> = None;
    let mut prev_token_was_decl = false;

    while i < bytes.len() {
        let c = bytes[i] as char;

        // Skip string literals (double-quoted, backtick, char)
        if c == '"' || c == '`' || c == '\'' {
            let quote = c;
            i += 1;
            while i < bytes.len() {
                let d = bytes[i] as char;
                if d == '\\' {
                    i += 2;
                    continue;
                }
                i += 1;
                if d == quote {
                    break;
                }
            }
            prev_significant = Some(quote as u8);
            prev_token_was_decl = false;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() {
                let d = bytes[i] as char;
                if d.is_ascii_alphanumeric() || d == '_' {
                    i += 1;
                } else {
                    break;
                }
            }
            let token = &code[start..i];
            let is_member_access = prev_significant == Some(b'.');
            if prev_token_was_decl {
                locals.insert(token.to_string());
            } else if !is_member_access
                && !KEYWORDS.contains(&token)
                && !tokens.iter().any(|t| t == token)
            {
                tokens.push(token.to_string());
            }
            prev_token_was_decl = token == "let" || token == "const";
            prev_significant = Some(b'x');
            continue;
        }

        if !c.is_whitespace() {
            prev_significant = Some(bytes[i]);
            prev_token_was_decl = false;
        }
        i += 1;
    }

    tokens.retain(|t| !locals.contains(t));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use actio_dom::Document;

    fn doc() -> DocumentHandle {
        DocumentHandle::new(Document::new("d1", "http://localhost/"))
    }

    fn opts(reserved: &[String]) -> ScopeOptions<'_> {
        ScopeOptions {
            mode: ScopeMode::Dynamic,
            strict: false,
            reserved,
            include_custom_data: true,
            include_document: true,
            include_component: true,
            include_functions: true,
        }
    }

    fn reserved() -> Vec<String> {
        RESERVED_BINDINGS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_skips_strings_and_members() {
        let ids = scan_identifiers(r#"x = y.width + "hello there" + z"#);
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_scan_skips_keywords() {
        let ids = scan_identifiers("if x == () { total = x; } else { refresh() }");
        assert_eq!(ids, vec!["x", "total", "refresh"]);
    }

    #[test]
    fn test_scan_excludes_declared_locals() {
        let ids = scan_identifiers("let tmp = seed + 1; tmp * 2");
        assert_eq!(ids, vec!["seed"]);
    }

    #[test]
    fn test_reserved_names_never_claimed() {
        let res = reserved();
        let handle = doc();
        let scope = resolve_scope(
            &handle,
            None,
            None,
            EventPayload::empty(),
            "evt = doc + custom",
            &opts(&res),
        );
        let names: Vec<&str> = scope.claims.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["custom"]);
    }

    #[test]
    fn test_component_overrides_document() {
        let res = reserved();
        let handle = doc();
        let component = ComponentInstance::new(7, "Card");
        let scope = resolve_scope(
            &handle,
            Some(component),
            None,
            EventPayload::empty(),
            "",
            &opts(&res),
        );
        // Both surfaces present, component entries merged after document's
        assert!(scope.base.iter().any(|(n, _)| n == "documentId"));
        assert!(scope
            .base
            .iter()
            .any(|(n, v)| n == "componentName" && *v == Value::from("Card")));
    }

    #[test]
    fn test_claims_seed_from_custom_data() {
        let res = reserved();
        let handle = doc();
        handle.borrow_mut().set_custom_data("x", Value::Int(41));
        let scope = resolve_scope(
            &handle,
            None,
            None,
            EventPayload::empty(),
            "x = x + fresh",
            &opts(&res),
        );
        let x = scope.claims.iter().find(|c| c.name == "x").unwrap();
        assert!(x.from_custom_data);
        assert_eq!(x.initial, Value::Int(41));
        let fresh = scope.claims.iter().find(|c| c.name == "fresh").unwrap();
        assert!(!fresh.from_custom_data);
        assert!(fresh.initial.is_unit());
    }

    #[test]
    fn test_eager_folds_custom_data_without_claims() {
        let res = reserved();
        let handle = doc();
        handle.borrow_mut().set_custom_data("score", Value::Int(5));
        let mut o = opts(&res);
        o.mode = ScopeMode::Eager;
        let scope = resolve_scope(
            &handle,
            None,
            None,
            EventPayload::empty(),
            "score = score + unknown",
            &o,
        );
        assert!(scope
            .base
            .iter()
            .any(|(n, v)| n == "score" && *v == Value::Int(5)));
        // No resolve-on-read layer: nothing gets claimed, mentioned or not
        assert!(scope.claims.is_empty());
    }

    #[test]
    fn test_strict_scope_is_empty() {
        let res = reserved();
        let handle = doc();
        let mut o = opts(&res);
        o.strict = true;
        let scope = resolve_scope(&handle, None, None, EventPayload::empty(), "x = 1", &o);
        assert!(scope.base.is_empty());
        assert!(scope.claims.is_empty());
        assert!(scope.strict);
    }

    #[test]
    fn test_user_function_names_excluded_from_layers() {
        let res = reserved();
        let handle = doc();
        handle
            .borrow_mut()
            .set_function("documentId", std::rc::Rc::new(|_, _, _| Value::Int(9)));
        let scope = resolve_scope(
            &handle,
            None,
            None,
            EventPayload::empty(),
            "documentId()",
            &opts(&res),
        );
        // The same-named member is kept out of the merge so the function wins
        assert!(!scope.base.iter().any(|(n, _)| n == "documentId"));
        assert!(!scope.claims.iter().any(|c| c.name == "documentId"));
    }
}
