//! Action trigger
//!
//! Executes one snippet against a resolved scope. Retains nothing across
//! invocations; the only durable side effect is the write-back into the
//! document's custom data store. No snippet failure ever reaches the
//! caller. A delegated listener, observer callback or lifecycle dispatch
//! must keep going even when one element's action is broken.

use std::cell::RefCell;
use std::rc::Rc;

use actio_dom::{ComponentInstance, DocumentHandle, EventPayload, NodeId, Value};

use crate::engine::ActionEngine;
use crate::rhai_engine::RhaiEngine;
use crate::scope::{resolve_scope, ScopeOptions};
use crate::settings::Settings;

/// Per-invocation options for [`ActionTrigger::trigger`]
#[derive(Default)]
pub struct TriggerOptions {
    /// Target element; defaults to the active scene's root
    pub element: Option<NodeId>,
    /// Component instance; defaults to the nearest-ancestor resolution
    pub component: Option<ComponentInstance>,
    /// Event payload; defaults to an empty record
    pub event: Option<EventPayload>,
    /// Strict-execution override for this invocation only
    pub strict: Option<bool>,
    /// Diagnostics message override
    pub error_message: Option<String>,
    /// Suppress the underlying error detail in diagnostics
    pub omit_error_detail: bool,
}

/// Executes action snippets with scope resolution and failure isolation
pub struct ActionTrigger {
    doc: DocumentHandle,
    engine: RefCell<Box<dyn ActionEngine>>,
    settings: Rc<RefCell<Settings>>,
}

impl ActionTrigger {
    pub fn new(doc: &DocumentHandle, settings: Rc<RefCell<Settings>>) -> Self {
        Self {
            doc: doc.clone(),
            engine: RefCell::new(Box::new(RhaiEngine::new(doc))),
            settings,
        }
    }

    /// Swap in a different evaluator implementation
    pub fn with_engine(
        doc: &DocumentHandle,
        settings: Rc<RefCell<Settings>>,
        engine: Box<dyn ActionEngine>,
    ) -> Self {
        Self {
            doc: doc.clone(),
            engine: RefCell::new(engine),
            settings,
        }
    }

    /// Execute `code` with the given options.
    ///
    /// Empty code is a silent no-op. Returns the snippet's result, or
    /// `None` when the snippet was empty or failed.
    pub fn trigger(&self, code: &str, options: TriggerOptions) -> Option<Value> {
        if code.trim().is_empty() {
            return None;
        }

        let element = options
            .element
            .or_else(|| self.doc.borrow().current_scene_root());
        let component = options.component.or_else(|| {
            element.and_then(|e| self.doc.borrow().component_for_element(e))
        });

        let mut event = options.event.unwrap_or_else(EventPayload::empty);
        if let Some(instance) = &component {
            // Reserved field so snippets can introspect the triggering component
            let mut info = std::collections::HashMap::new();
            info.insert("id".to_string(), Value::Int(instance.id() as i64));
            info.insert("name".to_string(), Value::from(instance.name()));
            event.set("component", Value::Map(info));
        }

        let settings = self.settings.borrow();
        let strict = options.strict.unwrap_or(settings.strict_mode);
        let scope_opts = ScopeOptions {
            mode: settings.scope_mode,
            strict,
            reserved: &settings.reserved_names,
            include_custom_data: settings.context_custom_data,
            include_document: settings.context_document,
            include_component: settings.context_component,
            include_functions: settings.context_functions,
        };
        let scope = resolve_scope(&self.doc, component, element, event, code, &scope_opts);
        let debug = settings.debug;
        drop(settings);

        let result = self.engine.borrow_mut().eval(code, &scope);
        match result {
            Ok(outcome) => {
                let mut doc = self.doc.borrow_mut();
                for (name, value) in outcome.writes {
                    doc.set_custom_data(&name, value);
                }
                Some(outcome.value)
            }
            Err(err) => {
                let preview = is_preview(self.doc.borrow().url());
                if debug || preview {
                    let message = options
                        .error_message
                        .as_deref()
                        .unwrap_or("action error");
                    if options.omit_error_detail {
                        tracing::error!(%message, code, "action failed");
                    } else {
                        tracing::error!(%message, code, error = %err, "action failed");
                    }
                }
                None
            }
        }
    }
}

/// Interactive-preview heuristic: loopback origin plus a "/preview/"
/// path segment. Deliberately fuzzy; production deployments must not
/// surface raw script errors to end users.
pub fn is_preview(url: &str) -> bool {
    url.contains("127.0.0.1:") && url.contains("/preview/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actio_dom::Document;

    fn setup() -> (DocumentHandle, ActionTrigger) {
        let doc = DocumentHandle::new(Document::new("d1", "http://localhost/"));
        let settings = Rc::new(RefCell::new(Settings::default()));
        let trigger = ActionTrigger::new(&doc, settings);
        (doc, trigger)
    }

    #[test]
    fn test_empty_code_is_noop() {
        let (_, trigger) = setup();
        assert!(trigger.trigger("", TriggerOptions::default()).is_none());
        assert!(trigger.trigger("   ", TriggerOptions::default()).is_none());
    }

    #[test]
    fn test_failure_is_isolated() {
        let (_, trigger) = setup();
        assert!(trigger
            .trigger("this is not ( valid", TriggerOptions::default())
            .is_none());
        // And the trigger stays usable afterwards
        assert_eq!(
            trigger.trigger("2 + 2", TriggerOptions::default()),
            Some(Value::Int(4))
        );
    }

    #[test]
    fn test_implicit_write_persists_across_invocations() {
        let (doc, trigger) = setup();
        trigger.trigger("score = 10", TriggerOptions::default());
        assert_eq!(doc.borrow().custom_data("score"), Value::Int(10));
        let read_back = trigger.trigger("score", TriggerOptions::default());
        assert_eq!(read_back, Some(Value::Int(10)));
    }

    #[test]
    fn test_increment_scenario_three_fires() {
        let (doc, trigger) = setup();
        let code = "x = (if x == () { 0 } else { x }) + 1";
        for _ in 0..3 {
            trigger.trigger(code, TriggerOptions::default());
        }
        assert_eq!(doc.borrow().custom_data("x"), Value::Int(3));
    }

    #[test]
    fn test_eager_mode_reads_store_but_writes_stay_transient() {
        let doc = DocumentHandle::new(Document::new("d1", "http://localhost/"));
        doc.borrow_mut().set_custom_data("x", Value::Int(5));
        let settings = Rc::new(RefCell::new(Settings::default()));
        settings.borrow_mut().scope_mode = crate::scope::ScopeMode::Eager;
        let trigger = ActionTrigger::new(&doc, settings);
        let out = trigger.trigger("x = x + 1; x", TriggerOptions::default());
        assert_eq!(out, Some(Value::Int(6)));
        // The store keeps the pre-invocation value
        assert_eq!(doc.borrow().custom_data("x"), Value::Int(5));
    }

    #[test]
    fn test_user_function_wins_over_member() {
        let (doc, trigger) = setup();
        // "documentId" is also a document surface member
        doc.borrow_mut()
            .set_function("documentId", Rc::new(|_, _, _| Value::from("from-fn")));
        let out = trigger.trigger("documentId()", TriggerOptions::default());
        assert_eq!(out, Some(Value::from("from-fn")));
    }

    #[test]
    fn test_component_attached_to_event() {
        let doc = DocumentHandle::new(Document::new("d1", "http://localhost/"));
        let (root, inner) = {
            let mut d = doc.borrow_mut();
            let root = d.tree_mut().create_element("section");
            let inner = d.tree_mut().create_element("div");
            d.tree_mut().append_child(root, inner);
            d.register_component(root, "Panel");
            (root, inner)
        };
        let _ = root;
        let settings = Rc::new(RefCell::new(Settings::default()));
        let trigger = ActionTrigger::new(&doc, settings);
        let out = trigger.trigger(
            "evt.component.name",
            TriggerOptions {
                element: Some(inner),
                ..Default::default()
            },
        );
        assert_eq!(out, Some(Value::from("Panel")));
    }

    #[test]
    fn test_strict_override_blocks_context() {
        let (doc, trigger) = setup();
        doc.borrow_mut().set_custom_data("x", Value::Int(5));
        let out = trigger.trigger(
            "x",
            TriggerOptions {
                strict: Some(true),
                ..Default::default()
            },
        );
        // No implicit context in strict mode: the read fails and is isolated
        assert!(out.is_none());
    }

    #[test]
    fn test_functions_toggle_removes_them_from_context() {
        let doc = DocumentHandle::new(Document::new("d1", "http://localhost/"));
        doc.borrow_mut()
            .set_function("greet", Rc::new(|_, _, _| Value::from("hi")));
        let settings = Rc::new(RefCell::new(Settings::default()));
        settings.borrow_mut().context_functions = false;
        let trigger = ActionTrigger::new(&doc, settings);
        assert!(trigger.trigger("greet()", TriggerOptions::default()).is_none());
    }

    #[test]
    fn test_preview_heuristic() {
        assert!(is_preview("http://127.0.0.1:8000/preview/index.html"));
        assert!(!is_preview("http://127.0.0.1:8000/site/index.html"));
        assert!(!is_preview("https://example.com/preview/index.html"));
    }
}
