//! Rhai-backed action engine
//!
//! Translates a [`ResolvedScope`] into a `rhai::Scope`: positional
//! bindings become constants, the merged base layer and the claimed
//! names become writable variables, and user functions are registered on
//! the engine pre-bound to the live invocation's (document, element,
//! event) triple. After execution the claimed layer is swept for writes
//! destined for the custom data store.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use actio_dom::{DocumentHandle, EventPayload, NodeId, Value};
use rhai::{Dynamic, EvalAltResult, ImmutableString};

use crate::engine::{ActionEngine, EvalOutcome, ScriptError};
use crate::scope::{ResolvedScope, ScopeMode};

/// The (element, event) pair a user function is bound to at call time.
#[derive(Default)]
struct Invocation {
    element: Option<NodeId>,
    event: EventPayload,
    /// Set in strict mode or when functions are out of the context
    deny_functions: bool,
}

/// Element handle exposed to snippets as `elem` / `element`
#[derive(Clone)]
pub struct ElementHandle {
    doc: DocumentHandle,
    node: NodeId,
}

impl ElementHandle {
    fn id(&mut self) -> Dynamic {
        self.doc
            .borrow()
            .tree()
            .element_id(self.node)
            .map(|s| s.into())
            .unwrap_or(Dynamic::UNIT)
    }

    fn tag(&mut self) -> String {
        self.doc
            .borrow()
            .tree()
            .get(self.node)
            .map(|n| n.element.tag.clone())
            .unwrap_or_default()
    }

    fn attr(&mut self, name: &str) -> Dynamic {
        self.doc
            .borrow()
            .tree()
            .attr(self.node, name)
            .map(|s| s.into())
            .unwrap_or(Dynamic::UNIT)
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        self.doc.borrow_mut().tree_mut().set_attr(self.node, name, value);
    }
}

/// Rhai implementation of [`ActionEngine`]
pub struct RhaiEngine {
    engine: rhai::Engine,
    doc: DocumentHandle,
    invocation: Rc<RefCell<Invocation>>,
    registered: HashSet<String>,
}

impl RhaiEngine {
    pub fn new(doc: &DocumentHandle) -> Self {
        let mut engine = rhai::Engine::new();
        engine.set_max_expr_depths(0, 0);

        engine.register_type_with_name::<DocumentHandle>("Document");
        engine.register_get("id", |d: &mut DocumentHandle| -> String {
            d.borrow().id().to_string()
        });
        engine.register_get("sceneId", |d: &mut DocumentHandle| -> Dynamic {
            d.borrow()
                .current_scene_id()
                .map(|s| s.into())
                .unwrap_or(Dynamic::UNIT)
        });
        engine.register_get("url", |d: &mut DocumentHandle| -> String {
            d.borrow().url().to_string()
        });
        engine.register_fn("data", |d: &mut DocumentHandle, key: &str| -> Dynamic {
            value_to_dynamic(d.borrow().custom_data(key))
        });
        engine.register_fn(
            "setData",
            |d: &mut DocumentHandle, key: &str, value: Dynamic| {
                d.borrow_mut().set_custom_data(key, dynamic_to_value(&value));
            },
        );

        engine.register_type_with_name::<ElementHandle>("Element");
        engine.register_get("id", ElementHandle::id);
        engine.register_get("tag", ElementHandle::tag);
        engine.register_fn("attr", ElementHandle::attr);
        engine.register_fn("setAttr", ElementHandle::set_attr);

        Self {
            engine,
            doc: doc.clone(),
            invocation: Rc::new(RefCell::new(Invocation::default())),
            registered: HashSet::new(),
        }
    }

    /// Register any user functions that appeared in the table since the
    /// last invocation. The closure looks the function up at call time,
    /// so replacing a function under the same name takes effect
    /// immediately without re-registration.
    fn sync_user_functions(&mut self) {
        let names = self.doc.borrow().function_names();
        for name in names {
            if self.registered.contains(&name) {
                continue;
            }
            let doc = self.doc.clone();
            let invocation = self.invocation.clone();
            let fn_name = name.clone();
            self.engine.register_fn(
                name.as_str(),
                move || -> Result<Dynamic, Box<EvalAltResult>> {
                    let (element, event, denied) = {
                        let inv = invocation.borrow();
                        (inv.element, inv.event.clone(), inv.deny_functions)
                    };
                    if denied {
                        return Err(format!("function not found: {}", fn_name).into());
                    }
                    let func = doc.borrow().function(&fn_name);
                    match func {
                        Some(f) => Ok(value_to_dynamic(f(&doc, element, &event))),
                        None => Err(format!("function not found: {}", fn_name).into()),
                    }
                },
            );
            self.registered.insert(name);
        }
    }

    fn build_scope(&self, resolved: &ResolvedScope) -> rhai::Scope<'static> {
        let mut scope = rhai::Scope::new();

        // Context record snapshot: the merged base plus the claimed layer.
        let mut ctx = rhai::Map::new();
        for (name, value) in &resolved.base {
            ctx.insert(name.as_str().into(), value_to_dynamic(value.clone()));
        }
        for claim in &resolved.claims {
            ctx.insert(claim.name.as_str().into(), value_to_dynamic(claim.initial.clone()));
        }

        let comp: Dynamic = match &resolved.component {
            Some(instance) => {
                let mut m = rhai::Map::new();
                m.insert("id".into(), Dynamic::from(instance.id() as i64));
                m.insert("name".into(), Dynamic::from(instance.name().to_string()));
                Dynamic::from_map(m)
            }
            None => Dynamic::UNIT,
        };
        let elem: Dynamic = match resolved.element {
            Some(node) => Dynamic::from(ElementHandle {
                doc: resolved.document.clone(),
                node,
            }),
            None => Dynamic::UNIT,
        };
        let evt = Dynamic::from_map(event_to_map(&resolved.event));
        let doc = Dynamic::from(resolved.document.clone());

        // Fixed positional bindings, as constants so no layer can shadow
        // them; the long forms repeat the same four values.
        scope.push_constant_dynamic("ctx", Dynamic::from_map(ctx));
        scope.push_constant_dynamic("doc", doc.clone());
        scope.push_constant_dynamic("comp", comp.clone());
        scope.push_constant_dynamic("elem", elem.clone());
        scope.push_constant_dynamic("evt", evt.clone());
        scope.push_constant_dynamic("document", doc);
        scope.push_constant_dynamic("component", comp);
        scope.push_constant_dynamic("element", elem);
        scope.push_constant_dynamic("event", evt);

        if !resolved.strict {
            for (name, value) in &resolved.base {
                scope.push_dynamic(name.clone(), value_to_dynamic(value.clone()));
            }
            for claim in &resolved.claims {
                scope.push_dynamic(claim.name.clone(), value_to_dynamic(claim.initial.clone()));
            }
        }

        scope
    }
}

impl ActionEngine for RhaiEngine {
    fn eval(&mut self, code: &str, resolved: &ResolvedScope) -> Result<EvalOutcome, ScriptError> {
        self.sync_user_functions();
        {
            let mut inv = self.invocation.borrow_mut();
            inv.element = resolved.element;
            inv.event = resolved.event.clone();
            inv.deny_functions = resolved.strict || !resolved.functions;
        }

        let mut scope = self.build_scope(resolved);
        let result = self
            .engine
            .eval_with_scope::<Dynamic>(&mut scope, code)
            .map_err(|e| match *e {
                EvalAltResult::ErrorParsing(..) => ScriptError::Parse(e.to_string()),
                _ => ScriptError::Runtime(e.to_string()),
            })?;

        // Write-back sweep: claimed names the snippet left behind become
        // durable per-document state. Base-layer writes stay transient.
        let mut writes = Vec::new();
        if resolved.mode == ScopeMode::Dynamic && !resolved.strict {
            for claim in &resolved.claims {
                if let Some(current) = scope.get_value::<Dynamic>(&claim.name) {
                    let value = dynamic_to_value(&current);
                    if claim.from_custom_data || !value.is_unit() {
                        writes.push((claim.name.clone(), value));
                    }
                }
            }
        }

        Ok(EvalOutcome {
            value: dynamic_to_value(&result),
            writes,
        })
    }
}

fn event_to_map(event: &EventPayload) -> rhai::Map {
    let mut map = rhai::Map::new();
    map.insert("type".into(), Dynamic::from(event.event_type.clone()));
    for (key, value) in &event.data {
        map.insert(key.as_str().into(), value_to_dynamic(value.clone()));
    }
    map
}

fn value_to_dynamic(value: Value) -> Dynamic {
    match value {
        Value::Unit => Dynamic::UNIT,
        Value::Bool(b) => b.into(),
        Value::Int(i) => Dynamic::from(i),
        Value::Float(f) => Dynamic::from(f),
        Value::Str(s) => s.into(),
        Value::List(items) => {
            Dynamic::from_array(items.into_iter().map(value_to_dynamic).collect())
        }
        Value::Map(entries) => {
            let mut map = rhai::Map::new();
            for (key, value) in entries {
                map.insert(key.as_str().into(), value_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
    }
}

fn dynamic_to_value(value: &Dynamic) -> Value {
    let value = value.clone();
    if value.is_unit() {
        Value::Unit
    } else if value.is::<bool>() {
        Value::Bool(value.cast::<bool>())
    } else if value.is::<i64>() {
        Value::Int(value.cast::<i64>())
    } else if value.is::<f64>() {
        Value::Float(value.cast::<f64>())
    } else if value.is::<ImmutableString>() {
        Value::Str(value.cast::<ImmutableString>().as_str().to_string())
    } else if value.is::<char>() {
        Value::Str(value.cast::<char>().to_string())
    } else if value.is::<rhai::Array>() {
        Value::List(
            value
                .cast::<rhai::Array>()
                .iter()
                .map(dynamic_to_value)
                .collect(),
        )
    } else if value.is::<rhai::Map>() {
        Value::Map(
            value
                .cast::<rhai::Map>()
                .iter()
                .map(|(k, v)| (k.to_string(), dynamic_to_value(v)))
                .collect(),
        )
    } else {
        // Engine-internal types (handles, fn pointers) do not round-trip
        Value::Unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{resolve_scope, ScopeOptions, RESERVED_BINDINGS};
    use actio_dom::Document;

    fn handle() -> DocumentHandle {
        DocumentHandle::new(Document::new("d1", "http://localhost/"))
    }

    fn reserved() -> Vec<String> {
        RESERVED_BINDINGS.iter().map(|s| s.to_string()).collect()
    }

    fn dynamic_opts(reserved: &[String]) -> ScopeOptions<'_> {
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

    fn eval(engine: &mut RhaiEngine, doc: &DocumentHandle, code: &str) -> EvalOutcome {
        let res = reserved();
        let scope = resolve_scope(
            doc,
            None,
            None,
            EventPayload::empty(),
            code,
            &dynamic_opts(&res),
        );
        engine.eval(code, &scope).unwrap()
    }

    #[test]
    fn test_eval_expression() {
        let doc = handle();
        let mut engine = RhaiEngine::new(&doc);
        let out = eval(&mut engine, &doc, "1 + 2");
        assert_eq!(out.value, Value::Int(3));
    }

    #[test]
    fn test_claimed_write_reaches_sweep() {
        let doc = handle();
        let mut engine = RhaiEngine::new(&doc);
        let out = eval(&mut engine, &doc, "x = 41; x + 1");
        assert_eq!(out.value, Value::Int(42));
        assert!(out.writes.contains(&("x".to_string(), Value::Int(41))));
    }

    #[test]
    fn test_unwritten_claim_not_persisted() {
        let doc = handle();
        let mut engine = RhaiEngine::new(&doc);
        let out = eval(&mut engine, &doc, "missing");
        assert_eq!(out.value, Value::Unit);
        assert!(out.writes.is_empty());
    }

    #[test]
    fn test_eager_scope_sweeps_no_writes() {
        let doc = handle();
        doc.borrow_mut().set_custom_data("n", Value::Int(1));
        let mut engine = RhaiEngine::new(&doc);
        let res = reserved();
        let mut opts = dynamic_opts(&res);
        opts.mode = ScopeMode::Eager;
        let scope = resolve_scope(&doc, None, None, EventPayload::empty(), "n = 9; n", &opts);
        let out = engine.eval("n = 9; n", &scope).unwrap();
        assert_eq!(out.value, Value::Int(9));
        assert!(out.writes.is_empty());
    }

    #[test]
    fn test_claim_seeded_from_custom_data() {
        let doc = handle();
        doc.borrow_mut().set_custom_data("x", Value::Int(2));
        let mut engine = RhaiEngine::new(&doc);
        let out = eval(&mut engine, &doc, "x * 10");
        assert_eq!(out.value, Value::Int(20));
    }

    #[test]
    fn test_user_function_called_with_binding() {
        let doc = handle();
        doc.borrow_mut().set_function(
            "answer",
            Rc::new(|_, _, event| {
                Value::Str(format!("evt:{}", event.event_type))
            }),
        );
        let mut engine = RhaiEngine::new(&doc);
        let res = reserved();
        let scope = resolve_scope(
            &doc,
            None,
            None,
            EventPayload::native("click", NodeId::NONE),
            "answer()",
            &dynamic_opts(&res),
        );
        let out = engine.eval("answer()", &scope).unwrap();
        assert_eq!(out.value, Value::from("evt:click"));
    }

    #[test]
    fn test_strict_mode_denies_user_functions() {
        let doc = handle();
        doc.borrow_mut()
            .set_function("answer", Rc::new(|_, _, _| Value::Int(1)));
        let mut engine = RhaiEngine::new(&doc);
        let res = reserved();
        let mut opts = dynamic_opts(&res);
        opts.strict = true;
        let scope = resolve_scope(&doc, None, None, EventPayload::empty(), "answer()", &opts);
        assert!(engine.eval("answer()", &scope).is_err());
    }

    #[test]
    fn test_positional_bindings_visible_in_strict() {
        let doc = handle();
        let mut engine = RhaiEngine::new(&doc);
        let res = reserved();
        let mut opts = dynamic_opts(&res);
        opts.strict = true;
        let scope = resolve_scope(&doc, None, None, EventPayload::empty(), "doc.id", &opts);
        let out = engine.eval("doc.id", &scope).unwrap();
        assert_eq!(out.value, Value::from("d1"));
    }

    #[test]
    fn test_let_locals_do_not_persist() {
        let doc = handle();
        let mut engine = RhaiEngine::new(&doc);
        let out = eval(&mut engine, &doc, "let tmp = 5; tmp");
        assert_eq!(out.value, Value::Int(5));
        assert!(out.writes.iter().all(|(n, _)| n != "tmp"));
    }

    #[test]
    fn test_value_dynamic_roundtrip() {
        let v = Value::Map(
            [
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::List(vec![Value::Bool(true)])),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(dynamic_to_value(&value_to_dynamic(v.clone())), v);
    }
}
