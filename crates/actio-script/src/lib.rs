//! actio script - scoped execution of action snippets
//!
//! The two hard problems of the action-event core live here: deciding
//! which names a snippet can see (and in what precedence order), and
//! executing the snippet with fixed positional bindings while isolating
//! every runtime failure from the caller.
//!
//! The evaluator itself is pluggable behind the [`ActionEngine`] trait;
//! the shipped implementation is rhai-backed ([`RhaiEngine`]).

mod engine;
mod rhai_engine;
mod scope;
mod settings;
mod trigger;

pub use engine::{ActionEngine, EvalOutcome, ScriptError};
pub use rhai_engine::RhaiEngine;
pub use scope::{resolve_scope, Claim, ResolvedScope, ScopeMode, ScopeOptions, RESERVED_BINDINGS};
pub use settings::Settings;
pub use trigger::{is_preview, ActionTrigger, TriggerOptions};
