//! Action engine interface
//!
//! Abstract evaluator seam, allowing pluggable implementations. The
//! contract every implementation must keep: the fixed positional bindings
//! are always visible and never shadowable, scope layers resolve in the
//! order the resolver produced them, and nothing but `ScriptError` ever
//! crosses this boundary.

use actio_dom::Value;

use crate::scope::ResolvedScope;

/// Abstract action-snippet evaluator.
pub trait ActionEngine {
    /// Evaluate one snippet against a resolved scope.
    ///
    /// Returns the snippet's result plus the writes the dynamic scope
    /// collected for the custom data store. The engine never applies the
    /// writes itself; the trigger owns that side effect.
    fn eval(&mut self, code: &str, scope: &ResolvedScope) -> Result<EvalOutcome, ScriptError>;
}

/// Result of one snippet execution
#[derive(Debug, Clone, Default)]
pub struct EvalOutcome {
    /// Whatever the snippet returned
    pub value: Value,
    /// Names the snippet implicitly declared or updated, destined for the
    /// custom data store (empty in eager and strict modes)
    pub writes: Vec<(String, Value)>,
}

/// Evaluator error
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
