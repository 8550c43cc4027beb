//! actio DOM - Host document model
//!
//! The host-collaborator surface the action-event core runs against:
//! an arena element tree, a per-document context (custom data store,
//! user function table, scenes), and component instances resolved by
//! nearest-ancestor lookup.

mod component;
mod document;
mod event;
mod node;
mod tree;
mod value;

pub use component::ComponentInstance;
pub use document::{Document, DocumentHandle, UserFunction};
pub use event::EventPayload;
pub use node::{Attribute, ElementData, Node};
pub use tree::DomTree;
pub use value::Value;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Raw arena index, for synthetic registry keys
    pub fn index(&self) -> u32 {
        self.0
    }
}
