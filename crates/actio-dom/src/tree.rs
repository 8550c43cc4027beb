//! Element tree (arena-based allocation)

use crate::{Node, NodeId};

/// Arena-based element tree
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::element(tag));
        id
    }

    /// Create an element carrying an `id` attribute
    pub fn create_element_with_id(&mut self, tag: &str, elem_id: &str) -> NodeId {
        let id = self.create_element(tag);
        self.set_attr(id, "id", elem_id);
        id
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev_last;
            node.next_sibling = NodeId::NONE;
        }
        if let Some(prev) = self.get_mut(prev_last) {
            prev.next_sibling = child;
        }
        if let Some(node) = self.get_mut(parent) {
            if !node.first_child.is_valid() {
                node.first_child = child;
            }
            node.last_child = child;
        }
    }

    /// Direct children of a node, in order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        while let Some(node) = self.get(cur) {
            out.push(cur);
            cur = node.next_sibling;
        }
        out
    }

    /// All descendants of `root` (root excluded), in document order
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(root, &mut out);
        out
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Ancestors of `node` starting with the node itself
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = node;
        while let Some(n) = self.get(cur) {
            out.push(cur);
            cur = n.parent;
        }
        out
    }

    /// Attribute value of a node
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|n| n.element.get_attr(name))
    }

    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Option<String> {
        self.get_mut(node).and_then(|n| n.element.set_attr(name, value))
    }

    /// Cached `id` attribute of a node
    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(|n| n.element.id.as_deref())
    }

    /// Find an element by `id` attribute (whole tree)
    pub fn element_by_id(&self, elem_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.element.id.as_deref() == Some(elem_id))
            .map(|i| NodeId(i as u32))
    }

    /// All elements under `root` (inclusive) carrying `attr`, in document order
    pub fn query_by_attribute(&self, root: NodeId, attr: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.attr(root, attr).is_some() {
            out.push(root);
        }
        for node in self.descendants(root) {
            if self.attr(node, attr).is_some() {
                out.push(node);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
