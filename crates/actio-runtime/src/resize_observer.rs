//! Resize observation
//!
//! Tracks element sizes fed in by the host and reports changes as
//! pending entries, one observer handle per bound element.

use actio_dom::NodeId;
use std::collections::HashMap;

/// Resize entry reported to an action
#[derive(Debug, Clone, Copy)]
pub struct ResizeEntry {
    pub target: NodeId,
    pub width: f64,
    pub height: f64,
}

/// Resize observer
#[derive(Debug)]
pub struct ResizeObserver {
    id: u64,
    observed: HashMap<NodeId, Option<(f64, f64)>>,
    pending_entries: Vec<ResizeEntry>,
}

impl ResizeObserver {
    fn new(id: u64) -> Self {
        Self {
            id,
            observed: HashMap::new(),
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Observe an element
    pub fn observe(&mut self, target: NodeId) {
        self.observed.insert(target, None);
    }

    /// Stop observing an element
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    /// Disconnect all observations
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.pending_entries.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    /// Compare host-reported sizes against the last seen ones
    pub fn check_sizes(&mut self, sizes: &HashMap<NodeId, (f64, f64)>) {
        for (node, last_size) in &mut self.observed {
            if let Some(&(width, height)) = sizes.get(node) {
                let changed = match *last_size {
                    Some((lw, lh)) => (lw - width).abs() > 0.01 || (lh - height).abs() > 0.01,
                    None => true,
                };
                if changed {
                    *last_size = Some((width, height));
                    self.pending_entries.push(ResizeEntry {
                        target: *node,
                        width,
                        height,
                    });
                }
            }
        }
    }

    /// Get pending entries and clear
    pub fn take_entries(&mut self) -> Vec<ResizeEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_entries.is_empty()
    }
}

/// Resize observer manager
#[derive(Debug, Default)]
pub struct ResizeObserverManager {
    observers: Vec<ResizeObserver>,
    next_id: u64,
}

impl ResizeObserverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new observer
    pub fn create(&mut self) -> u64 {
        self.next_id += 1;
        let observer = ResizeObserver::new(self.next_id);
        let id = observer.id();
        self.observers.push(observer);
        id
    }

    /// Get observer by ID
    pub fn get(&mut self, id: u64) -> Option<&mut ResizeObserver> {
        self.observers.iter_mut().find(|o| o.id() == id)
    }

    /// Remove observer
    pub fn remove(&mut self, id: u64) {
        self.observers.retain(|o| o.id() != id);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Process all observers against the host's current sizes
    pub fn process(&mut self, sizes: &HashMap<NodeId, (f64, f64)>) -> Vec<(u64, Vec<ResizeEntry>)> {
        let mut results = Vec::new();
        for observer in &mut self.observers {
            observer.check_sizes(sizes);
            if observer.has_pending() {
                results.push((observer.id(), observer.take_entries()));
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actio_dom::DomTree;

    #[test]
    fn test_resize_observer_reports_change() {
        let mut tree = DomTree::new();
        let node = tree.create_element("div");

        let mut mgr = ResizeObserverManager::new();
        let id = mgr.create();
        mgr.get(id).unwrap().observe(node);

        let mut sizes = HashMap::new();
        sizes.insert(node, (100.0, 200.0));

        let results = mgr.process(&sizes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1[0].width, 100.0);

        // Same size again is not a change
        assert!(mgr.process(&sizes).is_empty());

        sizes.insert(node, (120.0, 200.0));
        assert_eq!(mgr.process(&sizes).len(), 1);
    }

    #[test]
    fn test_unobserve_stops_entries() {
        let mut tree = DomTree::new();
        let node = tree.create_element("div");

        let mut mgr = ResizeObserverManager::new();
        let id = mgr.create();
        mgr.get(id).unwrap().observe(node);
        mgr.get(id).unwrap().unobserve(node);

        let mut sizes = HashMap::new();
        sizes.insert(node, (50.0, 50.0));
        assert!(mgr.process(&sizes).is_empty());
    }
}
