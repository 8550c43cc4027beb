//! Mutation observation
//!
//! Records attribute and child-list changes reported by the host,
//! with optional subtree matching and attribute filters.

use actio_dom::NodeId;
use std::collections::HashMap;

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

/// Mutation observer
#[derive(Debug)]
pub struct MutationObserver {
    id: u64,
    observations: HashMap<NodeId, MutationInit>,
    pending_records: Vec<MutationRecord>,
}

impl MutationObserver {
    fn new(id: u64) -> Self {
        Self {
            id,
            observations: HashMap::new(),
            pending_records: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Observe a target
    pub fn observe(&mut self, target: NodeId, options: MutationInit) {
        self.observations.insert(target, options);
    }

    /// Stop observing everything
    pub fn disconnect(&mut self) {
        self.observations.clear();
        self.pending_records.clear();
    }

    /// Take pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_records)
    }

    /// Check if observing node
    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observations.contains_key(&node)
    }

    /// Record a mutation. `target_path` is the mutated node's inclusive
    /// ancestor chain, used for subtree matching.
    pub fn record(&mut self, mutation: MutationRecord, target_path: &[NodeId]) {
        let should_record = self.observations.iter().any(|(&target, options)| {
            let matches_target = if target == mutation.target {
                true
            } else {
                options.subtree && target_path.contains(&target)
            };
            let matches_type = match mutation.mutation_type {
                MutationType::Attributes => options.attributes,
                MutationType::CharacterData => options.character_data,
                MutationType::ChildList => options.child_list,
            };
            let passes_filter = if mutation.mutation_type == MutationType::Attributes {
                match (&options.attribute_filter, &mutation.attribute_name) {
                    (Some(filter), Some(attr)) => filter.contains(attr),
                    _ => true,
                }
            } else {
                true
            };
            matches_target && matches_type && passes_filter
        });

        if should_record {
            self.pending_records.push(mutation);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_records.is_empty()
    }
}

/// Mutation observer manager
#[derive(Debug, Default)]
pub struct MutationObserverManager {
    observers: Vec<MutationObserver>,
    next_id: u64,
}

impl MutationObserverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create observer
    pub fn create(&mut self) -> u64 {
        self.next_id += 1;
        let observer = MutationObserver::new(self.next_id);
        let id = observer.id();
        self.observers.push(observer);
        id
    }

    /// Get observer
    pub fn get(&mut self, id: u64) -> Option<&mut MutationObserver> {
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

    /// Notify all observers of a mutation
    pub fn notify(&mut self, mutation: MutationRecord, target_path: &[NodeId]) {
        for observer in &mut self.observers {
            observer.record(mutation.clone(), target_path);
        }
    }

    /// Notify attribute change
    pub fn notify_attribute_change(
        &mut self,
        target: NodeId,
        name: &str,
        old_value: Option<String>,
        target_path: &[NodeId],
    ) {
        self.notify(
            MutationRecord {
                mutation_type: MutationType::Attributes,
                target,
                added_nodes: Vec::new(),
                removed_nodes: Vec::new(),
                attribute_name: Some(name.to_string()),
                old_value,
            },
            target_path,
        );
    }

    /// Notify character data change
    pub fn notify_character_data_change(
        &mut self,
        target: NodeId,
        old_value: Option<String>,
        target_path: &[NodeId],
    ) {
        self.notify(
            MutationRecord {
                mutation_type: MutationType::CharacterData,
                target,
                added_nodes: Vec::new(),
                removed_nodes: Vec::new(),
                attribute_name: None,
                old_value,
            },
            target_path,
        );
    }

    /// Notify child list change
    pub fn notify_child_change(
        &mut self,
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        target_path: &[NodeId],
    ) {
        self.notify(
            MutationRecord {
                mutation_type: MutationType::ChildList,
                target,
                added_nodes: added,
                removed_nodes: removed,
                attribute_name: None,
                old_value: None,
            },
            target_path,
        );
    }

    /// Drain pending records across all observers
    pub fn take_all(&mut self) -> Vec<(u64, Vec<MutationRecord>)> {
        let mut results = Vec::new();
        for observer in &mut self.observers {
            if observer.has_pending() {
                results.push((observer.id(), observer.take_records()));
            }
        }
        results
    }
}
