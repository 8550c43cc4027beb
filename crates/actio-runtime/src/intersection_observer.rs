//! Intersection observation
//!
//! Tracks element visibility against a viewport rect supplied by the
//! host, firing entries when a configured threshold is crossed.

use actio_dom::NodeId;
use std::collections::HashMap;

/// Intersection observer options
#[derive(Debug, Clone)]
pub struct IntersectionOptions {
    /// Element id of the intersection root. None means the host
    /// viewport.
    pub root: Option<String>,
    /// Root margin, as written in markup (informational; the host
    /// applies it when producing the viewport rect)
    pub root_margin: String,
    /// Thresholds that trigger a report when crossed
    pub threshold: Vec<f64>,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: "0px".to_string(),
            threshold: vec![0.0],
        }
    }
}

/// Parse a threshold attribute: whitespace-separated numbers, `%`
/// suffixed tokens divided by 100, unparsable tokens skipped, empty
/// list falls back to `[0.0]`.
pub fn parse_thresholds(raw: &str) -> Vec<f64> {
    let mut out = Vec::new();
    for item in raw.split_whitespace() {
        let (text, percent) = match item.strip_suffix('%') {
            Some(t) => (t, true),
            None => (item, false),
        };
        if let Ok(mut v) = text.parse::<f64>() {
            if percent {
                v /= 100.0;
            }
            out.push(v.clamp(0.0, 1.0));
        }
    }
    if out.is_empty() {
        out.push(0.0);
    }
    out
}

/// Intersection entry reported to an action
#[derive(Debug, Clone, Copy)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

/// Axis-aligned rect in host coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Overlap with another rect, None when disjoint
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect {
                x,
                y,
                width: right - x,
                height: bottom - y,
            })
        } else {
            None
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Intersection observer
#[derive(Debug)]
pub struct IntersectionObserver {
    id: u64,
    options: IntersectionOptions,
    observed: HashMap<NodeId, Option<f64>>, // last ratio
    pending_entries: Vec<IntersectionEntry>,
}

impl IntersectionObserver {
    fn new(id: u64, options: IntersectionOptions) -> Self {
        Self {
            id,
            options,
            observed: HashMap::new(),
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn options(&self) -> &IntersectionOptions {
        &self.options
    }

    /// Observe an element
    pub fn observe(&mut self, target: NodeId) {
        self.observed.insert(target, None);
    }

    /// Stop observing
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    /// Disconnect all
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.pending_entries.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    /// Check intersections against the current viewport
    pub fn check_intersections(&mut self, viewport: Rect, element_rects: &HashMap<NodeId, Rect>) {
        for (node, last_ratio) in &mut self.observed {
            if let Some(rect) = element_rects.get(node) {
                let intersection = rect.intersect(&viewport);
                let area = rect.area();
                let ratio = if area > 0.0 {
                    intersection.map(|i| i.area() / area).unwrap_or(0.0)
                } else {
                    0.0
                };

                let should_notify = match *last_ratio {
                    Some(lr) => self
                        .options
                        .threshold
                        .iter()
                        .any(|&t| (lr < t && ratio >= t) || (lr >= t && ratio < t)),
                    None => true,
                };

                if should_notify {
                    *last_ratio = Some(ratio);
                    self.pending_entries.push(IntersectionEntry {
                        target: *node,
                        intersection_ratio: ratio,
                        is_intersecting: ratio > 0.0,
                    });
                }
            }
        }
    }

    /// Take pending entries
    pub fn take_entries(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_entries.is_empty()
    }
}

/// Intersection observer manager
#[derive(Debug, Default)]
pub struct IntersectionObserverManager {
    observers: Vec<IntersectionObserver>,
    next_id: u64,
}

impl IntersectionObserverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create observer
    pub fn create(&mut self, options: IntersectionOptions) -> u64 {
        self.next_id += 1;
        let observer = IntersectionObserver::new(self.next_id, options);
        let id = observer.id();
        self.observers.push(observer);
        id
    }

    /// Get observer
    pub fn get(&mut self, id: u64) -> Option<&mut IntersectionObserver> {
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

    /// Process all observers
    pub fn process(
        &mut self,
        viewport: Rect,
        element_rects: &HashMap<NodeId, Rect>,
    ) -> Vec<(u64, Vec<IntersectionEntry>)> {
        let mut results = Vec::new();
        for observer in &mut self.observers {
            observer.check_intersections(viewport, element_rects);
            if observer.has_pending() {
                results.push((observer.id(), observer.take_entries()));
            }
        }
        results
    }
}
