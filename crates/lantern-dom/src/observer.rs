//! Mutation and Intersection Observers
//!
//! Mutation records are queued by the document as it is edited and taken
//! by their owners in batches. Intersection observers are evaluated on
//! demand against host-supplied element rects and the viewport.

use std::collections::HashMap;

use crate::{DOMRect, DomTree, NodeId, RootMargin};

/// Registered mutation observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u32);

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value,
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Default::default()
        }
    }

    fn wants(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => self.child_list,
            MutationType::CharacterData => self.character_data,
            MutationType::Attributes => {
                self.attributes
                    && match (&self.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                        _ => true,
                    }
            }
        }
    }
}

#[derive(Debug)]
struct MutationObserver {
    id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
    pending: Vec<MutationRecord>,
}

/// Every live mutation observer on a document
#[derive(Debug, Default)]
pub(crate) struct MutationObservers {
    next_id: u32,
    observers: Vec<MutationObserver>,
}

impl MutationObservers {
    pub(crate) fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.push(MutationObserver {
            id,
            target,
            options,
            pending: Vec::new(),
        });
        id
    }

    /// Returns false if the observer was not registered
    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        before != self.observers.len()
    }

    pub(crate) fn is_active(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|o| o.id == id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Queue a record on every observer whose target covers it
    pub(crate) fn queue(&mut self, tree: &DomTree, record: MutationRecord) {
        for observer in &mut self.observers {
            let covers = observer.target == record.target
                || (observer.options.subtree && tree.contains(observer.target, record.target));
            if covers && observer.options.wants(&record) {
                observer.pending.push(record.clone());
            }
        }
    }

    pub(crate) fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }
}

/// Intersection observer options
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverOptions {
    pub root_margin: RootMargin,
    /// Ratios at which a change is reported, ascending
    pub threshold: Vec<f64>,
}

impl Default for IntersectionObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::default(),
            threshold: vec![0.0],
        }
    }
}

impl IntersectionObserverOptions {
    pub fn new(threshold: f64, root_margin: &str) -> Self {
        Self {
            root_margin: RootMargin::parse(root_margin),
            threshold: vec![threshold],
        }
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverEntry {
    pub target: NodeId,
    pub bounding_client_rect: Option<DOMRect>,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
    pub time: f64,
}

/// Intersection observer rooted at the viewport
#[derive(Debug)]
pub struct IntersectionObserver {
    options: IntersectionObserverOptions,
    /// Observed targets with the last reported (threshold bucket, intersecting) state
    observed: HashMap<NodeId, Option<(usize, bool)>>,
    order: Vec<NodeId>,
}

impl IntersectionObserver {
    pub fn new(mut options: IntersectionObserverOptions) -> Self {
        if options.threshold.is_empty() {
            options.threshold.push(0.0);
        }
        options.threshold.sort_by(f64::total_cmp);
        Self {
            options,
            observed: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn options(&self) -> &IntersectionObserverOptions {
        &self.options
    }

    /// Observe an element. Observing twice is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        if self.observed.contains_key(&target) {
            return;
        }
        self.observed.insert(target, None);
        self.order.push(target);
    }

    pub fn unobserve(&mut self, target: NodeId) {
        if self.observed.remove(&target).is_some() {
            self.order.retain(|&n| n != target);
        }
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.order.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains_key(&target)
    }

    pub fn observed_count(&self) -> usize {
        self.order.len()
    }

    /// Evaluate every observed target against the viewport.
    ///
    /// A target's first evaluation always yields an entry; later ones
    /// yield an entry only when a threshold is crossed. Targets without a
    /// reported rect are not intersecting.
    pub fn check(&mut self, tree: &DomTree, viewport: DOMRect, time: f64) -> Vec<IntersectionObserverEntry> {
        let root = viewport.expand(&self.options.root_margin);
        let min_threshold = self.options.threshold[0];
        let mut entries = Vec::new();

        for &target in &self.order {
            let rect = tree
                .get(target)
                .and_then(|n| n.as_element())
                .and_then(|el| el.rect);
            let ratio = rect.and_then(|r| {
                let hit = r.intersection(&root)?;
                Some(if r.area() > 0.0 {
                    hit.area() / r.area()
                } else {
                    1.0
                })
            });
            let is_intersecting = ratio.is_some_and(|r| r >= min_threshold);
            let ratio = ratio.unwrap_or(0.0);
            let bucket = self.options.threshold.iter().filter(|&&t| ratio >= t).count();

            let Some(last) = self.observed.get_mut(&target) else {
                continue;
            };
            if *last == Some((bucket, is_intersecting)) {
                continue;
            }
            *last = Some((bucket, is_intersecting));
            entries.push(IntersectionObserverEntry {
                target,
                bounding_client_rect: rect,
                intersection_ratio: ratio,
                is_intersecting,
                time,
            });
        }
        entries
    }
}
