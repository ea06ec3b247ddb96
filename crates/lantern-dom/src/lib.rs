//! Lantern DOM - Document Object Model
//!
//! Arena-based document tree plus the host primitives the enhancement
//! managers observe: mutation and intersection observers, performance
//! entries, one-shot timers and the window environment.

mod classlist;
mod document;
mod env;
mod events;
mod geometry;
mod node;
mod observer;
mod performance;
mod selector;
mod style;
mod timers;
mod tree;

pub use classlist::TokenList;
pub use document::{Document, ReadyState};
pub use env::{
    BuildMode, Capabilities, DeviceInfo, Environment, HostKind, MediaFeatures, NetworkInfo,
    Storage,
};
pub use events::{Key, KeyboardEvent, SyntheticEvent};
pub use geometry::{DOMRect, RootMargin};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverOptions,
    MutationObserverInit, MutationRecord, MutationType, ObserverId,
};
pub use performance::{EntryType, NavigationTiming, PerformanceEntry, PerformanceObserver};
pub use selector::{AttributeMatcher, AttributeSelector, Selector};
pub use style::{ComputedStyle, Display, Visibility};
pub use timers::{TimerHandle, TimerQueue};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Selector used to enumerate sequentially focusable elements.
pub const FOCUSABLE_SELECTOR: &str = "a[href], button:not([disabled]), input:not([disabled]), \
     select:not([disabled]), textarea:not([disabled]), [tabindex]:not([tabindex=\"-1\"]), \
     details[open] summary, [contenteditable=\"true\"]";

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child:?} into {parent:?}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
}
