//! Lazy image loading
//!
//! `img[data-src]` elements keep their real source in `data-*` attributes
//! until they come near the viewport.

use std::collections::HashSet;

use lantern_dom::{
    DOMRect, Document, IntersectionObserver, IntersectionObserverOptions, NodeId,
};

pub(crate) const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

/// Lazy-loading state for one page
#[derive(Debug)]
pub(crate) struct LazyImages {
    /// `None` without intersection observation
    observer: Option<IntersectionObserver>,
    /// Swapped images waiting for their load or error event
    awaiting: HashSet<NodeId>,
}

impl LazyImages {
    pub(crate) fn observing(options: IntersectionObserverOptions) -> Self {
        Self {
            observer: Some(IntersectionObserver::new(options)),
            awaiting: HashSet::new(),
        }
    }

    /// Fallback without intersection observation
    pub(crate) fn eager() -> Self {
        Self {
            observer: None,
            awaiting: HashSet::new(),
        }
    }

    /// Observe every lazy image in `scope`, or load them all at once
    /// when observation is unavailable
    pub(crate) fn register(&mut self, doc: &mut Document, scope: NodeId) {
        let mut images = doc.query_selector_all_in(scope, LAZY_IMAGE_SELECTOR);
        if doc.matches(scope, LAZY_IMAGE_SELECTOR) {
            images.insert(0, scope);
        }
        if let Some(observer) = self.observer.as_mut() {
            for img in images {
                observer.observe(img);
            }
            return;
        }
        for img in images {
            self.load(doc, img);
        }
    }

    /// Load images that intersect the viewport; returns the images swapped
    pub(crate) fn check(&mut self, doc: &mut Document, viewport: DOMRect) -> Vec<NodeId> {
        let Some(observer) = self.observer.as_mut() else {
            return Vec::new();
        };
        let intersecting: Vec<NodeId> = observer
            .check(doc.tree(), viewport, doc.now_ms())
            .into_iter()
            .filter(|e| e.is_intersecting)
            .map(|e| e.target)
            .collect();
        for &img in &intersecting {
            observer.unobserve(img);
        }
        intersecting
            .into_iter()
            .filter(|&img| self.load(doc, img))
            .collect()
    }

    /// Swap in the real source. Returns false if there was nothing to swap.
    pub(crate) fn load(&mut self, doc: &mut Document, img: NodeId) -> bool {
        let src = doc.remove_attr(img, "data-src");
        let srcset = doc.remove_attr(img, "data-srcset");
        if src.is_none() && srcset.is_none() {
            return false;
        }
        if let Some(src) = &src {
            doc.set_attr(img, "src", src);
        }
        if let Some(srcset) = &srcset {
            doc.set_attr(img, "srcset", srcset);
        }
        self.awaiting.insert(img);
        tracing::trace!(?img, src = src.as_deref().unwrap_or_default(), "lazy image loaded");
        true
    }

    /// Native `load` event for a swapped image
    pub(crate) fn on_load(&mut self, doc: &mut Document, img: NodeId) {
        if self.awaiting.remove(&img) {
            doc.add_class(img, "loaded");
            doc.remove_class(img, "loading-shimmer");
        }
    }

    /// Native `error` event for a swapped image
    pub(crate) fn on_error(&mut self, doc: &mut Document, img: NodeId) {
        if self.awaiting.remove(&img) {
            doc.add_class(img, "error");
            tracing::warn!(
                element = ?img,
                src = doc.attr(img, "src").unwrap_or_default(),
                "Image failed to load"
            );
        }
    }

    pub(crate) fn is_observing(&self, img: NodeId) -> bool {
        self.observer.as_ref().is_some_and(|o| o.is_observing(img))
    }

    pub(crate) fn disconnect(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
        self.awaiting.clear();
    }
}
