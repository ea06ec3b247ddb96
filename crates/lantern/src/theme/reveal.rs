//! Scroll reveal
//!
//! Feature cards and document headings get `scroll-reveal` the first time
//! they enter the viewport.

use lantern_dom::{DOMRect, Document, IntersectionObserver, IntersectionObserverOptions, NodeId};

const REVEAL_SELECTOR: &str = ".VPFeature, .VPDoc h2, .VPDoc h3";
const REVEAL_CLASS: &str = "scroll-reveal";

#[derive(Debug)]
pub struct ScrollReveal {
    observer: IntersectionObserver,
}

impl ScrollReveal {
    /// Observe every revealable element currently in the document
    pub fn new(doc: &Document) -> Self {
        let mut observer =
            IntersectionObserver::new(IntersectionObserverOptions::new(0.1, "0px 0px -50px 0px"));
        for el in doc.query_selector_all(REVEAL_SELECTOR) {
            observer.observe(el);
        }
        Self { observer }
    }

    /// Reveal elements intersecting `viewport`; returns the newly revealed
    pub fn check(&mut self, doc: &mut Document, viewport: DOMRect) -> Vec<NodeId> {
        let revealed: Vec<NodeId> = self
            .observer
            .check(doc.tree(), viewport, doc.now_ms())
            .into_iter()
            .filter(|e| e.is_intersecting)
            .map(|e| e.target)
            .collect();
        for &el in &revealed {
            self.observer.unobserve(el);
            doc.add_class(el, REVEAL_CLASS);
        }
        revealed
    }

    pub fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}
