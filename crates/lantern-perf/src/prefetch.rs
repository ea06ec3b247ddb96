//! Link prefetching

use lantern_dom::{
    DOMRect, Document, IntersectionObserver, IntersectionObserverOptions, NodeId,
};

use crate::INTERNAL_LINK_SELECTOR;

/// Watches internal links and reports the ones that became visible
#[derive(Debug)]
pub(crate) struct LinkPrefetcher {
    observer: IntersectionObserver,
}

impl LinkPrefetcher {
    pub(crate) fn new(threshold: f64) -> Self {
        Self {
            observer: IntersectionObserver::new(IntersectionObserverOptions::new(threshold, "0px")),
        }
    }

    pub(crate) fn register(&mut self, doc: &Document) {
        for link in doc.query_selector_all(INTERNAL_LINK_SELECTOR) {
            self.observer.observe(link);
        }
    }

    /// Absolute hrefs of links that entered the viewport. Each link is
    /// reported once and then unobserved.
    pub(crate) fn check(&mut self, doc: &Document, viewport: DOMRect) -> Vec<String> {
        let entries = self.observer.check(doc.tree(), viewport, doc.now_ms());
        let mut hrefs = Vec::new();
        for entry in entries.into_iter().filter(|e| e.is_intersecting) {
            self.observer.unobserve(entry.target);
            if let Some(href) = absolute_href(doc, entry.target) {
                hrefs.push(href);
            }
        }
        hrefs
    }

    pub(crate) fn is_observing(&self, link: NodeId) -> bool {
        self.observer.is_observing(link)
    }

    pub(crate) fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

fn absolute_href(doc: &Document, link: NodeId) -> Option<String> {
    let href = doc.attr(link, "href")?;
    Some(
        doc.resolve_url(href)
            .map(|url| url.to_string())
            .unwrap_or_else(|| href.to_string()),
    )
}

/// Append `<link rel=prefetch as=document>` unless a link with this exact
/// `href` already exists
pub(crate) fn prefetch_link(doc: &mut Document, href: &str) -> Option<NodeId> {
    let exists = doc
        .query_selector_all("link[href]")
        .into_iter()
        .any(|l| doc.attr(l, "href") == Some(href));
    let head = doc.head();
    if exists || !head.is_valid() {
        return None;
    }

    let link = doc.create_element("link");
    doc.set_attr(link, "rel", "prefetch");
    doc.set_attr(link, "href", href);
    doc.set_attr(link, "as", "document");
    doc.append_child(head, link).ok()?;
    tracing::debug!(%href, "prefetch hint added");
    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_visible_internal_links_reported_once() {
        let mut doc = HtmlParser::new()
            .parse_with_url(
                "<body><a href=\"/guide/\">g</a><a href=\"../api/\">a</a>\
                 <a href=\"https://example.org/\">x</a></body>",
                "https://docs.lantern.dev/zh/intro/",
            )
            .unwrap();
        let links = doc.query_selector_all("a");
        doc.set_rect(links[0], Some(DOMRect::from_xywh(0.0, 10.0, 50.0, 20.0)));
        doc.set_rect(links[1], Some(DOMRect::from_xywh(0.0, 3000.0, 50.0, 20.0)));
        doc.set_rect(links[2], Some(DOMRect::from_xywh(0.0, 10.0, 50.0, 20.0)));

        let viewport = DOMRect::from_xywh(0.0, 0.0, 1280.0, 800.0);
        let mut prefetcher = LinkPrefetcher::new(0.1);
        prefetcher.register(&doc);
        assert!(!prefetcher.is_observing(links[2]));

        assert_eq!(
            prefetcher.check(&doc, viewport),
            vec!["https://docs.lantern.dev/guide/".to_string()]
        );
        assert!(prefetcher.check(&doc, viewport).is_empty());

        doc.set_rect(links[1], Some(DOMRect::from_xywh(0.0, 100.0, 50.0, 20.0)));
        assert_eq!(
            prefetcher.check(&doc, viewport),
            vec!["https://docs.lantern.dev/zh/api/".to_string()]
        );
    }

    #[test]
    fn test_prefetch_dedupes_by_href() {
        let mut doc = HtmlParser::new().parse("<html><head></head><body></body></html>").unwrap();
        let first = prefetch_link(&mut doc, "https://docs.lantern.dev/guide/").unwrap();
        assert_eq!(doc.attr(first, "as"), Some("document"));
        assert!(prefetch_link(&mut doc, "https://docs.lantern.dev/guide/").is_none());
        assert_eq!(doc.query_selector_all("link[rel=\"prefetch\"]").len(), 1);
    }
}
