//! Document - High-level document API
//!
//! Wraps the arena tree with everything page scripts expect from
//! `document`: selectors, attribute and class edits that notify mutation
//! observers, focus, ready state and the document timeline.

use url::Url;

use crate::observer::MutationObservers;
use crate::{
    ComputedStyle, DOMRect, DomError, DomTree, ElementData, MutationObserverInit, MutationRecord,
    Node, NodeId, ObserverId, Selector, SyntheticEvent, TokenList, FOCUSABLE_SELECTOR,
};

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_loading(self) -> bool {
        self == ReadyState::Loading
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    url: String,
    base: Option<Url>,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    ready_state: ReadyState,
    active_element: Option<NodeId>,
    /// Document timeline in milliseconds
    now_ms: f64,
    observers: MutationObservers,
    events: Vec<SyntheticEvent>,
}

impl Document {
    /// Create a new document with `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let root = tree.root();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        for (parent, child) in [(root, html), (html, head), (html, body)] {
            if let Err(e) = tree.append_child(parent, child) {
                tracing::error!(error = %e, "document skeleton not built");
            }
        }
        Self::from_tree(tree, url)
    }

    /// Adopt an already built tree, locating `<html>`, `<head>` and `<body>`
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let find_child = |parent: NodeId, tag: &str| {
            tree.children(parent).find(|&c| {
                tree.get(c)
                    .and_then(Node::as_element)
                    .is_some_and(|e| e.tag() == tag)
            })
        };
        let html = find_child(tree.root(), "html").unwrap_or(NodeId::NONE);
        let head = find_child(html, "head").unwrap_or(NodeId::NONE);
        let body = find_child(html, "body").unwrap_or(NodeId::NONE);

        Self {
            url: url.to_string(),
            base: Url::parse(url).ok(),
            html_element: html,
            head_element: head,
            body_element: body,
            tree,
            ready_state: ReadyState::Loading,
            active_element: None,
            now_ms: 0.0,
            observers: MutationObservers::default(),
            events: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed document URL, if it is absolute
    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Resolve an `href` against the document URL
    pub fn resolve_url(&self, href: &str) -> Option<Url> {
        match &self.base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// `<html>`
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        tracing::debug!(?state, "ready state changed");
        self.ready_state = state;
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Move the timeline forward
    pub fn advance_time(&mut self, ms: f64) {
        self.now_ms += ms.max(0.0);
    }

    // ---- node access ----

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.get(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.tree.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    /// Parent, if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.children(id)
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.children(id).filter(|&c| self.is_element(c)).collect()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.tree.children(id).next()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)
            .map(|n| n.prev_sibling)
            .filter(|p| p.is_valid())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)
            .map(|n| n.next_sibling)
            .filter(|n| n.is_valid())
    }

    /// All descendants in tree order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.descendants(id)
    }

    /// Inclusive containment
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    /// Attached to this document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.contains(self.tree.root(), id)
    }

    // ---- attributes ----

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute. Non-elements are ignored.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let old = el.set_attr(name, value);
        self.queue(MutationRecord::attribute(id, name, old));
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        let old = self.element_mut(id)?.remove_attr(name)?;
        self.queue(MutationRecord::attribute(id, name, Some(old.clone())));
        Some(old)
    }

    /// `id` attribute
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.element(id)?.id()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.element_id(n) == Some(id))
    }

    /// Token list of a space-separated attribute
    pub fn token_list(&self, id: NodeId, name: &str) -> TokenList {
        TokenList::parse(self.attr(id, name).unwrap_or_default())
    }

    fn set_token_list(&mut self, id: NodeId, name: &str, list: &TokenList) {
        self.set_attr(id, name, &list.to_string());
    }

    // ---- classes ----

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let mut list = self.token_list(id, "class");
        if list.add(class) {
            self.set_token_list(id, "class", &list);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let mut list = self.token_list(id, "class");
        if list.remove(class) {
            self.set_token_list(id, "class", &list);
        }
    }

    /// `classList.toggle(class, force)`; returns the final state
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: Option<bool>) -> bool {
        let mut list = self.token_list(id, "class");
        let before = list.clone();
        let state = list.toggle(class, force);
        if list != before {
            self.set_token_list(id, "class", &list);
        }
        state
    }

    // ---- text ----

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.tree.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.tree
            .descendants(id)
            .into_iter()
            .filter_map(|n| self.tree.get(n).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if !self.is_element(id) {
            return;
        }
        let removed: Vec<NodeId> = self.tree.children(id).collect();
        for &child in &removed {
            self.tree.detach(child);
        }
        let mut added = Vec::new();
        if !text.is_empty() {
            let node = self.tree.create_text(text);
            if self.tree.append_child(id, node).is_ok() {
                added.push(node);
            }
        }
        if !added.is_empty() || !removed.is_empty() {
            self.queue(MutationRecord::child_list(id, added, removed));
        }
    }

    // ---- structure ----

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let first = self.first_child(parent);
        self.insert_before(parent, child, first)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let old_parent = self.tree.parent(child);
        self.tree.insert_before(parent, child, reference)?;
        if let Some(old) = old_parent.filter(|&p| p != parent) {
            self.queue(MutationRecord::child_list(old, Vec::new(), vec![child]));
        }
        self.queue(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Detach a node from its parent
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.tree.parent(id) else {
            return;
        };
        if self.active_element.is_some_and(|a| self.tree.contains(id, a)) {
            self.active_element = None;
        }
        self.tree.detach(id);
        self.queue(MutationRecord::child_list(parent, Vec::new(), vec![id]));
    }

    // ---- selectors ----

    /// Does the element match `selector`? Invalid selectors never match.
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        self.parse_selector(selector)
            .is_some_and(|s| s.matches(&self.tree, id))
    }

    /// Nearest inclusive ancestor matching `selector`
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        let selector = self.parse_selector(selector)?;
        let mut current = Some(id).filter(|&n| self.is_element(n));
        while let Some(node) = current {
            if selector.matches(&self.tree, node) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_selector_all_in(self.tree.root(), selector)
    }

    pub fn query_selector_in(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_selector_all_in(scope, selector).into_iter().next()
    }

    /// Matching descendants of `scope` in tree order
    pub fn query_selector_all_in(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        match self.parse_selector(selector) {
            Some(s) => self.select_all(scope, &s),
            None => Vec::new(),
        }
    }

    /// Like `query_selector_all_in`, with a pre-parsed selector
    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.tree
            .descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(&self.tree, n))
            .collect()
    }

    fn parse_selector(&self, selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    // ---- geometry and style ----

    pub fn rect(&self, id: NodeId) -> Option<DOMRect> {
        self.element(id)?.rect
    }

    /// Report layout geometry for an element
    pub fn set_rect(&mut self, id: NodeId, rect: Option<DOMRect>) {
        if let Some(el) = self.element_mut(id) {
            el.rect = rect;
        }
    }

    pub fn style(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.element(id).map(|e| &e.style)
    }

    /// Report resolved style for an element
    pub fn set_style(&mut self, id: NodeId, style: ComputedStyle) {
        if let Some(el) = self.element_mut(id) {
            el.style = style;
        }
    }

    /// Rendered and perceivable: not `display:none` (self or ancestor),
    /// not `visibility:hidden`, not fully transparent, and not zero-sized.
    /// Elements without reported geometry count as sized.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.rect.is_some_and(|r| r.is_empty()) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(e) = self.element(node)
                && !e.style.is_painted()
            {
                return false;
            }
            current = self.parent_element(node);
        }
        true
    }

    // ---- focus ----

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Move focus to an attached element; returns false otherwise
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) {
            return false;
        }
        self.active_element = Some(id);
        true
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    /// Sequentially focusable descendants of `scope`, in tree order
    pub fn focusable_elements(&self, scope: NodeId) -> Vec<NodeId> {
        self.query_selector_all_in(scope, FOCUSABLE_SELECTOR)
    }

    /// `tabindex` as an integer
    pub fn tab_index(&self, id: NodeId) -> Option<i32> {
        self.attr(id, "tabindex")?.trim().parse().ok()
    }

    /// Default Tab behavior: focus the next (or previous) visible
    /// focusable element, wrapping at the ends. Positive `tabindex`
    /// values come first, in ascending order.
    pub fn focus_next_sequential(&mut self, backwards: bool) -> Option<NodeId> {
        let mut candidates: Vec<NodeId> = self
            .focusable_elements(self.tree.root())
            .into_iter()
            .filter(|&n| self.is_visible(n))
            .collect();
        candidates.sort_by_key(|&n| match self.tab_index(n) {
            Some(t) if t > 0 => (0, t),
            _ => (1, 0),
        });
        if candidates.is_empty() {
            return None;
        }
        let position = self
            .active_element
            .and_then(|a| candidates.iter().position(|&c| c == a));
        let len = candidates.len();
        let index = match (position, backwards) {
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
            (None, false) => 0,
            (None, true) => len - 1,
        };
        let next = candidates[index];
        self.focus(next);
        Some(next)
    }

    // ---- events ----

    /// `element.click()`
    pub fn click(&mut self, id: NodeId) {
        tracing::trace!(?id, "click dispatched");
        self.events.push(SyntheticEvent::Click(id));
    }

    /// Dispatch a custom event on the window
    pub fn dispatch_custom(&mut self, name: &str, detail: &str) {
        self.events.push(SyntheticEvent::Custom {
            name: name.to_string(),
            detail: detail.to_string(),
        });
    }

    /// Events dispatched so far
    pub fn events(&self) -> &[SyntheticEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SyntheticEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- mutation observers ----

    pub fn observe_mutations(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.observers.observe(target, options)
    }

    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    pub fn is_observer_active(&self, id: ObserverId) -> bool {
        self.observers.is_active(id)
    }

    /// Take the records queued for one observer
    pub fn take_mutation_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(id)
    }

    fn queue(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.queue(&self.tree, record);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationType;
    use pretty_assertions::assert_eq;

    fn doc_with_list() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new("https://docs.example.com/guide/");
        let ul = doc.create_element("ul");
        doc.append_child(doc.body(), ul).unwrap();
        let items: Vec<NodeId> = (0..3)
            .map(|i| {
                let li = doc.create_element("li");
                let a = doc.create_element("a");
                doc.set_attr(a, "href", &format!("/page-{i}"));
                doc.append_child(li, a).unwrap();
                doc.append_child(ul, li).unwrap();
                a
            })
            .collect();
        (doc, ul, items)
    }

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new("about:blank");
        assert_eq!(doc.tag(doc.document_element()), Some("html"));
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert!(doc.ready_state().is_loading());
    }

    #[test]
    fn test_class_edits() {
        let mut doc = Document::default();
        let html = doc.document_element();
        doc.add_class(html, "keyboard-user");
        doc.add_class(html, "keyboard-user");
        assert_eq!(doc.attr(html, "class"), Some("keyboard-user"));
        assert!(doc.toggle_class(html, "mouse-user", Some(true)));
        doc.remove_class(html, "keyboard-user");
        assert_eq!(doc.attr(html, "class"), Some("mouse-user"));
    }

    #[test]
    fn test_query_and_closest() {
        let (doc, ul, links) = doc_with_list();
        assert_eq!(doc.query_selector_all("ul a[href^=\"/\"]"), links);
        assert_eq!(doc.closest(links[1], "ul"), Some(ul));
        assert_eq!(doc.closest(links[1], "nav"), None);
        assert!(doc.query_selector_all("a[").is_empty());
    }

    #[test]
    fn test_text_content() {
        let mut doc = Document::default();
        let p = doc.create_element("p");
        doc.append_child(doc.body(), p).unwrap();
        doc.set_text_content(p, "Hello ");
        let b = doc.create_element("b");
        let t = doc.create_text("world");
        doc.append_child(b, t).unwrap();
        doc.append_child(p, b).unwrap();
        assert_eq!(doc.text_content(p), "Hello world");
    }

    #[test]
    fn test_mutation_records_for_insertions() {
        let (mut doc, ul, _) = doc_with_list();
        let observer = doc.observe_mutations(doc.body(), MutationObserverInit::child_list_subtree());
        let li = doc.create_element("li");
        doc.append_child(ul, li).unwrap();
        doc.set_attr(li, "class", "new");

        let records = doc.take_mutation_records(observer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mutation_type, MutationType::ChildList);
        assert_eq!(records[0].added_nodes, vec![li]);
        assert!(doc.take_mutation_records(observer).is_empty());
    }

    #[test]
    fn test_visibility() {
        let (mut doc, ul, links) = doc_with_list();
        assert!(doc.is_visible(links[0]));
        doc.set_style(ul, ComputedStyle::hidden());
        assert!(!doc.is_visible(links[0]));
        doc.set_style(ul, ComputedStyle::default());
        doc.set_rect(links[0], Some(DOMRect::from_xywh(0.0, 0.0, 0.0, 10.0)));
        assert!(!doc.is_visible(links[0]));
    }

    #[test]
    fn test_sequential_focus_wraps() {
        let (mut doc, _, links) = doc_with_list();
        assert_eq!(doc.focus_next_sequential(false), Some(links[0]));
        assert_eq!(doc.focus_next_sequential(true), Some(links[2]));
        assert_eq!(doc.focus_next_sequential(false), Some(links[0]));
    }

    #[test]
    fn test_remove_clears_focus() {
        let (mut doc, ul, links) = doc_with_list();
        doc.focus(links[1]);
        doc.remove(ul);
        assert_eq!(doc.active_element(), None);
        assert!(!doc.focus(links[1]));
    }

    #[test]
    fn test_resolve_url() {
        let doc = Document::new("https://docs.example.com/guide/intro");
        let url = doc.resolve_url("../api/").unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/api/");
    }
}
