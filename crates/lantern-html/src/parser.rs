//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the arena tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lantern_dom::{Document, DomTree, NodeId, ReadyState};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser {
    /// Keep comment nodes (dropped by default)
    keep_comments: bool,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert_node(&dom.document, &mut tree, root);

        let mut document = Document::from_tree(tree, url);
        if !document.body().is_valid() {
            return Err(HtmlError::MissingElement("body"));
        }
        // Parsing ran to the end of input
        document.set_ready_state(ReadyState::Complete);
        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom node into the arena under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
                return;
            }
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } if self.keep_comments => {
                tree.create_comment(contents)
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                if let Some(el) = tree.get_mut(id).and_then(|n| n.as_element_mut()) {
                    for attr in attrs.borrow().iter() {
                        el.set_attr(&attr.name.local, &attr.value);
                    }
                }
                id
            }
            // Doctype, processing instructions and dropped comments
            _ => return,
        };

        if let Err(e) = tree.append_child(parent, id) {
            tracing::warn!("Dropping node during conversion: {}", e);
            return;
        }

        if matches!(handle.data, RcNodeData::Element { .. }) {
            for child in handle.children.borrow().iter() {
                self.convert_node(child, tree, id);
            }
        }
    }
}
