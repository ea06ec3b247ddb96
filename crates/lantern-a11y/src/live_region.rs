//! Live Region Support
//!
//! One visually hidden announcer, created on first use and reused for
//! every announcement.

use lantern_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Politeness of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Polite,
    Assertive,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Polite => "polite",
            Priority::Assertive => "assertive",
        }
    }
}

const VISUALLY_HIDDEN: &str = "position: absolute !important; width: 1px !important; \
     height: 1px !important; padding: 0 !important; margin: -1px !important; \
     overflow: hidden !important; clip: rect(0, 0, 0, 0) !important; \
     white-space: nowrap !important; border: 0 !important;";

/// Screen-reader announcer element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Announcer {
    element: NodeId,
}

impl Announcer {
    /// Create the announcer under `<body>`. `None` when the document has no body.
    pub(crate) fn create(doc: &mut Document) -> Option<Self> {
        let body = doc.body();
        if !body.is_valid() {
            return None;
        }
        let element = doc.create_element("div");
        doc.set_attr(element, "aria-live", Priority::Polite.as_str());
        doc.set_attr(element, "aria-atomic", "true");
        doc.set_attr(element, "class", "sr-only");
        doc.set_attr(element, "style", VISUALLY_HIDDEN);
        doc.append_child(body, element).ok()?;
        tracing::debug!(?element, "live region created");
        Some(Self { element })
    }

    pub(crate) fn element(&self) -> NodeId {
        self.element
    }

    /// Set priority first, then the text
    pub(crate) fn announce(&self, doc: &mut Document, message: &str, priority: Priority) {
        doc.set_attr(self.element, "aria-live", priority.as_str());
        doc.set_text_content(self.element, message);
    }

    pub(crate) fn clear(&self, doc: &mut Document) {
        doc.set_text_content(self.element, "");
    }

    pub(crate) fn remove(self, doc: &mut Document) {
        doc.remove(self.element);
    }
}
