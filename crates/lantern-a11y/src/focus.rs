//! Focus Management
//!
//! Input-method detection, focus indicators, focus traps and the focus
//! move that follows client-side navigation.

use lantern_dom::{Document, KeyboardEvent, NodeId};
use serde::Serialize;

use crate::MAIN_REGION_SELECTOR;

/// How the user is currently driving focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    Keyboard,
    Mouse,
}

impl InputMethod {
    /// Marker class on the document root
    pub fn class_name(&self) -> &'static str {
        match self {
            InputMethod::Keyboard => "keyboard-user",
            InputMethod::Mouse => "mouse-user",
        }
    }

    fn other(&self) -> InputMethod {
        match self {
            InputMethod::Keyboard => InputMethod::Mouse,
            InputMethod::Mouse => InputMethod::Keyboard,
        }
    }
}

/// Reflect the input method as exactly one marker class on `<html>`
pub(crate) fn apply_input_method(doc: &mut Document, method: InputMethod) {
    let root = doc.document_element();
    doc.remove_class(root, method.other().class_name());
    doc.add_class(root, method.class_name());
}

const FOCUS_STYLES_MARKER: &str = "data-lantern-focus-styles";

const FOCUS_STYLES: &str = r#"
*:focus-visible {
  outline: 3px solid var(--ln-primary, #1a73e8) !important;
  outline-offset: 2px !important;
  border-radius: 2px !important;
}
.keyboard-user *:focus {
  outline: 3px solid var(--ln-primary, #1a73e8) !important;
  outline-offset: 2px !important;
}
.mouse-user *:focus {
  outline: none !important;
}
.skip-link {
  position: absolute;
  top: -40px;
  left: 6px;
  background: var(--vp-c-bg);
  color: var(--vp-c-text-1);
  padding: 8px 16px;
  text-decoration: none;
  border-radius: 4px;
  border: 2px solid var(--ln-primary, #1a73e8);
  z-index: 1000;
  transition: top 0.2s ease;
}
.skip-link:focus {
  top: 6px;
}
"#;

/// Install the focus-indicator stylesheet once; returns false if it was
/// already present or there is no `<head>`
pub(crate) fn install_focus_styles(doc: &mut Document) -> bool {
    let head = doc.head();
    if !head.is_valid() || doc.query_selector(&format!("style[{FOCUS_STYLES_MARKER}]")).is_some() {
        return false;
    }
    let style = doc.create_element("style");
    doc.set_attr(style, FOCUS_STYLES_MARKER, "");
    doc.set_text_content(style, FOCUS_STYLES);
    doc.append_child(head, style).is_ok()
}

/// Keep Tab focus cycling inside the nearest `[data-focus-trap]` ancestor.
///
/// The trap's focusable descendants are queried at every keypress, so
/// content added or removed since setup is honored. Returns true when the
/// event was handled.
pub(crate) fn handle_trap_tab(doc: &mut Document, event: &mut KeyboardEvent) -> bool {
    let origin = doc.active_element().unwrap_or(event.target);
    let Some(container) = doc.closest(origin, "[data-focus-trap]") else {
        return false;
    };
    let items = doc.focusable_elements(container);
    event.prevent_default();
    if items.is_empty() {
        return true;
    }

    let len = items.len();
    let position = items.iter().position(|&n| n == origin);
    let next = match (position, event.shift) {
        (Some(i), false) => items[(i + 1) % len],
        (Some(i), true) => items[(i + len - 1) % len],
        (None, false) => items[0],
        (None, true) => items[len - 1],
    };
    doc.focus(next);
    true
}

/// Does a click on `target` look like client-side navigation?
pub(crate) fn is_route_link(doc: &Document, target: NodeId) -> bool {
    doc.closest(target, "a[href^=\"/\"], a[href^=\"./\"], a[href^=\"../\"]")
        .is_some()
}

pub(crate) fn main_region(doc: &Document) -> Option<NodeId> {
    doc.query_selector(MAIN_REGION_SELECTOR)
}

/// Focus the main region. Returns the region when a temporary
/// `tabindex=-1` was added that must be removed later.
pub(crate) fn focus_main_region(doc: &mut Document) -> Option<NodeId> {
    let main = main_region(doc)?;
    let temporary = !doc.has_attr(main, "tabindex");
    if temporary {
        doc.set_attr(main, "tabindex", "-1");
    }
    doc.focus(main);
    tracing::debug!(?main, "focus moved to main content");
    temporary.then_some(main)
}
