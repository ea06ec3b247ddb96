//! Keyboard Navigation
//!
//! Document-level key handling: Escape, Tab visibility, activation keys,
//! arrow keys in menus and tablists, Home/End in composite widgets.

use lantern_dom::{Document, Key, KeyboardEvent, NodeId};

use crate::{A11yLabels, INTERACTIVE_SELECTOR};

const MENU_SELECTOR: &str = "[role=\"menu\"], [role=\"menubar\"]";
const MENU_ITEM_SELECTOR: &str = "[role=\"menuitem\"]";
const TABLIST_SELECTOR: &str = "[role=\"tablist\"]";
const TAB_SELECTOR: &str = "[role=\"tab\"]";
const COMPOSITE_SELECTOR: &str = "[role=\"menu\"], [role=\"tablist\"], [role=\"listbox\"]";
const COMPOSITE_ITEM_SELECTOR: &str = "[role=\"menuitem\"], [role=\"tab\"], [role=\"option\"]";

/// Dispatch a keydown on key identity
pub(crate) fn handle_key(doc: &mut Document, event: &mut KeyboardEvent, labels: &A11yLabels) {
    match event.key {
        Key::Escape => handle_escape(doc, event, labels),
        Key::Tab => handle_tab(doc, event),
        Key::Enter | Key::Space => handle_activation(doc, event),
        Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
            handle_arrows(doc, event)
        }
        Key::Home | Key::End => handle_home_end(doc, event),
        Key::Other(_) => {}
    }
}

fn handle_escape(doc: &mut Document, event: &mut KeyboardEvent, labels: &A11yLabels) {
    if let Some(sidebar) = doc.query_selector(".VPSidebar.open") {
        let close = format!("[aria-label=\"{}\"]", labels.close_sidebar);
        match doc.query_selector_in(sidebar, &close) {
            Some(button) => doc.click(button),
            None => doc.remove_class(sidebar, "open"),
        }
        event.prevent_default();
    }

    if let Some(search) = doc.query_selector("[role=\"search\"]")
        && doc
            .active_element()
            .is_some_and(|active| doc.contains(search, active))
    {
        doc.blur();
        event.prevent_default();
    }
}

/// Move off an invisible focus target in the Tab direction. Stops at the
/// ends of the document instead of wrapping.
fn handle_tab(doc: &mut Document, event: &mut KeyboardEvent) {
    if event.default_prevented() {
        return;
    }
    let Some(active) = doc.active_element() else {
        return;
    };
    let focusable = doc.focusable_elements(doc.tree().root());
    let Some(index) = focusable.iter().position(|&n| n == active) else {
        return;
    };
    if doc.is_visible(active) {
        return;
    }

    event.prevent_default();
    let next = if event.shift {
        focusable[..index]
            .iter()
            .rev()
            .copied()
            .find(|&n| doc.is_visible(n))
    } else {
        focusable[index + 1..]
            .iter()
            .copied()
            .find(|&n| doc.is_visible(n))
    };
    if let Some(next) = next {
        doc.focus(next);
    }
}

fn handle_activation(doc: &mut Document, event: &mut KeyboardEvent) {
    let target = event.target;
    let Some(tag) = doc.tag(target) else {
        return;
    };

    let role_button = doc.attr(target, "role") == Some("button") && tag != "button";
    if role_button || doc.matches(target, INTERACTIVE_SELECTOR) {
        doc.click(target);
        event.prevent_default();
    }

    if let Some(expanded) = doc.attr(target, "aria-expanded") {
        let toggled = if expanded == "true" { "false" } else { "true" };
        doc.set_attr(target, "aria-expanded", toggled);
        event.prevent_default();
    }
}

/// `(items, index of target)` for a target inside a composite widget
fn siblings(
    doc: &Document,
    target: NodeId,
    container: &str,
    item: &str,
) -> Option<(Vec<NodeId>, usize)> {
    if !doc.matches(target, item) {
        return None;
    }
    let items = match doc.closest(target, container) {
        Some(scope) => doc.query_selector_all_in(scope, item),
        None => doc.query_selector_all(item),
    };
    let index = items.iter().position(|&n| n == target)?;
    Some((items, index))
}

fn handle_arrows(doc: &mut Document, event: &mut KeyboardEvent) {
    let target = event.target;

    if let Some((items, index)) = siblings(doc, target, MENU_SELECTOR, MENU_ITEM_SELECTOR) {
        let len = items.len();
        let next = match event.key {
            Key::ArrowDown => Some((index + 1) % len),
            Key::ArrowUp => Some((index + len - 1) % len),
            _ => None,
        };
        if let Some(next) = next {
            doc.focus(items[next]);
            event.prevent_default();
        }
        return;
    }

    if let Some((tabs, index)) = siblings(doc, target, TABLIST_SELECTOR, TAB_SELECTOR) {
        let len = tabs.len();
        let next = match event.key {
            Key::ArrowRight => Some((index + 1) % len),
            Key::ArrowLeft => Some((index + len - 1) % len),
            _ => None,
        };
        if let Some(next) = next {
            let tab = tabs[next];
            doc.focus(tab);
            doc.click(tab);
            event.prevent_default();
        }
    }
}

fn handle_home_end(doc: &mut Document, event: &mut KeyboardEvent) {
    let Some(container) = doc.closest(event.target, COMPOSITE_SELECTOR) else {
        return;
    };
    let items = doc.query_selector_all_in(container, COMPOSITE_ITEM_SELECTOR);
    let item = match event.key {
        Key::Home => items.first(),
        _ => items.last(),
    };
    if let Some(&item) = item {
        doc.focus(item);
        event.prevent_default();
    }
}

/// Give button-like markup a keyboard contract
pub(crate) fn wire_interactive(doc: &mut Document, el: NodeId) {
    if !doc.has_attr(el, "tabindex") {
        doc.set_attr(el, "tabindex", "0");
    }
    if !doc.has_attr(el, "role") {
        doc.set_attr(el, "role", "button");
    }
}

pub(crate) fn wire_all_interactive(doc: &mut Document) {
    for el in doc.query_selector_all(INTERACTIVE_SELECTOR) {
        wire_interactive(doc, el);
    }
}

/// Order the main navigation right after the skip link
pub(crate) fn setup_tab_order(doc: &mut Document) {
    let Some(nav) = doc.query_selector(".VPNav") else {
        return;
    };
    for (index, link) in doc
        .query_selector_all_in(nav, "a, button")
        .into_iter()
        .enumerate()
    {
        doc.set_attr(link, "tabindex", &(index + 2).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_dom::{ComputedStyle, SyntheticEvent};
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    fn parse(html: &str) -> Document {
        HtmlParser::new().parse(html).unwrap()
    }

    fn press(doc: &mut Document, key: Key, target: NodeId) -> KeyboardEvent {
        let mut event = KeyboardEvent::new(key, target);
        handle_key(doc, &mut event, &A11yLabels::default());
        event
    }

    #[test]
    fn test_escape_closes_sidebar() {
        let mut doc = parse(
            "<body><aside class=\"VPSidebar open\"><button aria-label=\"关闭侧边栏\">x</button></aside></body>",
        );
        let button = doc.query_selector("button").unwrap();
        let body = doc.body();
        let event = press(&mut doc, Key::Escape, body);
        assert!(event.default_prevented());
        assert_eq!(doc.events(), &[SyntheticEvent::Click(button)]);
    }

    #[test]
    fn test_escape_without_button_removes_open() {
        let mut doc = parse("<body><aside class=\"VPSidebar open\"></aside></body>");
        let body = doc.body();
        press(&mut doc, Key::Escape, body);
        let sidebar = doc.query_selector(".VPSidebar").unwrap();
        assert!(!doc.has_class(sidebar, "open"));
    }

    #[test]
    fn test_escape_blurs_search() {
        let mut doc = parse("<body><div role=\"search\"><input type=\"search\"></div></body>");
        let input = doc.query_selector("input").unwrap();
        doc.focus(input);
        press(&mut doc, Key::Escape, input);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_tab_skips_hidden_focus() {
        let mut doc = parse(
            "<body><button id=\"a\">a</button><button id=\"b\">b</button>\
             <button id=\"c\">c</button></body>",
        );
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let c = doc.get_element_by_id("c").unwrap();
        doc.set_style(b, ComputedStyle::hidden());

        doc.focus(b);
        let event = press(&mut doc, Key::Tab, b);
        assert!(event.default_prevented());
        assert_eq!(doc.active_element(), Some(c));

        doc.focus(b);
        let mut back = KeyboardEvent::new(Key::Tab, b).with_shift(true);
        handle_key(&mut doc, &mut back, &A11yLabels::default());
        assert_eq!(doc.active_element(), Some(a));

        doc.focus(a);
        let event = press(&mut doc, Key::Tab, a);
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_activation_clicks_once_and_toggles() {
        let mut doc = parse(
            "<body><div class=\"VPButton\" role=\"button\">go</div>\
             <button aria-expanded=\"false\">menu</button></body>",
        );
        let fake = doc.query_selector(".VPButton").unwrap();
        let native = doc.query_selector("button").unwrap();

        press(&mut doc, Key::Enter, fake);
        assert_eq!(doc.take_events(), vec![SyntheticEvent::Click(fake)]);

        let event = press(&mut doc, Key::Space, native);
        assert!(event.default_prevented());
        assert!(doc.take_events().is_empty());
        assert_eq!(doc.attr(native, "aria-expanded"), Some("true"));
    }

    #[test]
    fn test_menu_and_tab_arrows() {
        let mut doc = parse(
            "<body><ul role=\"menu\"><li role=\"menuitem\">1</li><li role=\"menuitem\">2</li></ul>\
             <div role=\"tablist\"><span role=\"tab\">a</span><span role=\"tab\">b</span>\
             <span role=\"tab\">c</span></div></body>",
        );
        let items = doc.query_selector_all("[role=\"menuitem\"]");
        let tabs = doc.query_selector_all("[role=\"tab\"]");

        press(&mut doc, Key::ArrowUp, items[0]);
        assert_eq!(doc.active_element(), Some(items[1]));
        assert!(doc.take_events().is_empty());

        press(&mut doc, Key::ArrowLeft, tabs[0]);
        assert_eq!(doc.active_element(), Some(tabs[2]));
        assert_eq!(doc.take_events(), vec![SyntheticEvent::Click(tabs[2])]);

        press(&mut doc, Key::End, tabs[0]);
        assert_eq!(doc.active_element(), Some(tabs[2]));
        press(&mut doc, Key::Home, items[1]);
        assert_eq!(doc.active_element(), Some(items[0]));
    }

    #[test]
    fn test_listbox_home_end() {
        let mut doc = parse(
            "<body><ul role=\"listbox\"><li role=\"option\">a</li><li role=\"option\">b</li>\
             <li role=\"option\">c</li></ul></body>",
        );
        let options = doc.query_selector_all("[role=\"option\"]");

        let event = press(&mut doc, Key::End, options[0]);
        assert_eq!(doc.active_element(), Some(options[2]));
        assert!(event.default_prevented());

        let event = press(&mut doc, Key::Home, options[2]);
        assert_eq!(doc.active_element(), Some(options[0]));
        assert!(event.default_prevented());
    }

    #[test]
    fn test_home_outside_composite_keeps_focus() {
        let mut doc = parse("<body><a href=\"/a\">a</a><button>b</button></body>");
        let link = doc.query_selector("a").unwrap();
        let button = doc.query_selector("button").unwrap();
        doc.focus(button);

        let event = press(&mut doc, Key::Home, link);
        assert_eq!(doc.active_element(), Some(button));
        assert!(!event.default_prevented());
        let event = press(&mut doc, Key::End, button);
        assert_eq!(doc.active_element(), Some(button));
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_wiring_and_tab_order() {
        let mut doc = parse(
            "<body><nav class=\"VPNav\"><a href=\"/\">home</a><button>theme</button></nav>\
             <div class=\"VPFeature\">f</div><div onclick=\"go()\" role=\"link\">x</div></body>",
        );
        wire_all_interactive(&mut doc);
        setup_tab_order(&mut doc);

        let feature = doc.query_selector(".VPFeature").unwrap();
        let onclick = doc.query_selector("[onclick]").unwrap();
        assert_eq!(doc.attr(feature, "tabindex"), Some("0"));
        assert_eq!(doc.attr(feature, "role"), Some("button"));
        assert_eq!(doc.attr(onclick, "role"), Some("link"));

        let nav = doc.query_selector_all(".VPNav a, .VPNav button");
        assert_eq!(doc.attr(nav[0], "tabindex"), Some("2"));
        assert_eq!(doc.attr(nav[1], "tabindex"), Some("3"));
    }
}
