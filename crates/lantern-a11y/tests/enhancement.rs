//! End-to-end tests for lantern-a11y
//!
//! Parses whole pages, mounts a manager and drives it the way a host would.

use lantern_a11y::{A11yConfig, AccessibilityManager, InputMethod, LifecycleState, Priority};
use lantern_dom::{ComputedStyle, Document, Environment, Key, KeyboardEvent, SyntheticEvent};
use lantern_html::HtmlParser;
use pretty_assertions::assert_eq;

fn mount(html: &str, env: &Environment) -> (Document, AccessibilityManager) {
    let mut doc = HtmlParser::new()
        .parse_with_url(html, "https://docs.lantern.dev/guide/")
        .unwrap();
    let manager = AccessibilityManager::new(A11yConfig::default(), &mut doc, env).unwrap();
    (doc, manager)
}

fn tab(doc: &mut Document, manager: &mut AccessibilityManager, shift: bool) -> KeyboardEvent {
    let target = doc.active_element().unwrap_or(doc.body());
    let mut event = KeyboardEvent::new(Key::Tab, target).with_shift(shift);
    manager.handle_key_down(doc, &mut event);
    event
}

// ============================================================================
// FOCUS TRAPS AND INPUT METHOD
// ============================================================================

#[test]
fn test_focus_never_leaves_trap() {
    let (mut doc, mut m) = mount(
        "<body><a href=\"/before\">before</a>\
         <div class=\"modal\" data-focus-trap><button>ok</button><button>cancel</button></div>\
         <a href=\"/after\">after</a></body>",
        &Environment::default(),
    );
    let buttons = doc.query_selector_all(".modal button");
    doc.focus(buttons[0]);

    for _ in 0..5 {
        let event = tab(&mut doc, &mut m, false);
        assert!(event.default_prevented());
        let active = doc.active_element().unwrap();
        assert!(buttons.contains(&active));
    }
    assert_eq!(doc.active_element(), Some(buttons[1]));

    tab(&mut doc, &mut m, true);
    assert_eq!(doc.active_element(), Some(buttons[0]));
    tab(&mut doc, &mut m, true);
    assert_eq!(doc.active_element(), Some(buttons[1]));
}

#[test]
fn test_input_method_markers_are_exclusive() {
    let (mut doc, mut m) = mount("<body><button>b</button></body>", &Environment::default());
    let root = doc.document_element();

    tab(&mut doc, &mut m, false);
    assert_eq!(m.input_method(), Some(InputMethod::Keyboard));
    assert!(doc.has_class(root, "keyboard-user"));
    assert!(!doc.has_class(root, "mouse-user"));

    m.handle_pointer_down(&mut doc);
    assert_eq!(m.input_method(), Some(InputMethod::Mouse));
    assert!(doc.has_class(root, "mouse-user"));
    assert!(!doc.has_class(root, "keyboard-user"));

    tab(&mut doc, &mut m, true);
    assert!(doc.has_class(root, "keyboard-user"));
    assert!(!doc.has_class(root, "mouse-user"));
}

#[test]
fn test_hidden_focus_moves_forward() {
    let (mut doc, mut m) = mount(
        "<body><button id=\"a\">a</button><button id=\"b\">b</button><button id=\"c\">c</button></body>",
        &Environment::default(),
    );
    let b = doc.get_element_by_id("b").unwrap();
    let c = doc.get_element_by_id("c").unwrap();
    doc.set_style(
        b,
        ComputedStyle {
            opacity: 0.0,
            ..Default::default()
        },
    );
    doc.focus(b);

    let event = tab(&mut doc, &mut m, false);
    assert!(event.default_prevented());
    assert_eq!(doc.active_element(), Some(c));
}

// ============================================================================
// ANNOUNCEMENTS
// ============================================================================

#[test]
fn test_announce_clears_after_delay() {
    let (mut doc, mut m) = mount("<body><main>m</main></body>", &Environment::default());
    let region = m.announcer().unwrap();

    m.announce(&mut doc, "已复制", Priority::Assertive);
    assert_eq!(doc.text_content(region), "已复制");
    assert_eq!(doc.attr(region, "aria-live"), Some("assertive"));

    doc.advance_time(999.0);
    m.run_timers(&mut doc);
    assert_eq!(doc.text_content(region), "已复制");

    doc.advance_time(1.0);
    m.run_timers(&mut doc);
    assert_eq!(doc.text_content(region), "");
}

#[test]
fn test_second_announce_resets_timer() {
    let (mut doc, mut m) = mount("<body><main>m</main></body>", &Environment::default());
    let region = m.announcer().unwrap();

    m.announce(&mut doc, "first", Priority::Polite);
    doc.advance_time(600.0);
    m.run_timers(&mut doc);
    m.announce(&mut doc, "second", Priority::Polite);

    doc.advance_time(600.0);
    m.run_timers(&mut doc);
    assert_eq!(doc.text_content(region), "second");

    doc.advance_time(400.0);
    m.run_timers(&mut doc);
    assert_eq!(doc.text_content(region), "");
}

// ============================================================================
// AUDIT AND CONTRAST
// ============================================================================

#[test]
fn test_audit_heading_skip_and_missing_alt() {
    let (doc, m) = mount(
        "<body><main><h1>Title</h1><h3>Deep</h3><img src=\"shot.png\"></main></body>",
        &Environment::development(),
    );
    let report = m.run_audit(&doc).unwrap();

    assert_eq!(report.heading_skips.len(), 1);
    assert_eq!(report.images_missing_alt.len(), 1);
    assert_eq!(report.h1_count, 1);
    let h3 = report.heading_skips[0].element;
    assert_eq!(doc.tag(h3), Some("h3"));
    assert_eq!(doc.query_selector_all("h3").len(), 1);
}

#[test]
fn test_contrast_runs_only_in_development() {
    let html = "<body><p style=\"color: #999; background-color: #fff\">faint</p></body>";
    let parse = || {
        let mut doc = HtmlParser::new().parse(html).unwrap();
        lantern_html::apply_inline_styles(&mut doc);
        doc
    };

    let mut doc = parse();
    let prod = AccessibilityManager::new(A11yConfig::default(), &mut doc, &Environment::default())
        .unwrap();
    assert_eq!(prod.accessibility_report().total_issues, 0);

    let mut doc = parse();
    let dev =
        AccessibilityManager::new(A11yConfig::default(), &mut doc, &Environment::development())
            .unwrap();
    let report = dev.accessibility_report();
    assert_eq!(report.total_issues, 1);
    assert!(report.contrast_issues[0].ratio < 4.5);
}

#[test]
fn test_contrast_reads_background_shorthand() {
    let mut doc = HtmlParser::new()
        .parse(
            "<body><p style=\"color:#aaa; background:#fff url(bg.png) no-repeat\">faint</p>\
             <p style=\"color:#aaa; background-color:#fff\">faint2</p></body>",
        )
        .unwrap();
    lantern_html::apply_inline_styles(&mut doc);

    let manager =
        AccessibilityManager::new(A11yConfig::default(), &mut doc, &Environment::development())
            .unwrap();
    let report = manager.accessibility_report();
    assert_eq!(report.total_issues, 2);
    let texts: Vec<String> = report
        .contrast_issues
        .iter()
        .map(|issue| doc.text_content(issue.element))
        .collect();
    assert_eq!(texts, vec!["faint".to_string(), "faint2".to_string()]);
}

// ============================================================================
// LINKS AND ACTIVATION
// ============================================================================

#[test]
fn test_external_link_label_and_rel() {
    let (doc, _m) = mount(
        "<body><main><a href=\"https://github.com/lantern/issues\">Report</a></main></body>",
        &Environment::default(),
    );
    let link = doc.query_selector("main a").unwrap();
    assert_eq!(doc.attr(link, "aria-label"), Some("Report (在新标签页中打开)"));
    assert_eq!(doc.attr(link, "rel"), Some("noopener noreferrer"));
}

#[test]
fn test_feature_card_activates_once() {
    let (mut doc, mut m) = mount(
        "<body><div class=\"VPFeature\"><h2 class=\"title\">Fast</h2></div></body>",
        &Environment::default(),
    );
    let card = doc.query_selector(".VPFeature").unwrap();
    assert_eq!(doc.attr(card, "role"), Some("button"));
    doc.focus(card);

    let mut event = KeyboardEvent::new(Key::Enter, card);
    m.handle_key_down(&mut doc, &mut event);
    assert_eq!(doc.take_events(), vec![SyntheticEvent::Click(card)]);
}

#[test]
fn test_cleanup_restores_page() {
    let (mut doc, mut m) = mount("<body><main>m</main></body>", &Environment::default());
    assert_eq!(doc.query_selector_all(".skip-link, .sr-only").len(), 2);

    m.cleanup(&mut doc);
    assert_eq!(m.state(), LifecycleState::Disposed);
    assert!(doc.query_selector_all(".skip-link, .sr-only").is_empty());

    m.announce(&mut doc, "ignored", Priority::Polite);
    assert!(m.announcer().is_none());
}
