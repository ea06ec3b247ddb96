//! Accessibility Manager
//!
//! Runs the enhancement passes once the document is interactive and
//! routes host callbacks (keys, pointer, clicks, history, mutations and
//! timers) to the passes that need them.

use std::collections::HashSet;

use lantern_dom::{
    Document, Environment, Key, KeyboardEvent, MutationObserverInit, NodeId, ObserverId,
    TimerHandle, TimerQueue,
};
use serde::Serialize;

use crate::audit::{self, AuditReport};
use crate::config::A11yConfig;
use crate::contrast::{self, ContrastIssue};
use crate::focus::{self, InputMethod};
use crate::forms::{self, FormEnhancer};
use crate::keyboard_nav;
use crate::live_region::{Announcer, Priority};
use crate::navigation;
use crate::{A11yError, INTERACTIVE_SELECTOR, aria};

/// Where the manager is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Non-browser host; nothing is ever set up
    Inert,
    /// Waiting for the document to leave the loading state
    Pending,
    Active,
    /// Cleaned up; every call is a no-op
    Disposed,
}

/// Snapshot of accumulated issues
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessibilityReport {
    pub contrast_issues: Vec<ContrastIssue>,
    pub total_issues: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    ClearAnnouncement,
    FocusMain,
    RemoveTemporaryTabindex(NodeId),
}

/// Accessibility enhancement for one page
#[derive(Debug)]
pub struct AccessibilityManager {
    config: A11yConfig,
    state: LifecycleState,
    input_method: Option<InputMethod>,
    announcer: Option<Announcer>,
    skip_link: Option<NodeId>,
    forms: FormEnhancer,
    contrast_issues: Vec<ContrastIssue>,
    observer: Option<ObserverId>,
    timers: TimerQueue<Task>,
    clear_timer: Option<TimerHandle>,
    focus_timer: Option<TimerHandle>,
    temporary_tabindex: Option<NodeId>,
}

impl AccessibilityManager {
    /// Validate the config and set up, or wait for the document to finish
    /// loading. In a server host nothing beyond validation happens.
    pub fn new(config: A11yConfig, doc: &mut Document, env: &Environment) -> Result<Self, A11yError> {
        config.validate()?;
        let mut manager = Self {
            config,
            state: LifecycleState::Inert,
            input_method: None,
            announcer: None,
            skip_link: None,
            forms: FormEnhancer::new(),
            contrast_issues: Vec::new(),
            observer: None,
            timers: TimerQueue::new(),
            clear_timer: None,
            focus_timer: None,
            temporary_tabindex: None,
        };

        if !env.is_browser() {
            tracing::debug!("Non-browser host, accessibility enhancement disabled");
            return Ok(manager);
        }
        if doc.ready_state().is_loading() {
            manager.state = LifecycleState::Pending;
        } else {
            manager.setup(doc, env);
        }
        Ok(manager)
    }

    pub fn config(&self) -> &A11yConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn input_method(&self) -> Option<InputMethod> {
        self.input_method
    }

    fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    /// `DOMContentLoaded`: run setup deferred by a loading document
    pub fn on_ready_state_change(&mut self, doc: &mut Document, env: &Environment) {
        if self.state == LifecycleState::Pending && !doc.ready_state().is_loading() {
            self.setup(doc, env);
        }
    }

    fn setup(&mut self, doc: &mut Document, env: &Environment) {
        let _span = tracing::debug_span!("accessibility_setup").entered();
        let dev = env.is_development();

        if self.config.enable_keyboard_navigation {
            keyboard_nav::wire_all_interactive(doc);
            keyboard_nav::setup_tab_order(doc);
            tracing::debug!("keyboard navigation ready");
        }

        if self.config.enable_focus_management {
            focus::install_focus_styles(doc);
            tracing::debug!("focus management ready");
        }

        if self.config.enable_aria_support {
            let labels = &self.config.labels;
            aria::annotate_landmarks(doc, labels);
            aria::annotate_headings(doc);
            aria::annotate_images(doc);
            self.forms.enhance_forms(doc);
            self.ensure_announcer(doc);
            tracing::debug!("ARIA annotation done");
        }

        if self.config.enable_screen_reader_support {
            self.ensure_announcer(doc);
            aria::hide_visual_only(doc);
            aria::describe_features(doc, &self.config.labels);
            if env.capabilities.mutation_observer {
                let body = doc.body();
                self.observer =
                    Some(doc.observe_mutations(body, MutationObserverInit::child_list_subtree()));
            }
            tracing::debug!("screen reader support ready");
        }

        if self.config.enable_contrast_checking && dev {
            let issues = contrast::check_document(doc, self.config.contrast_threshold);
            self.contrast_issues.extend(issues);
        }

        if self.config.enable_accessibility_testing && dev {
            audit::run(doc, &self.contrast_issues);
        }

        self.skip_link = navigation::install_skip_link(doc, &self.config.skip_link_text);
        navigation::apply_language_attributes(doc);
        forms::enhance_search_inputs(doc, &self.config.labels);
        navigation::enhance_navigation_links(doc, &self.config.labels);

        self.state = LifecycleState::Active;
        tracing::debug!("accessibility enhancement active");
    }

    fn ensure_announcer(&mut self, doc: &mut Document) {
        if self.announcer.is_none() {
            self.announcer = Announcer::create(doc);
        }
    }

    /// Document-level keydown
    pub fn handle_key_down(&mut self, doc: &mut Document, event: &mut KeyboardEvent) {
        if !self.is_active() {
            return;
        }
        if self.config.enable_focus_management && event.key == Key::Tab {
            focus::handle_trap_tab(doc, event);
            self.set_input_method(doc, InputMethod::Keyboard);
        }
        if self.config.enable_keyboard_navigation {
            keyboard_nav::handle_key(doc, event, &self.config.labels);
        }
    }

    /// `mousedown` anywhere in the document
    pub fn handle_pointer_down(&mut self, doc: &mut Document) {
        if self.is_active() && self.config.enable_focus_management {
            self.set_input_method(doc, InputMethod::Mouse);
        }
    }

    fn set_input_method(&mut self, doc: &mut Document, method: InputMethod) {
        self.input_method = Some(method);
        focus::apply_input_method(doc, method);
    }

    /// Document-level click; relative links count as route changes
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId) {
        if self.is_active()
            && self.config.enable_focus_management
            && focus::is_route_link(doc, target)
        {
            self.schedule_navigation_focus(doc);
        }
    }

    /// `popstate`
    pub fn handle_history_pop(&mut self, doc: &mut Document) {
        if self.is_active() && self.config.enable_focus_management {
            self.schedule_navigation_focus(doc);
        }
    }

    fn schedule_navigation_focus(&mut self, doc: &Document) {
        if let Some(pending) = self.focus_timer.take() {
            self.timers.cancel(pending);
        }
        let delay = self.config.navigation_focus_delay_ms;
        self.focus_timer = Some(self.timers.schedule(doc.now_ms(), delay, Task::FocusMain));
    }

    /// Deliver queued mutation records as one batch
    pub fn process_mutations(&mut self, doc: &mut Document) {
        if !self.is_active() {
            return;
        }
        let Some(observer) = self.observer else {
            return;
        };
        let records = doc.take_mutation_records(observer);
        if records.is_empty() {
            return;
        }

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for record in &records {
            for &added in &record.added_nodes {
                if !doc.is_element(added) {
                    continue;
                }
                for node in std::iter::once(added).chain(doc.descendants(added)) {
                    if doc.is_element(node) && seen.insert(node) {
                        nodes.push(node);
                    }
                }
            }
        }
        tracing::trace!(records = records.len(), elements = nodes.len(), "mutation batch");

        for node in nodes {
            if doc.is_connected(node) {
                self.enhance_new_element(doc, node);
            }
        }
    }

    fn enhance_new_element(&mut self, doc: &mut Document, el: NodeId) {
        if doc.tag(el) == Some("img") && aria::lacks_alt(doc, el) {
            aria::annotate_image(doc, el);
        }
        if doc.matches(el, INTERACTIVE_SELECTOR) {
            keyboard_nav::wire_interactive(doc, el);
        }
        if doc.matches(el, "input, select, textarea") {
            self.forms.enhance_control(doc, el);
        }
    }

    /// Milliseconds until the next timer is due
    pub fn next_timer_in(&self, doc: &Document) -> Option<f64> {
        self.timers.time_until_next(doc.now_ms())
    }

    /// Fire every timer due at the document's current time
    pub fn run_timers(&mut self, doc: &mut Document) {
        for task in self.timers.take_due(doc.now_ms()) {
            match task {
                Task::ClearAnnouncement => {
                    self.clear_timer = None;
                    if let Some(announcer) = self.announcer {
                        announcer.clear(doc);
                    }
                }
                Task::FocusMain => {
                    self.focus_timer = None;
                    if let Some(main) = focus::focus_main_region(doc) {
                        self.temporary_tabindex = Some(main);
                        self.timers.schedule(
                            doc.now_ms(),
                            self.config.temporary_tabindex_ms,
                            Task::RemoveTemporaryTabindex(main),
                        );
                    }
                }
                Task::RemoveTemporaryTabindex(main) => {
                    self.remove_temporary_tabindex(doc, main);
                }
            }
        }
    }

    fn remove_temporary_tabindex(&mut self, doc: &mut Document, main: NodeId) {
        if doc.attr(main, "tabindex") == Some("-1") {
            doc.remove_attr(main, "tabindex");
        }
        if self.temporary_tabindex == Some(main) {
            self.temporary_tabindex = None;
        }
    }

    /// Speak `message` through the live region. The text is cleared after
    /// `announcement_clear_ms`; a newer announcement restarts that delay.
    pub fn announce(&mut self, doc: &mut Document, message: &str, priority: Priority) {
        if !self.is_active() {
            return;
        }
        let Some(announcer) = self.announcer else {
            return;
        };
        announcer.announce(doc, message, priority);

        if let Some(pending) = self.clear_timer.take() {
            self.timers.cancel(pending);
        }
        let delay = self.config.announcement_clear_ms;
        self.clear_timer = Some(self.timers.schedule(doc.now_ms(), delay, Task::ClearAnnouncement));
    }

    pub fn announcer(&self) -> Option<NodeId> {
        self.announcer.map(|a| a.element())
    }

    pub fn skip_link(&self) -> Option<NodeId> {
        self.skip_link
    }

    pub fn accessibility_report(&self) -> AccessibilityReport {
        AccessibilityReport {
            contrast_issues: self.contrast_issues.clone(),
            total_issues: self.contrast_issues.len(),
        }
    }

    /// Re-check contrast, appending to the accumulated issues
    pub fn check_contrast(&mut self, doc: &Document) -> Vec<ContrastIssue> {
        if !self.is_active() {
            return Vec::new();
        }
        let issues = contrast::check_document(doc, self.config.contrast_threshold);
        self.contrast_issues.extend(issues.iter().cloned());
        issues
    }

    /// Audit the page on demand, independent of the build mode
    pub fn run_audit(&self, doc: &Document) -> Option<AuditReport> {
        self.is_active()
            .then(|| audit::run(doc, &self.contrast_issues))
    }

    /// Remove everything the manager inserted and stop all activity
    pub fn cleanup(&mut self, doc: &mut Document) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        if let Some(link) = self.skip_link.take() {
            doc.remove(link);
        }
        if let Some(announcer) = self.announcer.take() {
            announcer.remove(doc);
        }
        if let Some(observer) = self.observer.take() {
            doc.disconnect_observer(observer);
        }
        if let Some(main) = self.temporary_tabindex {
            self.remove_temporary_tabindex(doc, main);
        }
        self.timers.cancel_all();
        self.clear_timer = None;
        self.focus_timer = None;
        self.contrast_issues.clear();
        self.state = LifecycleState::Disposed;
        tracing::debug!("accessibility manager cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_dom::ReadyState;
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<html><head></head><body>\
        <nav class=\"VPNav\"><a href=\"/guide/\">Guide</a></nav>\
        <div class=\"VPContent\"><h1>Lantern</h1><p>Body text</p></div></body></html>";

    fn page() -> Document {
        HtmlParser::new().parse(PAGE).unwrap()
    }

    fn manager(doc: &mut Document) -> AccessibilityManager {
        AccessibilityManager::new(A11yConfig::default(), doc, &Environment::default()).unwrap()
    }

    #[test]
    fn test_server_host_is_inert() {
        let mut doc = page();
        let before = doc.query_selector_all("*").len();
        let mut m =
            AccessibilityManager::new(A11yConfig::default(), &mut doc, &Environment::server()).unwrap();
        assert_eq!(m.state(), LifecycleState::Inert);
        m.announce(&mut doc, "hi", Priority::Polite);
        assert_eq!(doc.query_selector_all("*").len(), before);
    }

    #[test]
    fn test_setup_waits_for_interactive() {
        let mut doc = page();
        doc.set_ready_state(ReadyState::Loading);
        let env = Environment::default();
        let mut m = AccessibilityManager::new(A11yConfig::default(), &mut doc, &env).unwrap();
        assert_eq!(m.state(), LifecycleState::Pending);
        assert!(doc.query_selector(".skip-link").is_none());

        doc.set_ready_state(ReadyState::Interactive);
        m.on_ready_state_change(&mut doc, &env);
        assert_eq!(m.state(), LifecycleState::Active);
        assert!(doc.query_selector(".skip-link").is_some());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut doc = page();
        let config = A11yConfig {
            contrast_threshold: 0.5,
            ..Default::default()
        };
        let err = AccessibilityManager::new(config, &mut doc, &Environment::default()).unwrap_err();
        assert!(matches!(err, A11yError::InvalidThreshold(_)));
    }

    #[test]
    fn test_route_click_focuses_main_after_delay() {
        let mut doc = page();
        let mut m = manager(&mut doc);
        let link = doc.query_selector(".VPNav a").unwrap();
        let main = doc.query_selector(".VPContent").unwrap();

        m.handle_click(&mut doc, link);
        doc.advance_time(50.0);
        m.handle_history_pop(&mut doc);
        doc.advance_time(60.0);
        m.run_timers(&mut doc);
        assert_ne!(doc.active_element(), Some(main));

        doc.advance_time(40.0);
        m.run_timers(&mut doc);
        assert_eq!(doc.active_element(), Some(main));
        assert_eq!(doc.attr(main, "tabindex"), Some("-1"));

        doc.advance_time(1000.0);
        m.run_timers(&mut doc);
        assert!(!doc.has_attr(main, "tabindex"));
    }

    #[test]
    fn test_mutations_enhance_new_nodes_only() {
        let mut doc = page();
        let mut m = manager(&mut doc);
        let content = doc.query_selector(".VPContent").unwrap();

        let card = doc.create_element("div");
        doc.set_attr(card, "class", "VPFeature");
        let input = doc.create_element("input");
        doc.append_child(card, input).unwrap();
        doc.append_child(content, card).unwrap();
        m.process_mutations(&mut doc);

        assert_eq!(doc.attr(card, "role"), Some("button"));
        assert_eq!(doc.attr(card, "tabindex"), Some("0"));
        assert_eq!(doc.element_id(input), Some("lantern-control-1"));
    }

    #[test]
    fn test_cleanup_is_final() {
        let mut doc = page();
        let mut m = manager(&mut doc);
        let announcer = m.announcer().unwrap();
        assert!(doc.is_connected(announcer));

        m.cleanup(&mut doc);
        m.cleanup(&mut doc);
        assert_eq!(m.state(), LifecycleState::Disposed);
        assert!(doc.query_selector(".skip-link").is_none());
        assert!(!doc.is_connected(announcer));
        assert!(m.run_audit(&doc).is_none());

        let body = doc.body();
        let mut event = KeyboardEvent::new(Key::Tab, body);
        m.handle_key_down(&mut doc, &mut event);
        assert_eq!(m.input_method(), None);
    }
}
