//! Theme behaviors
//!
//! Site-level touches that sit beside the two managers: the language
//! toggle, the scroll-aware navigation bar and scroll reveal.

mod language;
mod reveal;
mod smart_nav;

pub use language::{
    LANGUAGE_CHANGE_EVENT, LANGUAGE_STORAGE_KEY, Language, current_language, preferred_language,
    set_language,
};
pub use reveal::ScrollReveal;
pub use smart_nav::SmartNav;

use lantern_dom::{
    DOMRect, Document, Environment, Key, KeyboardEvent, NodeId, Storage, TimerHandle, TimerQueue,
};

/// How long the toggle keeps its `switching` class
const SWITCH_ANIMATION_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    EndSwitchAnimation(NodeId),
}

/// Theme state for one page
#[derive(Debug)]
pub struct Theme {
    toggle: Option<NodeId>,
    nav: SmartNav,
    reveal: Option<ScrollReveal>,
    timers: TimerQueue<Task>,
    switching: Option<TimerHandle>,
    disposed: bool,
}

impl Theme {
    /// Install the toggle, apply the preferred language and start
    /// watching for revealable content
    pub fn mount(doc: &mut Document, env: &Environment) -> Self {
        let _span = tracing::debug_span!("theme_mount").entered();
        let toggle = language::install_toggle(doc);
        set_language(doc, preferred_language(env));

        let reveal = env.capabilities.intersection_observer.then(|| {
            let mut reveal = ScrollReveal::new(doc);
            reveal.check(doc, env.viewport);
            reveal
        });

        Self {
            toggle,
            nav: SmartNav::new(),
            reveal,
            timers: TimerQueue::new(),
            switching: None,
            disposed: false,
        }
    }

    pub fn toggle_button(&self) -> Option<NodeId> {
        self.toggle
    }

    /// Switch to the other language and remember the choice
    pub fn toggle_language(&mut self, doc: &mut Document, storage: &mut Storage) -> Language {
        let next = current_language(doc).other();
        set_language(doc, next);
        storage.set_item(LANGUAGE_STORAGE_KEY, next.code());

        if let Some(button) = self.toggle {
            doc.add_class(button, "switching");
            if let Some(previous) = self.switching.take() {
                self.timers.cancel(previous);
            }
            self.switching = Some(self.timers.schedule(
                doc.now_ms(),
                SWITCH_ANIMATION_MS,
                Task::EndSwitchAnimation(button),
            ));
        }
        next
    }

    fn is_toggle(&self, doc: &Document, target: NodeId) -> bool {
        self.toggle.is_some_and(|t| doc.contains(t, target))
    }

    /// Click on the page; returns true if it was the language toggle
    pub fn handle_click(&mut self, doc: &mut Document, storage: &mut Storage, target: NodeId) -> bool {
        if self.disposed || !self.is_toggle(doc, target) {
            return false;
        }
        self.toggle_language(doc, storage);
        true
    }

    /// Enter or Space on the toggle switches language
    pub fn handle_key_down(
        &mut self,
        doc: &mut Document,
        storage: &mut Storage,
        event: &mut KeyboardEvent,
    ) -> bool {
        if self.disposed
            || !matches!(event.key, Key::Enter | Key::Space)
            || !self.is_toggle(doc, event.target)
        {
            return false;
        }
        event.prevent_default();
        self.toggle_language(doc, storage);
        true
    }

    pub fn on_scroll(&mut self, doc: &mut Document, scroll_y: f64) {
        if !self.disposed {
            self.nav.update(doc, scroll_y);
        }
    }

    pub fn update_viewport(&mut self, doc: &mut Document, viewport: DOMRect) {
        if self.disposed {
            return;
        }
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.check(doc, viewport);
        }
    }

    pub fn next_timer_in(&self, doc: &Document) -> Option<f64> {
        self.timers.time_until_next(doc.now_ms())
    }

    pub fn run_timers(&mut self, doc: &mut Document) {
        for task in self.timers.take_due(doc.now_ms()) {
            match task {
                Task::EndSwitchAnimation(button) => {
                    doc.remove_class(button, "switching");
                    self.switching = None;
                }
            }
        }
    }

    pub fn cleanup(&mut self) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.disconnect();
        }
        self.timers.cancel_all();
        self.switching = None;
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    fn page() -> Document {
        HtmlParser::new()
            .parse(
                "<html lang=\"zh-CN\"><body><header class=\"VPNav\">\
                 <button class=\"VPSwitchAppearance\" title=\"切换深色主题\"></button></header>\
                 <p data-lang-zh=\"你好\" data-lang-en=\"Hello\">你好</p></body></html>",
            )
            .unwrap()
    }

    #[test]
    fn test_mount_applies_stored_language() {
        let mut doc = page();
        let mut env = Environment::default();
        env.storage.set_item(LANGUAGE_STORAGE_KEY, "en");
        let theme = Theme::mount(&mut doc, &env);

        assert!(theme.toggle_button().is_some());
        assert_eq!(current_language(&doc), Language::En);
        let p = doc.query_selector("p").unwrap();
        assert_eq!(doc.text_content(p), "Hello");
    }

    #[test]
    fn test_toggle_persists_and_animates() {
        let mut doc = page();
        let mut env = Environment::default();
        let mut theme = Theme::mount(&mut doc, &env);
        let button = theme.toggle_button().unwrap();

        assert!(theme.handle_click(&mut doc, &mut env.storage, button));
        assert_eq!(current_language(&doc), Language::En);
        assert_eq!(env.storage.get_item(LANGUAGE_STORAGE_KEY), Some("en"));
        assert!(doc.has_class(button, "switching"));

        doc.advance_time(300.0);
        theme.run_timers(&mut doc);
        assert!(!doc.has_class(button, "switching"));
    }

    #[test]
    fn test_keyboard_toggle() {
        let mut doc = page();
        let mut env = Environment::default();
        let mut theme = Theme::mount(&mut doc, &env);
        let button = theme.toggle_button().unwrap();
        let text = doc.query_selector(".lang-text").unwrap();

        let mut event = KeyboardEvent::new(Key::Space, text);
        assert!(theme.handle_key_down(&mut doc, &mut env.storage, &mut event));
        assert!(event.default_prevented());

        let p = doc.query_selector("p").unwrap();
        let mut elsewhere = KeyboardEvent::new(Key::Enter, p);
        assert!(!theme.handle_key_down(&mut doc, &mut env.storage, &mut elsewhere));
        assert_eq!(current_language(&doc), Language::En);
        assert!(doc.contains(button, text));
    }

    #[test]
    fn test_cleanup_stops_reacting() {
        let mut doc = page();
        let mut env = Environment::default();
        let mut theme = Theme::mount(&mut doc, &env);
        let button = theme.toggle_button().unwrap();
        theme.cleanup();

        assert!(!theme.handle_click(&mut doc, &mut env.storage, button));
        assert!(theme.next_timer_in(&doc).is_none());
        assert_eq!(current_language(&doc), Language::Zh);
    }
}
