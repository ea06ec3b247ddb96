//! Page - the mounted document and everything enhancing it

use lantern_a11y::{
    A11yConfig, AccessibilityManager, AuditReport, ContrastIssue,
    LifecycleState as A11yState, Priority,
};
use lantern_dom::{
    DOMRect, Document, Environment, Key, KeyboardEvent, NavigationTiming, NodeId,
    PerformanceEntry, ReadyState,
};
use lantern_html::HtmlParser;
use lantern_perf::{LifecycleState as PerfState, PerfConfig, PerformanceManager};

use crate::LanternError;
use crate::theme::Theme;

/// A mounted page
///
/// Owns the document, the host environment and at most one manager of
/// each kind. Host callbacks enter through the methods here and are
/// forwarded to whichever managers exist.
#[derive(Debug)]
pub struct Page {
    document: Document,
    env: Environment,
    accessibility: Option<AccessibilityManager>,
    performance: Option<PerformanceManager>,
    theme: Option<Theme>,
}

impl Page {
    pub fn new(document: Document, env: Environment) -> Self {
        Self {
            document,
            env,
            accessibility: None,
            performance: None,
            theme: None,
        }
    }

    /// Parse `html` at `url` and mount it
    pub fn load(html: &str, url: &str, env: Environment) -> Result<Self, LanternError> {
        let mut document = HtmlParser::new().parse_with_url(html, url)?;
        lantern_html::apply_inline_styles(&mut document);
        Ok(Self::new(document, env))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access for host-side changes (geometry, content)
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    // ---- managers ----

    /// Construct the accessibility manager. An equal config returns the
    /// existing manager; a different one is rejected. A cleaned-up manager
    /// is replaced by a new one.
    pub fn init_accessibility(
        &mut self,
        config: A11yConfig,
    ) -> Result<&mut AccessibilityManager, LanternError> {
        if self
            .accessibility
            .as_ref()
            .is_some_and(|m| m.state() == A11yState::Disposed)
        {
            self.accessibility = None;
        }
        if let Some(existing) = &self.accessibility
            && existing.config() != &config
        {
            return Err(LanternError::AlreadyInitialized("accessibility"));
        }
        let manager = match self.accessibility.take() {
            Some(existing) => existing,
            None => AccessibilityManager::new(config, &mut self.document, &self.env)?,
        };
        Ok(self.accessibility.insert(manager))
    }

    /// Construct the performance manager, with the same reuse rules as
    /// [`Page::init_accessibility`]
    pub fn init_performance(
        &mut self,
        config: PerfConfig,
    ) -> Result<&mut PerformanceManager, LanternError> {
        if self
            .performance
            .as_ref()
            .is_some_and(|m| m.state() == PerfState::Disposed)
        {
            self.performance = None;
        }
        if let Some(existing) = &self.performance
            && existing.config() != &config
        {
            return Err(LanternError::AlreadyInitialized("performance"));
        }
        let manager = match self.performance.take() {
            Some(existing) => existing,
            None => PerformanceManager::new(config, &mut self.document, &self.env)?,
        };
        Ok(self.performance.insert(manager))
    }

    /// Mount the theme behaviors. Nothing happens on a server host.
    pub fn init_theme(&mut self) -> Option<&mut Theme> {
        if !self.env.is_browser() {
            return None;
        }
        if self.theme.is_none() {
            self.theme = Some(Theme::mount(&mut self.document, &self.env));
        }
        self.theme.as_mut()
    }

    pub fn accessibility(&self) -> Option<&AccessibilityManager> {
        self.accessibility.as_ref()
    }

    pub fn accessibility_mut(&mut self) -> Option<&mut AccessibilityManager> {
        self.accessibility.as_mut()
    }

    pub fn performance(&self) -> Option<&PerformanceManager> {
        self.performance.as_ref()
    }

    pub fn performance_mut(&mut self) -> Option<&mut PerformanceManager> {
        self.performance.as_mut()
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    // ---- accessibility operations ----

    /// Speak `message` through the accessibility manager's live region
    pub fn announce(&mut self, message: &str, priority: Priority) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.announce(&mut self.document, message, priority);
        }
    }

    /// Re-check contrast over the current document
    pub fn check_contrast(&mut self) -> Vec<ContrastIssue> {
        match self.accessibility.as_mut() {
            Some(a11y) => a11y.check_contrast(&self.document),
            None => Vec::new(),
        }
    }

    /// Audit the current document
    pub fn audit(&self) -> Option<AuditReport> {
        self.accessibility.as_ref()?.run_audit(&self.document)
    }

    /// Clean up the accessibility manager. It stays in place as disposed
    /// until the next [`Page::init_accessibility`].
    pub fn cleanup_accessibility(&mut self) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.cleanup(&mut self.document);
        }
    }

    /// Clean up the performance manager, as [`Page::cleanup_accessibility`]
    pub fn cleanup_performance(&mut self) {
        if let Some(perf) = self.performance.as_mut() {
            perf.cleanup(&mut self.document);
        }
    }

    // ---- host callbacks ----

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.document.set_ready_state(state);
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.on_ready_state_change(&mut self.document, &self.env);
        }
        if let Some(perf) = self.performance.as_mut() {
            perf.on_ready_state_change(&mut self.document, &self.env);
        }
    }

    /// Document-level `keydown`
    pub fn key_down(&mut self, event: &mut KeyboardEvent) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.handle_key_down(&mut self.document, event);
        }
        if let Some(theme) = self.theme.as_mut() {
            theme.handle_key_down(&mut self.document, &mut self.env.storage, event);
        }
    }

    /// Press Tab on the focused element. Without a handler preventing it,
    /// focus moves in sequential order. Returns the focused element after.
    pub fn press_tab(&mut self, shift: bool) -> Option<NodeId> {
        let target = self
            .document
            .active_element()
            .unwrap_or_else(|| self.document.body());
        let mut event = KeyboardEvent::new(Key::Tab, target).with_shift(shift);
        self.key_down(&mut event);
        if !event.default_prevented() {
            self.document.focus_next_sequential(shift);
        }
        self.document.active_element()
    }

    pub fn pointer_down(&mut self) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.handle_pointer_down(&mut self.document);
        }
    }

    /// A user click on `target`
    pub fn click(&mut self, target: NodeId) {
        self.document.click(target);
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.handle_click(&mut self.document, target);
        }
        if let Some(theme) = self.theme.as_mut() {
            theme.handle_click(&mut self.document, &mut self.env.storage, target);
        }
    }

    /// Browser history navigation (`popstate`)
    pub fn history_pop(&mut self) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.handle_history_pop(&mut self.document);
        }
    }

    /// Deliver pending mutation records to the managers
    pub fn flush_mutations(&mut self) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.process_mutations(&mut self.document);
        }
        if let Some(perf) = self.performance.as_mut() {
            perf.process_mutations(&mut self.document);
        }
    }

    /// The visual viewport moved or resized
    pub fn update_viewport(&mut self, viewport: DOMRect) {
        self.env.viewport = viewport;
        if let Some(perf) = self.performance.as_mut() {
            perf.update_viewport(&mut self.document, viewport);
        }
        if let Some(theme) = self.theme.as_mut() {
            theme.update_viewport(&mut self.document, viewport);
        }
    }

    /// Scroll the window to `scroll_y`
    pub fn scroll_to(&mut self, scroll_y: f64) {
        if let Some(theme) = self.theme.as_mut() {
            theme.on_scroll(&mut self.document, scroll_y);
        }
        let viewport = DOMRect {
            y: scroll_y,
            ..self.env.viewport
        };
        self.update_viewport(viewport);
    }

    pub fn record_performance_entry(&mut self, entry: &PerformanceEntry) {
        if let Some(perf) = self.performance.as_mut() {
            perf.record_entry(entry);
        }
    }

    /// Window `load`
    pub fn fire_load(&mut self, timing: &NavigationTiming) {
        self.set_ready_state(ReadyState::Complete);
        if let Some(perf) = self.performance.as_mut() {
            perf.on_load(timing);
        }
    }

    pub fn image_loaded(&mut self, img: NodeId) {
        if let Some(perf) = self.performance.as_mut() {
            perf.on_image_load(&mut self.document, img);
        }
    }

    pub fn image_failed(&mut self, img: NodeId) {
        if let Some(perf) = self.performance.as_mut() {
            perf.on_image_error(&mut self.document, img);
        }
    }

    // ---- time ----

    /// Move the document clock forward by `ms`, firing every timer that
    /// comes due on the way in order
    pub fn advance(&mut self, ms: f64) {
        let end = self.document.now_ms() + ms.max(0.0);
        while let Some(wait) = self.next_timer_in() {
            if self.document.now_ms() + wait > end {
                break;
            }
            self.document.advance_time(wait);
            self.run_timers();
        }
        let rest = end - self.document.now_ms();
        self.document.advance_time(rest);
        self.run_timers();
    }

    fn next_timer_in(&self) -> Option<f64> {
        [
            self.accessibility
                .as_ref()
                .and_then(|m| m.next_timer_in(&self.document)),
            self.performance
                .as_ref()
                .and_then(|m| m.next_timer_in(&self.document)),
            self.theme
                .as_ref()
                .and_then(|t| t.next_timer_in(&self.document)),
        ]
        .into_iter()
        .flatten()
        .min_by(f64::total_cmp)
    }

    fn run_timers(&mut self) {
        if let Some(a11y) = self.accessibility.as_mut() {
            a11y.run_timers(&mut self.document);
        }
        if let Some(perf) = self.performance.as_mut() {
            perf.run_timers(&mut self.document);
        }
        if let Some(theme) = self.theme.as_mut() {
            theme.run_timers(&mut self.document);
        }
    }

    /// Tear down every manager and the theme
    pub fn unmount(&mut self) {
        if let Some(mut a11y) = self.accessibility.take() {
            a11y.cleanup(&mut self.document);
        }
        if let Some(mut perf) = self.performance.take() {
            perf.cleanup(&mut self.document);
        }
        if let Some(mut theme) = self.theme.take() {
            theme.cleanup();
        }
        tracing::debug!(url = self.document.url(), "page unmounted");
    }

    /// Unmount and hand back the document
    pub fn into_document(mut self) -> Document {
        self.unmount();
        self.document
    }
}
