//! Performance Manager
//!
//! Sets up loading optimizations once the document is interactive and
//! folds host observations into metrics.

use lantern_dom::{
    DOMRect, Document, EntryType, Environment, IntersectionObserverOptions, MutationObserverInit,
    NavigationTiming, NodeId, ObserverId, PerformanceEntry, PerformanceObserver, TimerQueue,
};
use serde::Serialize;

use crate::lazy_load::LazyImages;
use crate::prefetch::{self, LinkPrefetcher};
use crate::vitals::{self, Metrics, VitalsCollector};
use crate::{PerfConfig, PerfError, resources};

/// Where the manager is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Inert,
    Pending,
    Active,
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
enum Task {
    LoadDeferredScripts,
    Prefetch(String),
}

/// Performance optimization for one page
#[derive(Debug)]
pub struct PerformanceManager {
    config: PerfConfig,
    state: LifecycleState,
    images: Option<LazyImages>,
    links: Option<LinkPrefetcher>,
    mutation_observer: Option<ObserverId>,
    performance_observer: Option<PerformanceObserver>,
    vitals: VitalsCollector,
    timers: TimerQueue<Task>,
}

impl PerformanceManager {
    pub fn new(config: PerfConfig, doc: &mut Document, env: &Environment) -> Result<Self, PerfError> {
        config.validate()?;
        let long_task_threshold = config.long_task_threshold_ms;
        let mut manager = Self {
            config,
            state: LifecycleState::Inert,
            images: None,
            links: None,
            mutation_observer: None,
            performance_observer: None,
            vitals: VitalsCollector::new(long_task_threshold),
            timers: TimerQueue::new(),
        };

        if !env.is_browser() {
            tracing::debug!("Non-browser host, performance optimizations disabled");
            return Ok(manager);
        }
        if doc.ready_state().is_loading() {
            manager.state = LifecycleState::Pending;
        } else {
            manager.setup(doc, env);
        }
        Ok(manager)
    }

    pub fn config(&self) -> &PerfConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    pub fn on_ready_state_change(&mut self, doc: &mut Document, env: &Environment) {
        if self.state == LifecycleState::Pending && !doc.ready_state().is_loading() {
            self.setup(doc, env);
        }
    }

    fn setup(&mut self, doc: &mut Document, env: &Environment) {
        let _span = tracing::debug_span!("performance_setup").entered();
        let caps = env.capabilities;

        if self.config.enable_resource_priorities {
            resources::prioritize_critical(doc, &self.config);
            self.timers.schedule(
                doc.now_ms(),
                self.config.critical_resource_timeout_ms,
                Task::LoadDeferredScripts,
            );
        }

        if self.config.enable_image_lazy_loading {
            let mut images = if caps.intersection_observer {
                LazyImages::observing(IntersectionObserverOptions::new(
                    self.config.image_loading_threshold,
                    &self.config.image_root_margin,
                ))
            } else {
                tracing::debug!("No intersection observation, loading images eagerly");
                LazyImages::eager()
            };
            let body = doc.body();
            images.register(doc, body);
            if caps.intersection_observer && caps.mutation_observer {
                self.mutation_observer =
                    Some(doc.observe_mutations(body, MutationObserverInit::child_list_subtree()));
            }
            self.images = Some(images);
        }

        if self.config.enable_link_prefetching && caps.intersection_observer {
            let mut links = LinkPrefetcher::new(self.config.link_prefetch_threshold);
            links.register(doc);
            self.links = Some(links);
        }

        if self.config.enable_performance_monitoring && caps.performance_observer {
            let mut observer = PerformanceObserver::new();
            observer.observe(&[
                EntryType::LargestContentfulPaint,
                EntryType::FirstInput,
                EntryType::LayoutShift,
                EntryType::Longtask,
            ]);
            self.performance_observer = Some(observer);
        }

        resources::optimize_font_loading(doc);
        resources::optimize_css_loading(doc);
        resources::install_resource_hints(doc, &self.config);

        self.state = LifecycleState::Active;
        self.update_viewport(doc, env.viewport);
        tracing::debug!("performance optimizations active");
    }

    /// Evaluate intersection observers against the current viewport
    pub fn update_viewport(&mut self, doc: &mut Document, viewport: DOMRect) {
        if !self.is_active() {
            return;
        }
        if let Some(images) = self.images.as_mut() {
            images.check(doc, viewport);
        }
        if let Some(links) = self.links.as_mut() {
            for href in links.check(doc, viewport) {
                self.timers
                    .schedule(doc.now_ms(), self.config.prefetch_delay_ms, Task::Prefetch(href));
            }
        }
    }

    /// Observe lazy images inserted since the last call
    pub fn process_mutations(&mut self, doc: &mut Document) {
        if !self.is_active() {
            return;
        }
        let (Some(observer), Some(images)) = (self.mutation_observer, self.images.as_mut()) else {
            return;
        };
        for record in doc.take_mutation_records(observer) {
            for added in record.added_nodes {
                if doc.is_element(added) && doc.is_connected(added) {
                    images.register(doc, added);
                }
            }
        }
    }

    /// Deliver a performance timeline entry
    pub fn record_entry(&mut self, entry: &PerformanceEntry) {
        if !self.is_active() {
            return;
        }
        if self
            .performance_observer
            .as_ref()
            .is_some_and(|o| o.accepts(entry))
        {
            self.vitals.record(entry);
        }
    }

    /// Window `load` with the page's navigation timing
    pub fn on_load(&mut self, timing: &NavigationTiming) {
        if self.is_active() && self.performance_observer.is_some() {
            self.vitals.record_navigation(timing);
        }
    }

    /// Native `load` event of an image
    pub fn on_image_load(&mut self, doc: &mut Document, img: NodeId) {
        if !self.is_active() {
            return;
        }
        if let Some(images) = self.images.as_mut() {
            images.on_load(doc, img);
        }
    }

    /// Native `error` event of an image
    pub fn on_image_error(&mut self, doc: &mut Document, img: NodeId) {
        if !self.is_active() {
            return;
        }
        if let Some(images) = self.images.as_mut() {
            images.on_error(doc, img);
        }
    }

    pub fn next_timer_in(&self, doc: &Document) -> Option<f64> {
        self.timers.time_until_next(doc.now_ms())
    }

    pub fn run_timers(&mut self, doc: &mut Document) {
        for task in self.timers.take_due(doc.now_ms()) {
            match task {
                Task::LoadDeferredScripts => {
                    resources::load_deferred_scripts(doc, &self.config.deferred_scripts);
                }
                Task::Prefetch(href) => {
                    prefetch::prefetch_link(doc, &href);
                }
            }
        }
    }

    /// Point-in-time copy of the metrics
    pub fn metrics(&self) -> Metrics {
        self.vitals.metrics().clone()
    }

    pub fn report_metrics(&self) {
        vitals::report(self.vitals.metrics());
    }

    /// Disconnect observers, cancel timers and clear metrics. Idempotent.
    pub fn cleanup(&mut self, doc: &mut Document) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        if let Some(images) = self.images.as_mut() {
            images.disconnect();
        }
        if let Some(links) = self.links.as_mut() {
            links.disconnect();
        }
        if let Some(observer) = self.performance_observer.as_mut() {
            observer.disconnect();
        }
        if let Some(observer) = self.mutation_observer.take() {
            doc.disconnect_observer(observer);
        }
        self.timers.cancel_all();
        self.vitals.clear();
        self.state = LifecycleState::Disposed;
        tracing::debug!("performance manager cleaned up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_dom::{Capabilities, ReadyState};
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    use crate::metric;

    fn page() -> Document {
        HtmlParser::new()
            .parse_with_url(
                "<html><head><link rel=\"stylesheet\" href=\"/custom.css\"></head>\
                 <body><img data-src=\"/hero.png\"><a href=\"/guide/\">Guide</a></body></html>",
                "https://docs.lantern.dev/",
            )
            .unwrap()
    }

    #[test]
    fn test_pending_until_interactive() {
        let mut doc = page();
        doc.set_ready_state(ReadyState::Loading);
        let env = Environment::default();
        let mut m = PerformanceManager::new(PerfConfig::default(), &mut doc, &env).unwrap();
        assert_eq!(m.state(), LifecycleState::Pending);
        assert!(doc.query_selector("link[rel=\"preconnect\"]").is_none());

        doc.set_ready_state(ReadyState::Interactive);
        m.on_ready_state_change(&mut doc, &env);
        assert_eq!(m.state(), LifecycleState::Active);
        assert!(doc.query_selector("link[rel=\"preconnect\"]").is_some());
    }

    #[test]
    fn test_no_intersection_observer_loads_eagerly() {
        let mut doc = page();
        let env = Environment {
            capabilities: Capabilities {
                intersection_observer: false,
                ..Default::default()
            },
            ..Default::default()
        };
        PerformanceManager::new(PerfConfig::default(), &mut doc, &env).unwrap();
        let img = doc.query_selector("img").unwrap();
        assert_eq!(doc.attr(img, "src"), Some("/hero.png"));
    }

    #[test]
    fn test_entries_need_monitoring() {
        let mut doc = page();
        let config = PerfConfig {
            enable_performance_monitoring: false,
            ..Default::default()
        };
        let mut m = PerformanceManager::new(config, &mut doc, &Environment::default()).unwrap();
        m.record_entry(&PerformanceEntry::largest_contentful_paint(800.0));
        assert!(m.metrics().is_empty());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut doc = page();
        let mut m = PerformanceManager::new(PerfConfig::default(), &mut doc, &Environment::default())
            .unwrap();
        m.record_entry(&PerformanceEntry::largest_contentful_paint(800.0));
        assert_eq!(m.metrics().get(metric::LCP), Some(800.0));

        m.cleanup(&mut doc);
        m.cleanup(&mut doc);
        assert_eq!(m.state(), LifecycleState::Disposed);
        assert!(m.metrics().is_empty());
        assert!(m.next_timer_in(&doc).is_none());

        m.record_entry(&PerformanceEntry::largest_contentful_paint(900.0));
        assert!(m.metrics().is_empty());
    }
}
