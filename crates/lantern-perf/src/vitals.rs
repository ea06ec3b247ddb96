//! Core Web Vitals
//!
//! Folds performance entries and navigation timing into a metric map.

use std::collections::BTreeMap;

use lantern_dom::{EntryType, NavigationTiming, PerformanceEntry};
use serde::Serialize;

/// Metric names as reported
pub mod metric {
    pub const LCP: &str = "LCP";
    pub const FID: &str = "FID";
    pub const CLS: &str = "CLS";
    pub const LONG_TASK_COUNT: &str = "longTaskCount";
    pub const TTFB: &str = "TTFB";
    pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";
    pub const LOAD: &str = "Load";
}

/// Metric name to latest value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, f64>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Record a sample, replacing any earlier one
    pub fn set(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Accumulates vitals from the performance timeline
#[derive(Debug, Default)]
pub(crate) struct VitalsCollector {
    metrics: Metrics,
    cls: f64,
    long_tasks: u32,
    long_task_threshold_ms: f64,
}

impl VitalsCollector {
    pub(crate) fn new(long_task_threshold_ms: f64) -> Self {
        Self {
            long_task_threshold_ms,
            ..Default::default()
        }
    }

    pub(crate) fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub(crate) fn record(&mut self, entry: &PerformanceEntry) {
        match entry.entry_type {
            EntryType::LargestContentfulPaint => {
                self.metrics.set(metric::LCP, entry.start_time);
            }
            EntryType::FirstInput => {
                if !self.metrics.contains(metric::FID)
                    && let Some(processing_start) = entry.processing_start
                {
                    self.metrics.set(metric::FID, processing_start - entry.start_time);
                }
            }
            EntryType::LayoutShift => {
                if !entry.had_recent_input {
                    self.cls += entry.value.unwrap_or(0.0);
                }
                self.metrics.set(metric::CLS, self.cls);
            }
            EntryType::Longtask => {
                if entry.duration > self.long_task_threshold_ms {
                    self.long_tasks += 1;
                    tracing::warn!(
                        start = entry.start_time,
                        duration = entry.duration,
                        "Long task detected"
                    );
                    self.metrics
                        .set(metric::LONG_TASK_COUNT, f64::from(self.long_tasks));
                }
            }
            _ => {}
        }
    }

    /// Window `load`: navigation timings relative to navigation start
    pub(crate) fn record_navigation(&mut self, timing: &NavigationTiming) {
        self.metrics.set(metric::TTFB, timing.ttfb());
        self.metrics
            .set(metric::DOM_CONTENT_LOADED, timing.dom_content_loaded());
        self.metrics.set(metric::LOAD, timing.load());
    }

    pub(crate) fn clear(&mut self) {
        self.metrics.clear();
        self.cls = 0.0;
        self.long_tasks = 0;
    }
}

/// Log the known metrics as one group
pub(crate) fn report(metrics: &Metrics) {
    let _group = tracing::info_span!("performance_metrics").entered();
    let timings = [
        (metric::LCP, "Largest Contentful Paint"),
        (metric::FID, "First Input Delay"),
        (metric::TTFB, "Time to First Byte"),
        (metric::DOM_CONTENT_LOADED, "DOM Content Loaded"),
        (metric::LOAD, "Page Load"),
    ];
    for (name, label) in timings {
        if let Some(value) = metrics.get(name) {
            tracing::info!("{name} ({label}): {value:.2}ms");
        }
    }
    if let Some(cls) = metrics.get(metric::CLS) {
        tracing::info!("CLS (Cumulative Layout Shift): {cls:.3}");
    }
    if let Some(count) = metrics.get(metric::LONG_TASK_COUNT) {
        tracing::warn!("Long Tasks: {count}");
    }
}
