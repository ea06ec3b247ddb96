//! Performance timeline
//!
//! Entry types fed by the host and the observer filter that decides which
//! entries a subscriber receives.

use serde::{Deserialize, Serialize};

/// Performance entry types the timeline can deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    LargestContentfulPaint,
    FirstInput,
    LayoutShift,
    Longtask,
    Navigation,
    Resource,
    Paint,
    Mark,
    Measure,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::LargestContentfulPaint => "largest-contentful-paint",
            EntryType::FirstInput => "first-input",
            EntryType::LayoutShift => "layout-shift",
            EntryType::Longtask => "longtask",
            EntryType::Navigation => "navigation",
            EntryType::Resource => "resource",
            EntryType::Paint => "paint",
            EntryType::Mark => "mark",
            EntryType::Measure => "measure",
        }
    }
}

/// A single performance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub name: String,
    pub entry_type: EntryType,
    pub start_time: f64,
    pub duration: f64,
    /// `first-input` only
    #[serde(default)]
    pub processing_start: Option<f64>,
    /// `layout-shift` only
    #[serde(default)]
    pub value: Option<f64>,
    /// `layout-shift` only
    #[serde(default)]
    pub had_recent_input: bool,
}

impl PerformanceEntry {
    pub fn new(entry_type: EntryType, start_time: f64, duration: f64) -> Self {
        Self {
            name: String::new(),
            entry_type,
            start_time,
            duration,
            processing_start: None,
            value: None,
            had_recent_input: false,
        }
    }

    pub fn largest_contentful_paint(start_time: f64) -> Self {
        Self::new(EntryType::LargestContentfulPaint, start_time, 0.0)
    }

    pub fn first_input(start_time: f64, processing_start: f64) -> Self {
        Self {
            processing_start: Some(processing_start),
            ..Self::new(EntryType::FirstInput, start_time, 0.0)
        }
    }

    pub fn layout_shift(start_time: f64, value: f64, had_recent_input: bool) -> Self {
        Self {
            value: Some(value),
            had_recent_input,
            ..Self::new(EntryType::LayoutShift, start_time, 0.0)
        }
    }

    pub fn long_task(start_time: f64, duration: f64) -> Self {
        Self::new(EntryType::Longtask, start_time, duration)
    }
}

/// Navigation timing (Navigation Timing Level 1 subset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub navigation_start: f64,
    pub fetch_start: f64,
    pub request_start: f64,
    pub response_start: f64,
    pub response_end: f64,
    pub dom_interactive: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
}

impl NavigationTiming {
    /// Time to first byte
    pub fn ttfb(&self) -> f64 {
        self.response_start - self.navigation_start
    }

    pub fn dom_content_loaded(&self) -> f64 {
        self.dom_content_loaded_event_end - self.navigation_start
    }

    pub fn load(&self) -> f64 {
        self.load_event_end - self.navigation_start
    }
}

/// `PerformanceObserver.observe({ entryTypes })` subscription
#[derive(Debug, Clone, Default)]
pub struct PerformanceObserver {
    entry_types: Vec<EntryType>,
    connected: bool,
}

impl PerformanceObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, entry_types: &[EntryType]) {
        for ty in entry_types {
            if !self.entry_types.contains(ty) {
                self.entry_types.push(*ty);
            }
        }
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.entry_types.clear();
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Would this entry be delivered?
    pub fn accepts(&self, entry: &PerformanceEntry) -> bool {
        self.connected && self.entry_types.contains(&entry.entry_type)
    }
}
