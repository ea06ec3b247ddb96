//! Window environment
//!
//! Everything the enhancement layer reads from `window` and `navigator`
//! besides the document itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DOMRect;

/// Where the layer is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    #[default]
    Browser,
    /// Server-side render; no window, nothing to enhance
    Server,
}

/// Build mode of the hosting site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

/// Observation primitives the host provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub mutation_observer: bool,
    pub performance_observer: bool,
    pub speech_synthesis: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            mutation_observer: true,
            performance_observer: true,
            speech_synthesis: false,
        }
    }
}

/// `matchMedia` results the layer queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaFeatures {
    /// `(prefers-reduced-motion: reduce)`
    pub prefers_reduced_motion: bool,
    /// `(prefers-contrast: high)`
    pub prefers_high_contrast: bool,
}

/// `navigator.connection`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkInfo {
    /// `slow-2g`, `2g`, `3g` or `4g`
    pub effective_type: Option<String>,
    pub save_data: bool,
}

/// `navigator.deviceMemory` / `navigator.hardwareConcurrency`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Gigabytes
    pub device_memory: Option<f64>,
    pub hardware_concurrency: Option<u32>,
}

/// `localStorage`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Storage {
    items: HashMap<String, String>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    pub fn remove_item(&mut self, key: &str) -> Option<String> {
        self.items.remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Window environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub host: HostKind,
    pub build_mode: BuildMode,
    pub capabilities: Capabilities,
    pub media: MediaFeatures,
    /// `None` when the Network Information API is unavailable
    pub network: Option<NetworkInfo>,
    pub device: DeviceInfo,
    pub user_agent: String,
    /// `navigator.language`
    pub language: String,
    /// Visual viewport in document coordinates
    pub viewport: DOMRect,
    pub storage: Storage,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            host: HostKind::Browser,
            build_mode: BuildMode::Production,
            capabilities: Capabilities::default(),
            media: MediaFeatures::default(),
            network: None,
            device: DeviceInfo::default(),
            user_agent: String::new(),
            language: "zh-CN".to_string(),
            viewport: DOMRect::from_xywh(0.0, 0.0, 1280.0, 800.0),
            storage: Storage::new(),
        }
    }
}

impl Environment {
    /// Browser environment with diagnostics enabled
    pub fn development() -> Self {
        Self {
            build_mode: BuildMode::Development,
            ..Default::default()
        }
    }

    /// Server-side rendering environment
    pub fn server() -> Self {
        Self {
            host: HostKind::Server,
            capabilities: Capabilities {
                intersection_observer: false,
                mutation_observer: false,
                performance_observer: false,
                speech_synthesis: false,
            },
            ..Default::default()
        }
    }

    pub fn is_browser(&self) -> bool {
        self.host == HostKind::Browser
    }

    pub fn is_development(&self) -> bool {
        self.build_mode == BuildMode::Development
    }
}
