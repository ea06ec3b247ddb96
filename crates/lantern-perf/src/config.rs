//! Performance configuration

use serde::{Deserialize, Serialize};

use crate::PerfError;

/// Performance manager configuration. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfConfig {
    pub enable_resource_priorities: bool,
    pub enable_image_lazy_loading: bool,
    pub enable_link_prefetching: bool,
    pub enable_performance_monitoring: bool,
    /// Substring identifying the critical stylesheet
    pub critical_stylesheet: String,
    /// Third-party scripts appended once the critical window has passed
    pub deferred_scripts: Vec<String>,
    pub critical_resource_timeout_ms: u64,
    pub image_loading_threshold: f64,
    pub image_root_margin: String,
    pub link_prefetch_threshold: f64,
    pub prefetch_delay_ms: u64,
    /// Tasks longer than this are counted
    pub long_task_threshold_ms: f64,
    pub dns_prefetch_domains: Vec<String>,
    pub preconnect_domains: Vec<String>,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            enable_resource_priorities: true,
            enable_image_lazy_loading: true,
            enable_link_prefetching: true,
            enable_performance_monitoring: true,
            critical_stylesheet: "custom.css".to_string(),
            deferred_scripts: Vec::new(),
            critical_resource_timeout_ms: 3000,
            image_loading_threshold: 0.1,
            image_root_margin: "50px 0px".to_string(),
            link_prefetch_threshold: 0.1,
            prefetch_delay_ms: 1000,
            long_task_threshold_ms: 50.0,
            dns_prefetch_domains: vec![
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            preconnect_domains: vec!["fonts.gstatic.com".to_string()],
        }
    }
}

impl PerfConfig {
    /// Merge a partial JSON object over the defaults
    pub fn from_json(json: &str) -> Result<Self, PerfError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PerfError> {
        for threshold in [self.image_loading_threshold, self.link_prefetch_threshold] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(PerfError::InvalidThreshold(threshold));
            }
        }
        Ok(())
    }
}
