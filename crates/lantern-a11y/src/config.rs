//! Accessibility configuration
//!
//! Feature switches and tunables. Callers pass a partial JSON object;
//! every missing key falls back to its default.

use serde::{Deserialize, Serialize};

use crate::A11yError;

/// Accessibility manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct A11yConfig {
    pub enable_keyboard_navigation: bool,
    pub enable_focus_management: bool,
    pub enable_aria_support: bool,
    pub enable_contrast_checking: bool,
    pub enable_screen_reader_support: bool,
    /// Page audit at setup (development builds only)
    pub enable_accessibility_testing: bool,
    pub skip_link_text: String,
    /// Minimum acceptable contrast ratio (WCAG AA body text)
    pub contrast_threshold: f64,
    /// Delay before an announcement is cleared
    pub announcement_clear_ms: u64,
    /// Delay between a route change and moving focus to the main region
    pub navigation_focus_delay_ms: u64,
    /// How long the main region keeps its temporary `tabindex`
    pub temporary_tabindex_ms: u64,
    pub labels: A11yLabels,
}

impl Default for A11yConfig {
    fn default() -> Self {
        Self {
            enable_keyboard_navigation: true,
            enable_focus_management: true,
            enable_aria_support: true,
            enable_contrast_checking: true,
            enable_screen_reader_support: true,
            enable_accessibility_testing: false,
            skip_link_text: "跳转到主内容".to_string(),
            contrast_threshold: 4.5,
            announcement_clear_ms: 1000,
            navigation_focus_delay_ms: 100,
            temporary_tabindex_ms: 1000,
            labels: A11yLabels::default(),
        }
    }
}

impl A11yConfig {
    /// Merge a partial JSON object over the defaults
    pub fn from_json(json: &str) -> Result<Self, A11yError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), A11yError> {
        if !(1.0..=21.0).contains(&self.contrast_threshold) {
            return Err(A11yError::InvalidThreshold(self.contrast_threshold));
        }
        Ok(())
    }
}

/// Text the passes write into the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct A11yLabels {
    pub main_navigation: String,
    pub sidebar_navigation: String,
    pub document_outline: String,
    pub main_content: String,
    pub search: String,
    pub close_sidebar: String,
    /// `{feature_prefix}{n}: {title}`
    pub feature_prefix: String,
    /// Appended to external link labels
    pub new_tab: String,
    /// Appended to download link labels after the extension
    pub file_download: String,
}

impl Default for A11yLabels {
    fn default() -> Self {
        Self {
            main_navigation: "主导航".to_string(),
            sidebar_navigation: "侧边栏导航".to_string(),
            document_outline: "文档大纲".to_string(),
            main_content: "主要内容".to_string(),
            search: "搜索文档".to_string(),
            close_sidebar: "关闭侧边栏".to_string(),
            feature_prefix: "特性".to_string(),
            new_tab: "在新标签页中打开".to_string(),
            file_download: "文件下载".to_string(),
        }
    }
}
