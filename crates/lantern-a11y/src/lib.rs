//! Lantern Accessibility
//!
//! Retrofits keyboard navigation, focus management, ARIA attribution,
//! screen-reader support and contrast diagnostics onto an already
//! rendered document.
//!
//! Features:
//! - Keyboard navigation (Escape, Tab, activation, arrow keys, Home/End)
//! - Focus indicators, focus traps and focus after route changes
//! - Landmark, heading, image and form annotation
//! - Live-region announcements
//! - Contrast checking and page audits (development builds)

mod aria;
mod audit;
mod config;
mod contrast;
mod focus;
mod forms;
mod keyboard_nav;
mod live_region;
mod manager;
mod navigation;
mod preferences;

pub use audit::{A11yIssue, AuditReport, HeadingSkip, IssueSeverity};
pub use config::{A11yConfig, A11yLabels};
pub use contrast::{ContrastChecker, ContrastIssue};
pub use focus::InputMethod;
pub use live_region::Priority;
pub use manager::{AccessibilityManager, AccessibilityReport, LifecycleState};
pub use preferences::{is_using_assistive_technology, prefers_high_contrast, prefers_reduced_motion};

/// Elements that act as buttons without a native keyboard contract
pub(crate) const INTERACTIVE_SELECTOR: &str =
    ".VPFeature, .VPButton:not(button), [onclick]:not(button)";

/// Main content region, in lookup order
pub(crate) const MAIN_REGION_SELECTOR: &str = "main, [role=\"main\"], .VPContent";

/// Accessibility error
#[derive(Debug, thiserror::Error)]
pub enum A11yError {
    #[error("Invalid accessibility config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Invalid contrast threshold {0}: must be between 1 and 21")]
    InvalidThreshold(f64),
}
