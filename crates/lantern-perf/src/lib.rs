//! Lantern Performance
//!
//! Loading and telemetry optimizations for an already rendered page:
//! - Critical resource priorities and deferred third-party scripts
//! - Lazy image loading through intersection observation
//! - Prefetch hints for same-origin links entering the viewport
//! - Core Web Vitals and navigation timing
//! - Device capability heuristics

mod config;
mod device;
mod lazy_load;
mod manager;
mod prefetch;
mod resources;
mod vitals;

pub use config::PerfConfig;
pub use device::{
    PerformanceLevel, device_memory, hardware_concurrency, is_data_saver_mode,
    is_slow_connection, performance_level,
};
pub use manager::{LifecycleState, PerformanceManager};
pub use vitals::{Metrics, metric};

/// Same-origin relative links
pub(crate) const INTERNAL_LINK_SELECTOR: &str = "a[href^=\"/\"], a[href^=\"./\"], a[href^=\"../\"]";

/// Performance error
#[derive(Debug, thiserror::Error)]
pub enum PerfError {
    #[error("Invalid performance config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Invalid intersection threshold {0}: must be between 0 and 1")]
    InvalidThreshold(f64),
}
