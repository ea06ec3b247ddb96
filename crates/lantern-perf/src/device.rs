//! Device capability heuristics

use lantern_dom::Environment;
use serde::Serialize;

const DEFAULT_DEVICE_MEMORY_GB: f64 = 4.0;
const DEFAULT_HARDWARE_CONCURRENCY: u32 = 4;

/// Coarse device tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

/// `slow-2g` or `2g` effective connection
pub fn is_slow_connection(env: &Environment) -> bool {
    env.network
        .as_ref()
        .and_then(|n| n.effective_type.as_deref())
        .is_some_and(|t| matches!(t, "slow-2g" | "2g"))
}

pub fn is_data_saver_mode(env: &Environment) -> bool {
    env.network.as_ref().is_some_and(|n| n.save_data)
}

/// Gigabytes, assuming 4 when unknown
pub fn device_memory(env: &Environment) -> f64 {
    env.device.device_memory.unwrap_or(DEFAULT_DEVICE_MEMORY_GB)
}

/// Logical cores, assuming 4 when unknown
pub fn hardware_concurrency(env: &Environment) -> u32 {
    env.device
        .hardware_concurrency
        .filter(|&c| c > 0)
        .unwrap_or(DEFAULT_HARDWARE_CONCURRENCY)
}

pub fn performance_level(env: &Environment) -> PerformanceLevel {
    let memory = device_memory(env);
    let cores = hardware_concurrency(env);

    if memory <= 2.0 || cores <= 2 || is_slow_connection(env) || is_data_saver_mode(env) {
        PerformanceLevel::Low
    } else if memory <= 4.0 || cores <= 4 {
        PerformanceLevel::Medium
    } else {
        PerformanceLevel::High
    }
}
