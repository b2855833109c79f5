//! Write concurrency derived from file count and memory pressure.

use crate::config::SyncConfig;
use sysinfo::{MemoryRefreshKind, System};

/// Source of the current memory usage ratio (used / total).
pub trait MemoryProbe: Send + Sync {
    /// None when the platform cannot report memory.
    fn usage_ratio(&self) -> Option<f64>;
}

/// Samples system memory through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMemoryProbe;

impl MemoryProbe for SystemMemoryProbe {
    fn usage_ratio(&self) -> Option<f64> {
        let mut sys = System::new();
        sys.refresh_memory_specifics(MemoryRefreshKind::everything());
        let total = sys.total_memory();
        if total == 0 {
            tracing::warn!("could not detect system memory; skipping pressure check");
            return None;
        }
        Some(sys.used_memory() as f64 / total as f64)
    }
}

/// Number of files written at once.
///
/// `min(max_concurrency, file_count)`, reduced by the step (not below the floor)
/// when memory usage exceeds the threshold. Never above `file_count`, never below 1.
pub fn effective_concurrency(file_count: usize, config: &SyncConfig, usage: Option<f64>) -> usize {
    let base = config.max_concurrency.min(file_count);
    let pressured = usage.map(|u| u > config.memory_threshold).unwrap_or(false);
    let reduced = if pressured {
        base.saturating_sub(config.concurrency_step_down)
            .max(config.min_concurrency)
    } else {
        base
    };
    reduced.min(file_count).max(1)
}
