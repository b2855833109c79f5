//! Latency instrumentation
//!
//! Soft budgets for pipeline stages. Elapsed time is always logged at debug; an
//! overrun logs a warning and yields a warning string for the caller's report.
//! Budgets never cancel or fail the measured work.

use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A named latency budget.
#[derive(Debug, Clone)]
pub struct LatencyBudget {
    label: String,
    budget: Duration,
}

/// Outcome of a measured stage.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
    pub warning: Option<String>,
}

impl LatencyBudget {
    pub fn new(label: impl Into<String>, budget: Duration) -> Self {
        Self {
            label: label.into(),
            budget,
        }
    }

    /// Measure an async stage.
    pub async fn measure<F, T>(&self, fut: F) -> Timed<T>
    where
        F: Future<Output = T>,
    {
        let started = Instant::now();
        let value = fut.await;
        self.finish(value, started.elapsed())
    }

    /// Measure a synchronous stage.
    pub fn measure_sync<F, T>(&self, f: F) -> Timed<T>
    where
        F: FnOnce() -> T,
    {
        let started = Instant::now();
        let value = f();
        self.finish(value, started.elapsed())
    }

    /// Check an elapsed duration measured elsewhere.
    pub fn check(&self, elapsed: Duration) -> Option<String> {
        debug!(
            stage = %self.label,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = self.budget.as_millis() as u64,
            "Stage finished"
        );
        if elapsed > self.budget {
            let message = format!(
                "{} took {}ms, exceeding its {}ms budget",
                self.label,
                elapsed.as_millis(),
                self.budget.as_millis()
            );
            warn!(stage = %self.label, "{}", message);
            Some(message)
        } else {
            None
        }
    }

    fn finish<T>(&self, value: T, elapsed: Duration) -> Timed<T> {
        let warning = self.check(elapsed);
        Timed {
            value,
            elapsed,
            warning,
        }
    }
}
