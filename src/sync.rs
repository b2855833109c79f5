//! Sync Orchestrator
//!
//! Renders the cached component snapshot into an installation's files. Writes run
//! in batches sized by [`concurrency::effective_concurrency`]; each write is
//! independent, so one failure is reported without affecting its siblings.

pub mod concurrency;
pub mod writer;

pub use concurrency::{MemoryProbe, SystemMemoryProbe};

use crate::cache::ComponentCache;
use crate::config::{LayoutConfig, SyncConfig};
use crate::error::ApiError;
use crate::generators::{plan_files, PlannedFile};
use crate::instrument::LatencyBudget;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub dry_run: bool,
    pub written_count: usize,
    /// Written paths, or the planned paths for a dry run
    pub files_written: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub concurrency: usize,
    pub warnings: Vec<String>,
}

pub struct SyncOrchestrator {
    cache: Arc<ComponentCache>,
    probe: Arc<dyn MemoryProbe>,
    layout: LayoutConfig,
    config: SyncConfig,
    project_name: String,
}

impl SyncOrchestrator {
    pub fn new(
        cache: Arc<ComponentCache>,
        layout: LayoutConfig,
        config: SyncConfig,
        project_name: impl Into<String>,
    ) -> Self {
        Self::with_probe(cache, layout, config, project_name, Arc::new(SystemMemoryProbe))
    }

    pub fn with_probe(
        cache: Arc<ComponentCache>,
        layout: LayoutConfig,
        config: SyncConfig,
        project_name: impl Into<String>,
        probe: Arc<dyn MemoryProbe>,
    ) -> Self {
        Self {
            cache,
            probe,
            layout,
            config,
            project_name: project_name.into(),
        }
    }

    /// Sync the installation rooted at `target`.
    pub async fn sync(&self, target: &Path, dry_run: bool) -> Result<SyncReport, ApiError> {
        let budget = LatencyBudget::new("sync", self.config.latency_budget());
        let timed = budget.measure(self.run(target, dry_run)).await;
        let mut report = timed.value?;
        report.warnings.extend(timed.warning);
        info!(
            target = %target.display(),
            dry_run,
            written = report.written_count,
            errors = report.errors.len(),
            concurrency = report.concurrency,
            elapsed_ms = timed.elapsed.as_millis() as u64,
            "Sync finished"
        );
        Ok(report)
    }

    async fn run(&self, target: &Path, dry_run: bool) -> Result<SyncReport, ApiError> {
        let is_dir = tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ApiError::ConfigError(format!(
                "Target path {} is not an existing directory",
                target.display()
            )));
        }

        let snapshot = self.cache.snapshot().await?;
        let plan = LatencyBudget::new("sync.plan", self.config.latency_budget())
            .measure_sync(|| plan_files(&snapshot, &self.layout, &self.project_name));
        let planned = plan.value?;
        let concurrency = concurrency::effective_concurrency(
            planned.len(),
            &self.config,
            self.probe.usage_ratio(),
        );
        debug!(files = planned.len(), concurrency, "Planned sync");

        if dry_run {
            return Ok(SyncReport {
                dry_run: true,
                written_count: planned.len(),
                files_written: planned.iter().map(|f| target.join(&f.relative_path)).collect(),
                concurrency,
                warnings: plan.warning.into_iter().collect(),
                ..SyncReport::default()
            });
        }

        let mut report = self.write_all(target, &planned, concurrency).await;
        report.concurrency = concurrency;
        report.warnings.extend(plan.warning);
        Ok(report)
    }

    async fn write_all(&self, target: &Path, planned: &[PlannedFile], concurrency: usize) -> SyncReport {
        let mut report = SyncReport::default();
        let pause = planned.len() > self.config.large_batch_threshold;
        let batches: Vec<&[PlannedFile]> = planned.chunks(concurrency.max(1)).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let writes = batch.iter().map(|file| {
                let path = target.join(&file.relative_path);
                async move {
                    let result = writer::write_with_backup(&path, &file.contents).await;
                    (path, result)
                }
            });
            for (path, result) in join_all(writes).await {
                match result {
                    Ok(written) => {
                        report.written_count += 1;
                        report.files_written.push(written.path);
                        report.backups.extend(written.backup);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to write file");
                        report.errors.push(format!("{}: {}", path.display(), e));
                    }
                }
            }
            if pause && index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_pause()).await;
            }
        }
        report
    }
}
