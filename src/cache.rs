//! Component Cache
//!
//! Holds one derived snapshot of every enabled component, parsed into typed form,
//! for a fixed time-to-live. Writes to the store do not invalidate the snapshot;
//! readers may see data up to one TTL old.

use crate::component::{AgentConfig, Component, ModelProfile, ProjectConfig, Prompt, TypedComponent};
use crate::error::ApiError;
use crate::instrument::LatencyBudget;
use crate::store::ComponentStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const SNAPSHOT_KEY: &str = "enabled_components";

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Every enabled component, parsed and ordered by name within each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSnapshot {
    pub agent_configs: Vec<AgentConfig>,
    pub prompts: Vec<Prompt>,
    pub model_profiles: Vec<ModelProfile>,
    /// Project configs keyed by their component name
    pub project_configs: Vec<(String, ProjectConfig)>,
}

impl ComponentSnapshot {
    /// Parse every record. Any failure rejects the whole set with every row error.
    pub fn from_records(records: &[Component]) -> Result<Self, Vec<String>> {
        let mut snapshot = Self::default();
        let mut errors = Vec::new();
        for record in records {
            match record.typed() {
                Ok(TypedComponent::AgentConfig(c)) => snapshot.agent_configs.push(c),
                Ok(TypedComponent::Prompt(p)) => snapshot.prompts.push(p),
                Ok(TypedComponent::ModelProfile(p)) => snapshot.model_profiles.push(p),
                Ok(TypedComponent::ProjectConfig(p)) => {
                    snapshot.project_configs.push((record.name.clone(), p))
                }
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        snapshot.agent_configs.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));
        snapshot.prompts.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));
        snapshot.model_profiles.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot.project_configs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(snapshot)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.project_configs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn profile(&self, name: &str) -> Option<&ModelProfile> {
        self.model_profiles.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.agent_configs.len()
            + self.prompts.len()
            + self.model_profiles.len()
            + self.project_configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<ComponentSnapshot>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL cache over the component store.
pub struct ComponentCache {
    store: Arc<dyn ComponentStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<&'static str, CacheEntry>>,
}

impl ComponentCache {
    pub fn new(store: Arc<dyn ComponentStore>, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn ComponentStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Current snapshot, loading it from the store when absent or expired.
    ///
    /// Concurrent misses each load from the store; the last writer wins.
    pub async fn snapshot(&self) -> Result<Arc<ComponentSnapshot>, ApiError> {
        let now = self.clock.now();
        self.sweep(now);
        let cached = self
            .entries
            .read()
            .get(SNAPSHOT_KEY)
            .map(|entry| entry.snapshot.clone());
        if let Some(snapshot) = cached {
            return Ok(snapshot);
        }

        // budgeted at one TTL
        let budget = LatencyBudget::new("cache.load", self.ttl);
        let loaded = budget.measure(self.store.list_enabled()).await;
        let records = loaded.value?;
        let snapshot = ComponentSnapshot::from_records(&records).map_err(ApiError::SnapshotInvalid)?;
        let snapshot = Arc::new(snapshot);
        debug!(components = snapshot.len(), "Loaded component snapshot");

        let entry = CacheEntry {
            snapshot: snapshot.clone(),
            expires_at: self.clock.now() + self.ttl,
        };
        self.entries.write().insert(SNAPSHOT_KEY, entry);
        Ok(snapshot)
    }

    fn sweep(&self, now: Instant) {
        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.is_expired(now));
    }
}
