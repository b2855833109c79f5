//! Component Store
//!
//! Persistent storage for component records keyed by `(kind, name)`. The store
//! exclusively owns persisted state; every batch write goes through a single
//! transaction so readers observe either the prior or the fully-new state.

pub mod persistence;

pub use persistence::SledComponentStore;

use crate::component::{Component, ComponentDraft, ComponentKind};
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a batch upsert did with one draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub kind: ComponentKind,
    pub name: String,
    pub outcome: UpsertOutcome,
}

/// Component store interface
#[async_trait]
pub trait ComponentStore: Send + Sync {
    async fn get(&self, kind: ComponentKind, name: &str) -> Result<Option<Component>, StorageError>;

    /// All records, optionally restricted to one kind, ordered by kind then name.
    async fn list(&self, kind: Option<ComponentKind>) -> Result<Vec<Component>, StorageError>;

    /// All records with `enabled == true`.
    async fn list_enabled(&self) -> Result<Vec<Component>, StorageError> {
        Ok(self
            .list(None)
            .await?
            .into_iter()
            .filter(|c| c.enabled)
            .collect())
    }

    /// Insert a record only if `(kind, name)` is absent. Returns false when it exists.
    async fn insert_new(&self, record: &Component) -> Result<bool, StorageError>;

    /// Insert or overwrite a record.
    async fn put(&self, record: &Component) -> Result<(), StorageError>;

    /// Remove a record. Returns false when it did not exist.
    async fn delete(&self, kind: ComponentKind, name: &str) -> Result<bool, StorageError>;

    /// Create-or-update every draft inside one transaction.
    ///
    /// Drafts whose description and payload equal the stored record are left
    /// untouched, timestamps included.
    async fn upsert_batch(
        &self,
        drafts: &[ComponentDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<UpsertResult>, StorageError>;
}

/// Storage key for a component.
pub fn component_key(kind: ComponentKind, name: &str) -> String {
    format!("{}/{}", kind.as_str(), name)
}

/// Apply a draft on top of an existing record, or start a new one.
pub(crate) fn merge_draft(
    existing: Option<Component>,
    draft: &ComponentDraft,
    now: DateTime<Utc>,
) -> (Component, UpsertOutcome) {
    let payload = draft.config.to_string();
    match existing {
        None => (draft.clone().into_record(now, now), UpsertOutcome::Created),
        Some(current) if current.config == payload && current.description == draft.description => {
            (current, UpsertOutcome::Unchanged)
        }
        Some(mut current) => {
            current.description = draft.description.clone();
            current.config = payload;
            if draft.version.is_some() {
                current.version = draft.version.clone();
            }
            if draft.source_url.is_some() {
                current.source_url = draft.source_url.clone();
            }
            current.updated_at = now;
            (current, UpsertOutcome::Updated)
        }
    }
}
