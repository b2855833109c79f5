//! Sled-backed component store.

use super::{component_key, merge_draft, ComponentStore, UpsertOutcome, UpsertResult};
use crate::component::{Component, ComponentDraft, ComponentKind};
use crate::error::StorageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;
use tracing::debug;

const COMPONENTS_TREE: &str = "components";

/// Component store backed by a sled tree.
#[derive(Clone)]
pub struct SledComponentStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledComponentStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory store removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(COMPONENTS_TREE)?;
        Ok(Self { db, tree })
    }

    fn decode(key: &[u8], bytes: &[u8]) -> Result<Component, StorageError> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::InvalidRecord {
            key: String::from_utf8_lossy(key).into_owned(),
            reason: e.to_string(),
        })
    }

    async fn flush(&self) -> Result<(), StorageError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl ComponentStore for SledComponentStore {
    async fn get(&self, kind: ComponentKind, name: &str) -> Result<Option<Component>, StorageError> {
        let key = component_key(kind, name);
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(key.as_bytes(), &bytes)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, kind: Option<ComponentKind>) -> Result<Vec<Component>, StorageError> {
        let kinds: Vec<ComponentKind> = match kind {
            Some(k) => vec![k],
            None => ComponentKind::ALL.to_vec(),
        };
        let mut records = Vec::new();
        for kind in kinds {
            let prefix = format!("{}/", kind.as_str());
            for entry in self.tree.scan_prefix(prefix.as_bytes()) {
                let (key, bytes) = entry?;
                records.push(Self::decode(&key, &bytes)?);
            }
        }
        Ok(records)
    }

    async fn insert_new(&self, record: &Component) -> Result<bool, StorageError> {
        let key = component_key(record.kind, &record.name);
        let bytes = serde_json::to_vec(record)?;
        let swapped = self
            .tree
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_ok() {
            self.flush().await?;
        }
        Ok(swapped.is_ok())
    }

    async fn put(&self, record: &Component) -> Result<(), StorageError> {
        let key = component_key(record.kind, &record.name);
        self.tree.insert(key.as_bytes(), serde_json::to_vec(record)?)?;
        self.flush().await
    }

    async fn delete(&self, kind: ComponentKind, name: &str) -> Result<bool, StorageError> {
        let removed = self.tree.remove(component_key(kind, name).as_bytes())?;
        self.flush().await?;
        Ok(removed.is_some())
    }

    async fn upsert_batch(
        &self,
        drafts: &[ComponentDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<UpsertResult>, StorageError> {
        let result = self.tree.transaction(|tx| {
            let mut results = Vec::with_capacity(drafts.len());
            for draft in drafts {
                let key = component_key(draft.kind, &draft.name);
                let existing = match tx.get(key.as_bytes())? {
                    Some(bytes) => Some(
                        Self::decode(key.as_bytes(), &bytes)
                            .map_err(|e| ConflictableTransactionError::Abort(e.to_string()))?,
                    ),
                    None => None,
                };
                let (record, outcome) = merge_draft(existing, draft, now);
                if outcome != UpsertOutcome::Unchanged {
                    let bytes = serde_json::to_vec(&record)
                        .map_err(|e| ConflictableTransactionError::Abort(e.to_string()))?;
                    tx.insert(key.as_bytes(), bytes)?;
                }
                results.push(UpsertResult {
                    kind: draft.kind,
                    name: draft.name.clone(),
                    outcome,
                });
            }
            Ok(results)
        });

        let results = result.map_err(|e| match e {
            TransactionError::Abort(reason) => StorageError::Transaction(reason),
            TransactionError::Storage(err) => StorageError::Sled(err),
        })?;
        self.flush().await?;
        debug!(items = results.len(), "Committed component batch");
        Ok(results)
    }
}
