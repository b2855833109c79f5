//! Switchboard: Agent Configuration Import and Sync
//!
//! Recovers agent permissions, prompts, model profiles, and integration settings
//! from an installation's files, keeps them in a component store, and renders them
//! back into an installation on demand.

pub mod cache;
pub mod component;
pub mod config;
pub mod error;
pub mod generators;
pub mod import;
pub mod instrument;
pub mod logging;
pub mod parsers;
pub(crate) mod regex_util;
pub mod store;
pub mod sync;
pub mod tooling;

pub use cache::{ComponentCache, ComponentSnapshot};
pub use component::{Component, ComponentDraft, ComponentKind, TypedComponent};
pub use config::SwitchboardConfig;
pub use error::{ApiError, ParseError, StorageError};
pub use import::{ImportOrchestrator, ImportReport};
pub use store::{ComponentStore, SledComponentStore};
pub use sync::{SyncOrchestrator, SyncReport};
