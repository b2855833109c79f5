//! Source parsers
//!
//! Best-effort recovery of structured components from an installation's files.
//! Per-entry problems are collected as error strings next to the recovered items;
//! only unreadable or structurally unrecognizable files fail as a whole.

pub mod env_settings;
pub mod models_source;
pub mod phase_metadata;
pub mod prompts_dir;
pub mod scan;

/// Items recovered from one source plus the entries that had to be skipped.
#[derive(Debug, Clone)]
pub struct ParseOutput<T> {
    pub items: Vec<T>,
    pub errors: Vec<String>,
}

impl<T> Default for ParseOutput<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}
