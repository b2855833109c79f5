//! Per-phase model and thinking profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each pipeline phase to a model and a thinking level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub phase_models: BTreeMap<String, String>,
    pub phase_thinking: BTreeMap<String, String>,
}
