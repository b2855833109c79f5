//! Components
//!
//! The generic persisted record and the typed configuration payloads it carries.
//! Every entity kind is stored as a [`Component`] whose `config` field holds the
//! serialized typed payload.

pub mod agent;
pub mod profile;
pub mod project;
pub mod prompt;
pub mod service;
pub mod validation;

pub use agent::AgentConfig;
pub use profile::ModelProfile;
pub use project::{CustomMcpServer, McpOverride, McpServerType, ProjectConfig};
pub use prompt::{InjectionPoints, Prompt};
pub use service::{ComponentPatch, ComponentService};
pub use validation::ValidationResult;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allowed thinking levels, shared by agent defaults and profile phases.
pub const THINKING_LEVELS: [&str; 5] = ["none", "low", "medium", "high", "ultrathink"];

/// Pipeline phases every model profile must cover.
pub const PHASES: [&str; 4] = ["spec", "planning", "coding", "qa"];

/// Model families a phase can be assigned to.
pub const MODELS: [&str; 3] = ["opus", "sonnet", "haiku"];

/// Kind of configuration entity held by a component record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    AgentConfig,
    Prompt,
    ModelProfile,
    ProjectConfig,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::AgentConfig,
        ComponentKind::Prompt,
        ComponentKind::ModelProfile,
        ComponentKind::ProjectConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::AgentConfig => "agent_config",
            ComponentKind::Prompt => "prompt",
            ComponentKind::ModelProfile => "model_profile",
            ComponentKind::ProjectConfig => "project_config",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown component kind '{}' (expected one of: agent_config, prompt, model_profile, project_config)",
                    s
                )
            })
    }
}

/// Persisted component record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Serialized JSON payload; shape depends on `kind`
    pub config: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl Component {
    /// Parse the stored payload into its typed form.
    pub fn typed(&self) -> Result<TypedComponent, String> {
        let value: serde_json::Value = serde_json::from_str(&self.config)
            .map_err(|e| format!("{} '{}': payload is not valid JSON: {}", self.kind, self.name, e))?;
        TypedComponent::from_value(self.kind, value)
            .map_err(|e| format!("{} '{}': {}", self.kind, self.name, e))
    }
}

/// Input for creating or upserting a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDraft {
    pub kind: ComponentKind,
    pub name: String,
    pub description: String,
    pub config: serde_json::Value,
    pub enabled: bool,
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub source_url: Option<String>,
}

impl ComponentDraft {
    pub fn new(kind: ComponentKind, name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            config,
            enabled: true,
            tags: Vec::new(),
            version: None,
            source_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a draft from a typed payload, naming it after the entity it carries.
    pub fn from_typed(typed: &TypedComponent) -> Result<Self, serde_json::Error> {
        let draft = Self::new(typed.kind(), typed.name(), typed.to_value()?);
        Ok(match typed {
            TypedComponent::ModelProfile(p) => draft.with_description(p.description.clone()),
            TypedComponent::Prompt(p) => match p.front_matter.get("description") {
                Some(d) => draft.with_description(d.clone()),
                None => draft,
            },
            _ => draft,
        })
    }

    /// Convert to a stored record with the given timestamps.
    pub fn into_record(self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Component {
        Component {
            kind: self.kind,
            name: self.name,
            description: self.description,
            config: self.config.to_string(),
            enabled: self.enabled,
            tags: self.tags,
            version: self.version,
            source_url: self.source_url,
            created_at,
            updated_at,
        }
    }
}

/// A component payload parsed into its typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedComponent {
    AgentConfig(AgentConfig),
    Prompt(Prompt),
    ModelProfile(ModelProfile),
    ProjectConfig(ProjectConfig),
}

impl TypedComponent {
    pub fn from_value(kind: ComponentKind, value: serde_json::Value) -> Result<Self, String> {
        let parsed = match kind {
            ComponentKind::AgentConfig => serde_json::from_value(value).map(Self::AgentConfig),
            ComponentKind::Prompt => serde_json::from_value(value).map(Self::Prompt),
            ComponentKind::ModelProfile => serde_json::from_value(value).map(Self::ModelProfile),
            ComponentKind::ProjectConfig => serde_json::from_value(value).map(Self::ProjectConfig),
        };
        parsed.map_err(|e| format!("payload does not match {} shape: {}", kind, e))
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            TypedComponent::AgentConfig(_) => ComponentKind::AgentConfig,
            TypedComponent::Prompt(_) => ComponentKind::Prompt,
            TypedComponent::ModelProfile(_) => ComponentKind::ModelProfile,
            TypedComponent::ProjectConfig(_) => ComponentKind::ProjectConfig,
        }
    }

    /// Natural name of the entity. Project configs carry no name of their own.
    pub fn name(&self) -> String {
        match self {
            TypedComponent::AgentConfig(c) => c.agent_type.clone(),
            TypedComponent::Prompt(p) => p.agent_type.clone(),
            TypedComponent::ModelProfile(p) => p.name.clone(),
            TypedComponent::ProjectConfig(_) => String::new(),
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            TypedComponent::AgentConfig(c) => serde_json::to_value(c),
            TypedComponent::Prompt(p) => serde_json::to_value(p),
            TypedComponent::ModelProfile(p) => serde_json::to_value(p),
            TypedComponent::ProjectConfig(p) => serde_json::to_value(p),
        }
    }

    /// Run the schema checks for this entity.
    pub fn validate(&self, name: &str) -> ValidationResult {
        match self {
            TypedComponent::AgentConfig(c) => validation::validate_agent_config(c),
            TypedComponent::Prompt(p) => validation::validate_prompt(p),
            TypedComponent::ModelProfile(p) => validation::validate_model_profile(p),
            TypedComponent::ProjectConfig(p) => validation::validate_project_config(name, p),
        }
    }
}
