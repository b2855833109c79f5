//! Schema validation for component payloads.
//!
//! Checks never short-circuit: every rule runs and every failure is recorded, so a
//! batch validation reports all problems at once.

use super::{
    AgentConfig, ComponentKind, McpServerType, ModelProfile, ProjectConfig, Prompt,
    TypedComponent, MODELS, PHASES, THINKING_LEVELS,
};
use crate::component::prompt::{
    MCP_DOCUMENTATION_MARKER, PROJECT_CONTEXT_MARKER, SPEC_DIRECTORY_MARKER,
};
use crate::regex_util::static_regex;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

pub const MIN_PROMPT_CHARS: usize = 10;
pub const MAX_PROMPT_CHARS: usize = 50_000;

static_regex!(fn agent_type_pattern, r"^[a-z_]+$");
static_regex!(fn settings_id_pattern, r"^[a-z0-9_]+$");

/// Outcome of validating one entity.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// `<kind> '<name>'`
    pub subject: String,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(kind: ComponentKind, name: &str) -> Self {
        Self {
            subject: format!("{} '{}'", kind, name),
            checks: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Record a check, adding `error` when it fails.
    fn require(&mut self, description: &str, passed: bool, error: impl FnOnce() -> String) {
        self.add_check(description, passed);
        if !passed {
            self.add_error(error());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.checks.iter().all(|(_, passed)| *passed)
    }

    /// Errors prefixed with the subject, for batch reporting.
    pub fn prefixed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", self.subject, e))
            .collect()
    }
}

pub fn is_valid_agent_type(agent_type: &str) -> bool {
    agent_type_pattern().is_match(agent_type)
}

pub fn validate_agent_config(config: &AgentConfig) -> ValidationResult {
    let mut result = ValidationResult::new(ComponentKind::AgentConfig, &config.agent_type);

    result.require("agentType format", is_valid_agent_type(&config.agent_type), || {
        format!(
            "agentType '{}' must contain only lowercase letters and underscores",
            config.agent_type
        )
    });
    result.require(
        "thinkingDefault level",
        THINKING_LEVELS.contains(&config.thinking_default.as_str()),
        || {
            format!(
                "thinkingDefault '{}' must be one of: {}",
                config.thinking_default,
                THINKING_LEVELS.join(", ")
            )
        },
    );

    let required: HashSet<&str> = config.mcp_servers.iter().map(String::as_str).collect();
    let mut overlap: Vec<&str> = config
        .mcp_servers_optional
        .iter()
        .map(String::as_str)
        .filter(|s| required.contains(s))
        .collect();
    overlap.sort_unstable();
    overlap.dedup();
    result.require("mcpServers disjoint from mcpServersOptional", overlap.is_empty(), || {
        format!(
            "servers listed as both required and optional: {}",
            overlap.join(", ")
        )
    });

    let blank_tool = config.tools.iter().any(|t| t.trim().is_empty());
    result.require("tools non-blank", !blank_tool, || {
        "tools must not contain blank entries".to_string()
    });

    result
}

pub fn validate_prompt(prompt: &Prompt) -> ValidationResult {
    let mut result = ValidationResult::new(ComponentKind::Prompt, &prompt.agent_type);

    result.require("agentType format", is_valid_agent_type(&prompt.agent_type), || {
        format!(
            "agentType '{}' must contain only lowercase letters and underscores",
            prompt.agent_type
        )
    });

    let content = &prompt.prompt_content;
    let chars = content.chars().count();
    result.require("promptContent non-empty", !content.trim().is_empty(), || {
        "promptContent must not be empty".to_string()
    });
    result.require(
        "promptContent length",
        (MIN_PROMPT_CHARS..=MAX_PROMPT_CHARS).contains(&chars),
        || {
            format!(
                "promptContent has {} characters; expected {}..={}",
                chars, MIN_PROMPT_CHARS, MAX_PROMPT_CHARS
            )
        },
    );

    if let Some(points) = prompt.injection_points {
        result.require("injectionPoints non-empty", points.any(), || {
            "injectionPoints is present but flags no marker".to_string()
        });
        let markers = [
            ("specDirectory", points.spec_directory, SPEC_DIRECTORY_MARKER),
            ("projectContext", points.project_context, PROJECT_CONTEXT_MARKER),
            ("mcpDocumentation", points.mcp_documentation, MCP_DOCUMENTATION_MARKER),
        ];
        for (field, flagged, marker) in markers {
            let present = content.contains(marker);
            result.require(&format!("injectionPoints.{} matches content", field), flagged == present, || {
                if flagged {
                    format!("injectionPoints.{} is set but {} does not appear in content", field, marker)
                } else {
                    format!("{} appears in content but injectionPoints.{} is false", marker, field)
                }
            });
        }
    }

    result
}

pub fn validate_model_profile(profile: &ModelProfile) -> ValidationResult {
    let mut result = ValidationResult::new(ComponentKind::ModelProfile, &profile.name);

    result.require("name non-empty", !profile.name.trim().is_empty(), || {
        "name must not be empty".to_string()
    });
    check_phase_map(&mut result, "phaseModels", &profile.phase_models, &MODELS);
    check_phase_map(&mut result, "phaseThinking", &profile.phase_thinking, &THINKING_LEVELS);

    result
}

fn check_phase_map(
    result: &mut ValidationResult,
    field: &str,
    map: &BTreeMap<String, String>,
    allowed: &[&str],
) {
    for phase in PHASES {
        match map.get(phase) {
            None => result.require(&format!("{}.{} present", field, phase), false, || {
                format!("{} is missing phase '{}'", field, phase)
            }),
            Some(value) => result.require(
                &format!("{}.{} allowed", field, phase),
                allowed.contains(&value.as_str()),
                || {
                    format!(
                        "{}.{} has '{}'; expected one of: {}",
                        field,
                        phase,
                        value,
                        allowed.join(", ")
                    )
                },
            ),
        }
    }
    for key in map.keys().filter(|k| !PHASES.contains(&k.as_str())) {
        result.add_error(format!("{} has unknown phase '{}'", field, key));
    }
}

/// A value the settings file stores verbatim: no surrounding whitespace or quotes,
/// no line breaks, and none of the `forbidden` list separators.
fn is_settings_value(value: &str, forbidden: &[char]) -> bool {
    let quoted = value.len() >= 2
        && (value.starts_with('"') || value.starts_with('\''))
        && value.ends_with(&value[..1]);
    !value.is_empty()
        && value == value.trim()
        && !quoted
        && !value.contains(['\n', '\r'])
        && !value.contains(forbidden)
}

/// Project settings are persisted as flat `KEY=VALUE` lines, so every id, name,
/// and list item must survive that encoding unchanged.
pub fn validate_project_config(name: &str, config: &ProjectConfig) -> ValidationResult {
    let mut result = ValidationResult::new(ComponentKind::ProjectConfig, name);

    let mut seen = HashSet::new();
    for server in &config.custom_mcp_servers {
        let label = if server.id.is_empty() { "<blank>" } else { server.id.as_str() };
        result.require("custom server id format", settings_id_pattern().is_match(&server.id), || {
            format!(
                "custom MCP server id '{}' must contain only lowercase letters, digits, and underscores",
                label
            )
        });
        result.require("custom server id unique", seen.insert(server.id.as_str()), || {
            format!("custom MCP server id '{}' is defined more than once", label)
        });
        result.require("custom server name", is_settings_value(&server.name, &[]), || {
            format!(
                "custom MCP server '{}' name must be non-empty without surrounding spaces or quotes",
                label
            )
        });
        match server.server_type {
            McpServerType::Command => {
                let has_command = server
                    .command
                    .as_deref()
                    .map(|c| is_settings_value(c, &[]))
                    .unwrap_or(false);
                result.require("command server has command", has_command, || {
                    format!("custom MCP server '{}' of type command requires a command", label)
                });
                if let Some(args) = &server.args {
                    let valid = !args.is_empty()
                        && args.iter().all(|a| is_settings_value(a, &[' ', '\t']));
                    result.require("command args are single words", valid, || {
                        format!(
                            "custom MCP server '{}' args must be a non-empty list without whitespace inside items",
                            label
                        )
                    });
                }
            }
            McpServerType::Http => {
                let valid_url = server
                    .url
                    .as_deref()
                    .filter(|u| is_settings_value(u, &[]))
                    .map(|u| u.starts_with("http://") || u.starts_with("https://"))
                    .unwrap_or(false);
                result.require("http server has url", valid_url, || {
                    format!(
                        "custom MCP server '{}' of type http requires an http:// or https:// url",
                        label
                    )
                });
                if let Some(headers) = &server.headers {
                    let valid = !headers.is_empty()
                        && headers.iter().all(|(k, v)| {
                            is_settings_value(k, &[',', ':']) && is_settings_value(v, &[','])
                        });
                    result.require("http headers encodable", valid, || {
                        format!(
                            "custom MCP server '{}' headers must be non-empty; keys cannot contain ',' or ':' and values cannot contain ','",
                            label
                        )
                    });
                }
            }
        }
    }

    for (agent_type, over) in &config.agent_mcp_overrides {
        result.require("override agent type format", settings_id_pattern().is_match(agent_type), || {
            format!(
                "MCP override agent type '{}' must contain only lowercase letters, digits, and underscores",
                agent_type
            )
        });
        let valid = over
            .add
            .iter()
            .chain(&over.remove)
            .all(|s| is_settings_value(s, &[',']));
        result.require("override servers encodable", valid, || {
            format!(
                "MCP override for '{}' has a blank server or one containing ','",
                agent_type
            )
        });
    }

    if let Some(profile) = &config.model_profile {
        result.require("modelProfile non-empty", is_settings_value(profile, &[]), || {
            "modelProfile must not be blank or padded when set".to_string()
        });
    }

    result
}

/// Validate a batch of candidates, collecting every error with its subject prefix.
/// Duplicate `(kind, name)` pairs within the batch are reported as well.
pub fn validate_batch<'a, I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a TypedComponent)>,
{
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for (name, typed) in candidates {
        if !seen.insert((typed.kind(), name.to_string())) {
            errors.push(format!(
                "{} '{}': defined more than once in the batch",
                typed.kind(),
                name
            ));
        }
        errors.extend(typed.validate(name).prefixed_errors());
    }
    errors
}
