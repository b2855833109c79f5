//! Persona prompt documents and their injection markers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SPEC_DIRECTORY_MARKER: &str = "{{specDirectory}}";
pub const PROJECT_CONTEXT_MARKER: &str = "{{projectContext}}";
pub const MCP_DOCUMENTATION_MARKER: &str = "{{mcpDocumentation}}";

/// Persona prompt for one agent type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub agent_type: String,
    pub prompt_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_points: Option<InjectionPoints>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub front_matter: BTreeMap<String, String>,
}

impl Prompt {
    /// Build a prompt, deriving injection points from the content.
    pub fn new(agent_type: impl Into<String>, prompt_content: impl Into<String>) -> Self {
        let prompt_content = prompt_content.into();
        Self {
            agent_type: agent_type.into(),
            injection_points: InjectionPoints::detect(&prompt_content),
            prompt_content,
            front_matter: BTreeMap::new(),
        }
    }
}

/// Which template markers appear in a prompt body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionPoints {
    #[serde(default)]
    pub spec_directory: bool,
    #[serde(default)]
    pub project_context: bool,
    #[serde(default)]
    pub mcp_documentation: bool,
}

impl InjectionPoints {
    /// Scan content for markers. None when no marker is present.
    pub fn detect(content: &str) -> Option<Self> {
        let points = Self {
            spec_directory: content.contains(SPEC_DIRECTORY_MARKER),
            project_context: content.contains(PROJECT_CONTEXT_MARKER),
            mcp_documentation: content.contains(MCP_DOCUMENTATION_MARKER),
        };
        points.any().then_some(points)
    }

    pub fn any(&self) -> bool {
        self.spec_directory || self.project_context || self.mcp_documentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_none_without_markers() {
        assert_eq!(InjectionPoints::detect("plain persona text"), None);
    }

    #[test]
    fn test_detect_subset() {
        let points =
            InjectionPoints::detect("Read {{specDirectory}} then {{projectContext}}.").unwrap();
        assert!(points.spec_directory);
        assert!(points.project_context);
        assert!(!points.mcp_documentation);
    }

    #[test]
    fn test_empty_front_matter_is_omitted() {
        let prompt = Prompt::new("qa", "You review every change carefully.");
        let value = serde_json::to_value(&prompt).unwrap();
        assert!(value.get("frontMatter").is_none());
        assert!(value.get("injectionPoints").is_none());
    }
}
