//! Persona prompt documents: one `<agentType>.md` file per agent.

use super::ParseOutput;
use crate::component::validation::is_valid_agent_type;
use crate::component::{InjectionPoints, Prompt};
use crate::error::ParseError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Read every prompt document in `dir`. Symlinks are followed; subdirectories are
/// ignored and a dangling link is reported as a per-file error.
pub async fn parse_dir(dir: &Path) -> Result<ParseOutput<Prompt>, ParseError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ParseError::io(dir, e))?;

    let mut files = Vec::new();
    let mut output = ParseOutput::default();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ParseError::io(dir, e))?
    {
        let path = entry.path();
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => output.errors.push(ParseError::io(&path, e).to_string()),
        }
    }
    files.sort();

    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let agent_type = match agent_type_from_file_name(&file_name) {
            Some(t) => t,
            None => {
                output.errors.push(format!(
                    "{}: file name must be <agent_type>.md with agent_type matching [a-z_]+",
                    file_name
                ));
                continue;
            }
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => match parse_document(agent_type, &text) {
                Ok(prompt) => output.items.push(prompt),
                Err(e) => output.errors.push(format!("{}: {}", file_name, e)),
            },
            Err(e) => output.errors.push(ParseError::io(&path, e).to_string()),
        }
    }
    output.items.sort_by(|a, b| a.agent_type.cmp(&b.agent_type));

    debug!(
        dir = %dir.display(),
        prompts = output.items.len(),
        errors = output.errors.len(),
        "Parsed prompts directory"
    );
    Ok(output)
}

/// `coder.md` -> `coder`; None for names outside the accepted pattern.
pub fn agent_type_from_file_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(".md")?;
    is_valid_agent_type(stem).then_some(stem)
}

/// Parse one document: optional front matter, then the prompt body.
pub fn parse_document(agent_type: &str, text: &str) -> Result<Prompt, String> {
    let (front_matter, body) = split_front_matter(text);
    let body = body.trim();
    if body.is_empty() {
        return Err("prompt body is empty".to_string());
    }
    Ok(Prompt {
        agent_type: agent_type.to_string(),
        prompt_content: body.to_string(),
        injection_points: InjectionPoints::detect(body),
        front_matter,
    })
}

/// Split a leading `---` block from the body. Without a closing `---` line the
/// whole text is body.
fn split_front_matter(text: &str) -> (BTreeMap<String, String>, &str) {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next().unwrap_or("");
    if first.trim_end() != "---" {
        return (BTreeMap::new(), text);
    }

    let mut offset = first.len();
    let mut pairs = Vec::new();
    for line in lines {
        offset += line.len();
        if line.trim_end() == "---" {
            return (parse_pairs(&pairs), &text[offset..]);
        }
        pairs.push(line);
    }
    (BTreeMap::new(), text)
}

/// Flat `key: value` pairs; quotes around values are stripped. Other lines are skipped.
fn parse_pairs(lines: &[&str]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if key.is_empty() || key.starts_with('#') || line.starts_with(char::is_whitespace) {
                continue;
            }
            map.insert(key.to_string(), strip_quotes(value.trim()).to_string());
        }
    }
    map
}

pub(crate) fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return &value[1..value.len() - 1];
        }
    }
    value
}
