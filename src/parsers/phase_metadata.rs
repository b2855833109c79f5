//! Phase/model metadata document: the JSON form of a model profile.

use crate::component::ModelProfile;
use crate::error::ParseError;
use std::path::Path;

/// Read the metadata document if it exists. A missing file yields `None`.
pub async fn parse_file(path: &Path) -> Result<Option<ModelProfile>, ParseError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => parse_str(&text)
            .map(Some)
            .map_err(|message| ParseError::syntax(path, message)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ParseError::io(path, e)),
    }
}

pub fn parse_str(text: &str) -> Result<ModelProfile, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}
