//! Override document loading

use crate::error::{ConfigError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Flat key -> value mapping read from a local or instance override document.
pub type OverrideDocument = BTreeMap<String, Value>;

/// Load an override document, dispatching on its extension.
///
/// A missing file is an empty mapping. Values are taken literally; nested tables stay nested.
pub fn load_override_document(path: &Path) -> Result<OverrideDocument> {
    if !path.exists() {
        return Ok(OverrideDocument::new());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed: Value = match ext.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| ConfigError::document(path, e))?,
        "yaml" | "yml" => {
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::document(path, e))?
            }
        }
        "json" => serde_json::from_str(&content).map_err(|e| ConfigError::document(path, e))?,
        other => {
            return Err(ConfigError::document(
                path,
                format!("unsupported override document extension '.{other}'"),
            ))
        }
    };

    match parsed {
        Value::Object(map) => Ok(map.into_iter().collect()),
        // An empty YAML document
        Value::Null => Ok(OverrideDocument::new()),
        _ => Err(ConfigError::document(path, "top level must be a mapping of option names to values")),
    }
}
