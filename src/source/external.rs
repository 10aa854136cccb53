//! External config sources backed by nested documents

use crate::error::{ConfigError, Result};
use crate::utils::paths::expand_path;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;

/// Separator between segments of a source-internal key path, e.g. `database:primary:host`.
pub const KEY_PATH_DELIMITER: char = ':';

/// A flat key -> value view over one backing document.
pub trait ExternalSource: fmt::Debug {
    /// Locator of the backing document, as written in the descriptor.
    fn path(&self) -> &str;

    /// Logical key -> source-internal key path.
    fn keymap(&self) -> &BTreeMap<String, String>;

    /// Resolve a source-internal key path inside the backing document.
    fn lookup(&self, key: &str, key_path: &str) -> Result<Value>;

    fn get(&self, key: &str) -> Result<Value> {
        let key_path = self.keymap().get(key).ok_or_else(|| ConfigError::KeyNotProvided {
            source_path: self.path().to_string(),
            key: key.to_string(),
        })?;
        self.lookup(key, key_path)
    }
}

/// External source reading a JSON document of nested objects.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: String,
    keymap: BTreeMap<String, String>,
    document: Value,
}

impl JsonSource {
    /// Read the backing document at `path` (after `$VAR` and `~` expansion).
    ///
    /// Fails with [`ConfigError::ExternalSourceMissing`] when the file does not exist.
    pub fn open(path: &str, keymap: BTreeMap<String, String>) -> Result<Self> {
        let resolved = expand_path(path);
        if !resolved.exists() {
            return Err(ConfigError::ExternalSourceMissing { path: path.to_string() });
        }
        let content = fs::read_to_string(&resolved).map_err(|e| ConfigError::io(&resolved, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::document(&resolved, e))?;
        Ok(Self::from_document(path, keymap, document))
    }

    pub fn from_document(
        path: impl Into<String>,
        keymap: BTreeMap<String, String>,
        document: Value,
    ) -> Self {
        Self { path: path.into(), keymap, document }
    }
}

impl ExternalSource for JsonSource {
    fn path(&self) -> &str {
        &self.path
    }

    fn keymap(&self) -> &BTreeMap<String, String> {
        &self.keymap
    }

    fn lookup(&self, key: &str, key_path: &str) -> Result<Value> {
        let mut node = &self.document;
        for segment in key_path.split(KEY_PATH_DELIMITER) {
            node = match node {
                Value::Object(map) => map.get(segment).ok_or_else(|| ConfigError::KeyNotFound {
                    source_path: self.path.clone(),
                    key: key.to_string(),
                    key_path: key_path.to_string(),
                })?,
                // An explicit null where a mapping is expected reads as "absent".
                Value::Null => {
                    return Err(ConfigError::KeyNotFound {
                        source_path: self.path.clone(),
                        key: key.to_string(),
                        key_path: key_path.to_string(),
                    })
                }
                _ => {
                    return Err(ConfigError::KeyPathMismatch {
                        source_path: self.path.clone(),
                        key: key.to_string(),
                        key_path: key_path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }
        Ok(node.clone())
    }
}
