//! Ordered chain of external sources

use super::external::{ExternalSource, JsonSource};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One entry of the external sources descriptor document.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    pub path: String,
    pub format: String,
    #[serde(default)]
    pub keymap: BTreeMap<String, String>,
}

/// External sources tried in construction order; the first one that yields a value wins.
#[derive(Debug, Default)]
pub struct ExternalSourceChain {
    path: String,
    sources: Vec<Box<dyn ExternalSource>>,
}

impl ExternalSourceChain {
    /// Build the chain from the YAML descriptor at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let descriptors: Vec<SourceDescriptor> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::document(path, e))?
        };
        Self::from_descriptors(path.display().to_string(), descriptors)
    }

    /// Entries whose backing document is missing are dropped; an unknown format tag is fatal.
    pub fn from_descriptors(path: impl Into<String>, descriptors: Vec<SourceDescriptor>) -> Result<Self> {
        let mut chain = Self { path: path.into(), sources: Vec::with_capacity(descriptors.len()) };
        for descriptor in descriptors {
            let opened = match descriptor.format.as_str() {
                "json" => JsonSource::open(&descriptor.path, descriptor.keymap),
                _ => {
                    return Err(ConfigError::ExternalSourceFormat {
                        path: descriptor.path,
                        format: descriptor.format,
                    })
                }
            };
            match opened {
                Ok(source) => chain.sources.push(Box::new(source)),
                Err(ConfigError::ExternalSourceMissing { path }) => {
                    tracing::warn!("Skipping missing external config source {}", path);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(chain)
    }

    pub fn from_sources(path: impl Into<String>, sources: Vec<Box<dyn ExternalSource>>) -> Self {
        Self { path: path.into(), sources }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_paths(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.path())
    }

    pub fn get(&self, key: &str) -> Result<Value> {
        for source in &self.sources {
            match source.get(key) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_key_miss() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ConfigError::KeyNotFoundAnywhere { chain: self.path.clone(), key: key.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn keymap(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn boxed(path: &str, map: &[(&str, &str)], doc: Value) -> Box<dyn ExternalSource> {
        Box::new(JsonSource::from_document(path, keymap(map), doc))
    }

    #[test]
    fn first_source_in_order_wins() {
        let chain = ExternalSourceChain::from_sources(
            "sources.yaml",
            vec![
                boxed("first.json", &[("HOST", "host")], json!({"host": "first"})),
                boxed("second.json", &[("HOST", "host"), ("PORT", "port")], json!({"host": "second", "port": 80})),
            ],
        );
        assert_eq!(chain.get("HOST").unwrap(), json!("first"));
        assert_eq!(chain.get("PORT").unwrap(), json!(80));
    }

    #[test]
    fn falls_through_sources_missing_the_path() {
        let chain = ExternalSourceChain::from_sources(
            "sources.yaml",
            vec![
                boxed("first.json", &[("HOST", "net:host")], json!({"net": {}})),
                boxed("second.json", &[("HOST", "host")], json!({"host": "second"})),
            ],
        );
        assert_eq!(chain.get("HOST").unwrap(), json!("second"));
    }

    #[test]
    fn unknown_key_is_not_found_anywhere() {
        let chain = ExternalSourceChain::from_sources(
            "sources.yaml",
            vec![boxed("first.json", &[("HOST", "host")], json!({"host": "a"}))],
        );
        let err = chain.get("PORT").unwrap_err();
        match err {
            ConfigError::KeyNotFoundAnywhere { chain, key } => {
                assert_eq!(chain, "sources.yaml");
                assert_eq!(key, "PORT");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn structural_mismatch_is_surfaced() {
        let chain = ExternalSourceChain::from_sources(
            "sources.yaml",
            vec![
                boxed("first.json", &[("HOST", "host:name")], json!({"host": "flat"})),
                boxed("second.json", &[("HOST", "host")], json!({"host": "second"})),
            ],
        );
        assert!(matches!(chain.get("HOST"), Err(ConfigError::KeyPathMismatch { .. })));
    }

    #[test]
    fn load_skips_missing_documents() {
        let tmp = TempDir::new().expect("tmp");
        let present = tmp.path().join("present.json");
        fs::write(&present, r#"{"mail": {"user": "ops"}}"#).expect("write");
        let descriptor = tmp.path().join("external_config_sources.yaml");
        fs::write(
            &descriptor,
            format!(
                "- path: {}\n  format: json\n  keymap:\n    MAIL_USER: mail:user\n\
                 - path: {}\n  format: json\n  keymap:\n    MAIL_USER: user\n",
                tmp.path().join("absent.json").display(),
                present.display()
            ),
        )
        .expect("write");

        let chain = ExternalSourceChain::load(&descriptor).expect("chain");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.get("MAIL_USER").unwrap(), json!("ops"));
    }

    #[test]
    fn unsupported_format_is_fatal() {
        let descriptors = vec![SourceDescriptor {
            path: "/nonexistent/settings.ini".to_string(),
            format: "ini".to_string(),
            keymap: BTreeMap::new(),
        }];
        let err = ExternalSourceChain::from_descriptors("sources.yaml", descriptors).unwrap_err();
        assert!(matches!(err, ConfigError::ExternalSourceFormat { ref format, .. } if format == "ini"));
    }

    #[test]
    fn empty_descriptor_builds_empty_chain() {
        let tmp = TempDir::new().expect("tmp");
        let descriptor = tmp.path().join("external_config_sources.yaml");
        fs::write(&descriptor, "").expect("write");
        let chain = ExternalSourceChain::load(&descriptor).expect("chain");
        assert!(chain.is_empty());
    }
}
