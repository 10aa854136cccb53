//! Config manager: owns the resolution context and the published namespace

use super::context::ResolutionContext;
use super::element::{ConfigElement, Resolved};
use super::loader::{load_override_document, OverrideDocument};
use super::names;
use super::namespace::Namespace;
use crate::error::{ConfigError, Result};
use crate::redact::mask_value;
use crate::render::{self, DocEntry, DocSection};
use crate::source::env::{env_prefix, environment_overrides};
use crate::source::ExternalSourceChain;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Assembles the configuration namespace from groups of elements loaded in order.
///
/// Each [`load_elements`](Self::load_elements) call resolves its elements against
/// everything published before it, so defaults may build on earlier values.
#[derive(Debug)]
pub struct ConfigManager {
    instance_name: String,
    context: ResolutionContext,
    docs: Vec<DocSection>,
    modules_loaded: Vec<String>,
}

impl ConfigManager {
    /// Manager for `instance_name`, snapshotting `<INSTANCE_NAME>_*` environment overrides.
    pub fn new(instance_name: impl Into<String>) -> Self {
        let instance_name = instance_name.into();
        let prefix = env_prefix(&instance_name);
        let overrides = environment_overrides(&prefix);
        tracing::debug!("Captured {} environment overrides with prefix {}", overrides.len(), prefix);
        Self::with_context(instance_name, ResolutionContext::new().with_environment_overrides(overrides))
    }

    pub fn with_context(instance_name: impl Into<String>, context: ResolutionContext) -> Self {
        Self {
            instance_name: instance_name.into(),
            context,
            docs: Vec::new(),
            modules_loaded: Vec::new(),
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn namespace(&self) -> &Namespace {
        self.context.namespace()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.namespace().get(name)
    }

    pub fn get_str(&self, name: &str) -> Result<&str> {
        self.namespace().get_str(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        self.namespace().get_bool(name)
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.namespace().get_i64(name)
    }

    pub fn get_path(&self, name: &str) -> Result<PathBuf> {
        self.namespace().get_path(name)
    }

    pub fn get_as<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.namespace().get_as(name)
    }

    /// Overwrite a published value after loading. Not recorded in the documentation views.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.context.namespace_mut().publish(name, value)
    }

    /// Resolve `elements` in order, publish each under its name and record a
    /// documentation section described by `doc`.
    ///
    /// The group is all or nothing: if any element fails, the namespace is restored
    /// to its state before the call and no section is recorded.
    pub fn load_elements<I>(&mut self, elements: I, doc: &str) -> Result<()>
    where
        I: IntoIterator<Item = ConfigElement>,
    {
        let snapshot = self.namespace().clone();
        match self.publish_group(elements) {
            Ok(entries) => {
                self.docs.push(DocSection { doc: doc.to_string(), entries });
                Ok(())
            }
            Err(e) => {
                *self.context.namespace_mut() = snapshot;
                Err(e)
            }
        }
    }

    fn publish_group<I>(&mut self, elements: I) -> Result<Vec<DocEntry>>
    where
        I: IntoIterator<Item = ConfigElement>,
    {
        let mut entries = Vec::new();
        for element in elements {
            let Resolved { value, source } = match element.resolve(&self.context) {
                Ok(resolved) => resolved,
                Err(e @ ConfigError::RequiredOptionUnset { .. }) => {
                    tracing::error!("Required config option not set in instance config: {}", element.name());
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            tracing::trace!("Resolved {} from {}", element.name(), source);

            entries.push(DocEntry {
                name: element.name().to_string(),
                doc: element.doc().to_string(),
                default: element.default_expr().text(),
                value: mask_value(&value, element.is_masked()),
                source,
            });
            self.context.namespace_mut().publish(element.name(), value);
        }
        Ok(entries)
    }

    /// Load the instance and local override documents and the external source chain
    /// from the paths published as `INSTANCE_CONFIG_FILE`, `LOCAL_CONFIG_FILE` and
    /// `EXTERNAL_CONFIG_SOURCES`.
    pub fn load_config_files(&mut self) -> Result<()> {
        let instance_file = self.namespace().get_path(names::INSTANCE_CONFIG_FILE)?;
        let local_file = self.namespace().get_path(names::LOCAL_CONFIG_FILE)?;
        let external_sources = self.namespace().get_path(names::EXTERNAL_CONFIG_SOURCES)?;

        self.context.set_instance_config(read_document("Instance Config", &instance_file)?);
        self.context.set_local_config(read_document("Local Config", &local_file)?);

        let chain = if external_sources.exists() {
            tracing::debug!("Loading External Configuration Maps from {}", external_sources.display());
            let chain = ExternalSourceChain::load(&external_sources)?;
            tracing::debug!(
                "Using {} external config sources: {}",
                chain.len(),
                chain.source_paths().collect::<Vec<_>>().join(", ")
            );
            Some(chain)
        } else {
            None
        };
        self.context.set_external_configs(chain);
        Ok(())
    }

    pub fn instance_config(&self) -> &OverrideDocument {
        self.context.instance_config()
    }

    pub fn local_config(&self) -> &OverrideDocument {
        self.context.local_config()
    }

    pub fn external_config(&self) -> Option<&ExternalSourceChain> {
        self.context.external_configs()
    }

    /// `path` relative to the resolved `INSTANCE_ROOT`.
    pub fn instance_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.namespace().get_path(names::INSTANCE_ROOT)?.join(path))
    }

    pub fn modules_loaded(&self) -> &[String] {
        &self.modules_loaded
    }

    pub(crate) fn mark_loaded(&mut self, module: &str) {
        self.modules_loaded.push(module.to_string());
    }

    pub fn doc_render(&self) -> &[DocSection] {
        &self.docs
    }

    pub fn render_introspection(&self) -> Value {
        render::render_introspection(&self.docs)
    }

    pub fn render_json(&self) -> Value {
        render::render_json(&self.docs)
    }

    pub fn render_log_lines(&self) -> Vec<String> {
        render::render_log_lines(&self.docs)
    }

    /// Emit the log-line view at INFO.
    pub fn log_config(&self) {
        for line in self.render_log_lines() {
            tracing::info!("{}", line);
        }
    }
}

fn read_document(label: &str, path: &Path) -> Result<OverrideDocument> {
    if path.exists() {
        tracing::debug!("Loading {} from {}", label, path.display());
    }
    load_override_document(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parsers;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn overrides(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn file_constants(root: &Path) -> Vec<ConfigElement> {
        let root = root.to_string_lossy().into_owned();
        vec![
            ConfigElement::constant(names::INSTANCE_ROOT, "Instance root").default_value(root),
            ConfigElement::constant(names::INSTANCE_CONFIG_FILE, "Instance config")
                .default_with("INSTANCE_ROOT/instance_config.toml", &[names::INSTANCE_ROOT], |s| {
                    s.join_path(names::INSTANCE_ROOT, &["instance_config.toml"])
                }),
            ConfigElement::constant(names::LOCAL_CONFIG_FILE, "Local config")
                .default_with("INSTANCE_ROOT/local_config_overrides.toml", &[names::INSTANCE_ROOT], |s| {
                    s.join_path(names::INSTANCE_ROOT, &["local_config_overrides.toml"])
                }),
            ConfigElement::constant(names::EXTERNAL_CONFIG_SOURCES, "External sources")
                .default_with("INSTANCE_ROOT/external_config_sources.yaml", &[names::INSTANCE_ROOT], |s| {
                    s.join_path(names::INSTANCE_ROOT, &["external_config_sources.yaml"])
                }),
        ]
    }

    #[test]
    fn later_elements_see_earlier_values() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager
            .load_elements(
                vec![
                    ConfigElement::constant("ROOT", "root").default_value("/srv/app"),
                    ConfigElement::option("DATA", "data")
                        .default_with("ROOT/data", &["ROOT"], |s| s.join_path("ROOT", &["data"])),
                ],
                "Paths",
            )
            .expect("load");
        assert_eq!(manager.get_str("DATA").unwrap(), "/srv/app/data");
        assert_eq!(manager.instance_path("x").ok(), None);
    }

    #[test]
    fn forward_reference_fails_load() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        let err = manager
            .load_elements(
                vec![
                    ConfigElement::option("DATA", "data")
                        .default_with("ROOT/data", &["ROOT"], |s| s.join_path("ROOT", &["data"])),
                    ConfigElement::constant("ROOT", "root").default_value("/srv/app"),
                ],
                "Paths",
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedName { .. }));
        assert!(manager.doc_render().is_empty());
    }

    #[test]
    fn required_option_without_value_aborts() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        let err = manager
            .load_elements(vec![ConfigElement::option("API_KEY", "key")], "Secrets")
            .unwrap_err();
        assert!(matches!(err, ConfigError::RequiredOptionUnset { ref name } if name == "API_KEY"));
    }

    #[test]
    fn failed_group_leaves_namespace_and_docs_untouched() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager
            .load_elements(vec![ConfigElement::option("MODE", "m").default_value("a")], "First")
            .expect("first");

        let err = manager
            .load_elements(
                vec![
                    ConfigElement::option("MODE", "m").default_value("b"),
                    ConfigElement::option("HOST", "h").default_value("db"),
                    ConfigElement::option("API_KEY", "key"),
                ],
                "Second",
            )
            .unwrap_err();
        assert!(matches!(err, ConfigError::RequiredOptionUnset { .. }));
        assert_eq!(manager.get_str("MODE").unwrap(), "a");
        assert!(manager.get("HOST").is_none());
        assert_eq!(manager.namespace().len(), 1);
        assert_eq!(manager.doc_render().len(), 1);
    }

    #[test]
    fn republishing_a_name_overwrites() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager
            .load_elements(vec![ConfigElement::option("MODE", "m").default_value("a")], "First")
            .expect("first");
        manager
            .load_elements(vec![ConfigElement::option("MODE", "m").default_value("b")], "Second")
            .expect("second");
        assert_eq!(manager.get_str("MODE").unwrap(), "b");
        assert_eq!(manager.namespace().len(), 1);
        assert_eq!(manager.doc_render().len(), 2);
    }

    #[test]
    fn masked_values_are_masked_only_in_views() {
        let ctx = ResolutionContext::new()
            .with_environment_overrides(overrides(&[("SMTP_PASSWORD", json!("correct-horse-battery"))]));
        let mut manager = ConfigManager::with_context("app", ctx);
        manager
            .load_elements(
                vec![
                    ConfigElement::option("SMTP_PASSWORD", "SMTP password").masked(),
                    ConfigElement::option("SMTP_PORT", "SMTP port").default_value(25).masked(),
                ],
                "Mail",
            )
            .expect("load");

        assert_eq!(manager.get_str("SMTP_PASSWORD").unwrap(), "correct-horse-battery");
        let view = manager.render_json();
        assert_eq!(view["Mail"]["SMTP_PASSWORD"]["value"], json!("co...ry"));
        assert_eq!(view["Mail"]["SMTP_PASSWORD"]["source"], json!("environment_override"));
        assert_eq!(view["Mail"]["SMTP_PORT"]["value"], json!(25));
    }

    #[test]
    fn documentation_tuple_is_recorded() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager
            .load_elements(
                vec![ConfigElement::option("JSON_LOGS", "Emit JSON logs").default_value(false).parser(parsers::boolean)],
                "Logging",
            )
            .expect("load");
        let section = &manager.doc_render()[0];
        assert_eq!(section.doc, "Logging");
        similar_asserts::assert_eq!(
            section.entries[0],
            DocEntry {
                name: "JSON_LOGS".to_string(),
                doc: "Emit JSON logs".to_string(),
                default: "false".to_string(),
                value: json!(false),
                source: crate::config::ValueSource::Default,
            }
        );
    }

    #[test]
    fn instance_document_scenario() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("instance_config.toml"), "X = 1\n").expect("write");

        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager.load_elements(file_constants(tmp.path()), "Files").expect("constants");
        manager.load_config_files().expect("files");
        manager.load_elements(vec![ConfigElement::option("X", "x").default_value(0)], "Options").expect("options");

        assert!(manager.external_config().is_none());
        assert_eq!(manager.get_i64("X").unwrap(), 1);
        assert_eq!(manager.render_json()["Options"]["X"]["source"], json!("instance_config"));
        assert_eq!(manager.instance_path("log").unwrap(), tmp.path().join("log"));
    }

    #[test]
    fn local_document_beats_instance_document() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("instance_config.toml"), "X = 'instance'\nY = 'instance'\n").expect("write");
        fs::write(tmp.path().join("local_config_overrides.toml"), "X = 'local'\n").expect("write");

        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager.load_elements(file_constants(tmp.path()), "Files").expect("constants");
        manager.load_config_files().expect("files");
        manager
            .load_elements(vec![ConfigElement::option("X", "x"), ConfigElement::option("Y", "y")], "Options")
            .expect("options");

        assert_eq!(manager.get_str("X").unwrap(), "local");
        assert_eq!(manager.get_str("Y").unwrap(), "instance");
    }

    #[test]
    fn external_chain_is_consulted_before_default() {
        let tmp = TempDir::new().expect("tmp");
        let secrets = tmp.path().join("secrets.json");
        fs::write(&secrets, r#"{"mail": {"password": "from-vault"}}"#).expect("write");
        fs::write(
            tmp.path().join("external_config_sources.yaml"),
            format!("- path: {}\n  format: json\n  keymap:\n    SMTP_PASSWORD: mail:password\n", secrets.display()),
        )
        .expect("write");

        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager.load_elements(file_constants(tmp.path()), "Files").expect("constants");
        manager.load_config_files().expect("files");
        manager
            .load_elements(
                vec![ConfigElement::option("SMTP_PASSWORD", "pw").default_value("unset")],
                "Mail",
            )
            .expect("options");

        assert_eq!(manager.external_config().map(ExternalSourceChain::len), Some(1));
        assert_eq!(manager.get_str("SMTP_PASSWORD").unwrap(), "from-vault");
        assert_eq!(manager.render_json()["Mail"]["SMTP_PASSWORD"]["source"], json!("external_config"));
    }

    #[test]
    fn load_config_files_requires_file_constants() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        assert!(matches!(manager.load_config_files(), Err(ConfigError::UnknownName { .. })));
    }

    #[test]
    fn set_overwrites_after_load() {
        let mut manager = ConfigManager::with_context("app", ResolutionContext::new());
        manager
            .load_elements(vec![ConfigElement::option("MODE", "m").default_value("a")], "Modes")
            .expect("load");
        assert_eq!(manager.set("MODE", json!("z")), Some(json!("a")));
        assert_eq!(manager.get_str("MODE").unwrap(), "z");
        // Views keep what was recorded at load time.
        assert_eq!(manager.render_json()["Modes"]["MODE"]["value"], json!("a"));
    }
}
